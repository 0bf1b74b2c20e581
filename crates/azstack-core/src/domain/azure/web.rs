use std::collections::BTreeMap;

use crate::domain::{
    azure::{insert_optional, string_property},
    deployment::Deployment,
    error::DomainResult,
    input::Input,
    output::Output,
    resource::{Props, ResourceOptions, ResourceType, Urn},
};

#[derive(Debug, Clone)]
pub struct ConnectionArgs {
    pub resource_group_name: Output<String>,
    pub location: Option<Output<String>>,
    pub display_name: String,
    /// Id of the managed API this connection talks to.
    pub api_id: Output<String>,
    pub parameter_values: BTreeMap<String, Input>,
}

/// `azure-native:web:Connection`
#[derive(Debug, Clone)]
pub struct Connection {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
}

impl Connection {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: ConnectionArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        let mut props = Props::new();
        props.insert("connectionName".into(), Input::from(name));
        props.insert("resourceGroupName".into(), Input::from(args.resource_group_name));
        insert_optional(&mut props, "location", args.location);
        props.insert(
            "properties".into(),
            Input::object([
                ("displayName", Input::from(args.display_name)),
                ("api", Input::object([("id", Input::from(args.api_id))])),
                ("parameterValues", Input::Object(args.parameter_values)),
            ]),
        );

        let urn = deployment.declare(ResourceType::Connection, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            urn,
        })
    }
}

/// `/subscriptions/{sub}/providers/Microsoft.Web/locations/{location}/managedApis/{api}`
pub fn managed_api_id(
    subscription_id: Output<String>,
    location: Output<String>,
    api: &str,
) -> Output<String> {
    Output::concat([
        "/subscriptions/".into(),
        subscription_id,
        "/providers/Microsoft.Web/locations/".into(),
        location,
        format!("/managedApis/{api}").into(),
    ])
}
