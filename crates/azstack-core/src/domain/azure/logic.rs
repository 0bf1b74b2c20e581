//! Logic Apps: workflow definitions, workflows and trigger callback URLs.
//!
//! A workflow definition is a JSON document interpreted by the Logic Apps
//! runtime at request time. Expression strings such as `@triggerBody()` are
//! passed through untouched; only the places that take [`Output`]s are
//! computed here.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::domain::{
    azure::{insert_optional, string_property},
    deployment::Deployment,
    error::DomainResult,
    input::Input,
    output::Output,
    resource::{Function, Props, ResourceOptions, ResourceType, Urn},
};

pub const WORKFLOW_SCHEMA: &str = "https://schema.management.azure.com/providers/Microsoft.Logic/schemas/2016-06-01/workflowdefinition.json#";
pub const CONTENT_VERSION: &str = "1.0.0.0";

/// Name of the workflow parameter holding managed API connections.
pub const CONNECTIONS_PARAMETER: &str = "$connections";

/// Runtime expression selecting the id of a connection from `$connections`.
pub fn connection_reference(connection: &str) -> String {
    format!("@parameters('{CONNECTIONS_PARAMETER}')['{connection}']['connectionId']")
}

/// An action that calls a managed API through a named connection.
#[derive(Debug, Clone)]
pub struct ApiConnectionAction {
    /// Key of the connection inside `$connections`.
    pub connection: String,
    pub method: String,
    pub path: Output<String>,
    pub body: Input,
}

/// Builder for a workflow definition document.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDefinition {
    parameters: BTreeMap<String, Input>,
    triggers: BTreeMap<String, Input>,
    actions: BTreeMap<String, Input>,
}

impl WorkflowDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a definition parameter with its type and default.
    pub fn parameter(mut self, name: &str, type_name: &str, default_value: Value) -> Self {
        self.parameters.insert(
            name.into(),
            Input::from(json!({ "type": type_name, "defaultValue": default_value })),
        );
        self
    }

    /// The `$connections` object parameter, empty by default.
    pub fn connections_parameter(self) -> Self {
        self.parameter(CONNECTIONS_PARAMETER, "Object", json!({}))
    }

    /// An HTTP request trigger accepting any JSON object body.
    pub fn http_request_trigger(mut self, name: &str, method: &str) -> Self {
        self.triggers.insert(
            name.into(),
            Input::from(json!({
                "type": "Request",
                "kind": "Http",
                "inputs": {
                    "method": method,
                    "schema": { "type": "object", "properties": {} },
                },
            })),
        );
        self
    }

    pub fn api_connection_action(mut self, name: &str, action: ApiConnectionAction) -> Self {
        let inputs = Input::object([
            ("body", action.body),
            (
                "host",
                Input::object([(
                    "connection",
                    Input::object([("name", Input::from(connection_reference(&action.connection)))]),
                )]),
            ),
            ("method", Input::from(action.method)),
            ("path", Input::from(action.path)),
        ]);
        self.actions.insert(
            name.into(),
            Input::object([("type", Input::from("ApiConnection")), ("inputs", inputs)]),
        );
        self
    }

    pub fn trigger_names(&self) -> impl Iterator<Item = &str> {
        self.triggers.keys().map(String::as_str)
    }

    pub fn into_input(self) -> Input {
        Input::object([
            ("$schema", Input::from(WORKFLOW_SCHEMA)),
            ("contentVersion", Input::from(CONTENT_VERSION)),
            ("parameters", Input::Object(self.parameters)),
            ("triggers", Input::Object(self.triggers)),
            ("actions", Input::Object(self.actions)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowArgs {
    pub resource_group_name: Output<String>,
    pub location: Option<Output<String>>,
    pub definition: WorkflowDefinition,
    /// Runtime values for definition parameters, by parameter name.
    pub parameters: BTreeMap<String, Input>,
}

/// `azure-native:logic:Workflow`
#[derive(Debug, Clone)]
pub struct Workflow {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
    pub access_endpoint: Output<String>,
}

impl Workflow {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: WorkflowArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        let parameters = Input::object(
            args.parameters
                .into_iter()
                .map(|(k, v)| (k, Input::object([("value", v)]))),
        );

        let mut props = Props::new();
        props.insert("workflowName".into(), Input::from(name));
        props.insert("resourceGroupName".into(), Input::from(args.resource_group_name));
        insert_optional(&mut props, "location", args.location);
        props.insert("definition".into(), args.definition.into_input());
        props.insert("parameters".into(), parameters);

        let urn = deployment.declare(ResourceType::Workflow, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            access_endpoint: string_property(&urn, "accessEndpoint"),
            urn,
        })
    }
}

/// Result of `listWorkflowTriggerCallbackUrl`.
#[derive(Debug, Clone)]
pub struct WorkflowTriggerCallbackUrl {
    /// Fully qualified URL, including the signature.
    pub value: Output<String>,
    pub base_path: Output<String>,
    pub method: Output<String>,
}

pub fn list_workflow_trigger_callback_url(
    resource_group_name: &Output<String>,
    workflow_name: &Output<String>,
    trigger_name: &str,
) -> WorkflowTriggerCallbackUrl {
    let result = Output::invoke(
        Function::ListWorkflowTriggerCallbackUrl,
        Input::object([
            ("resourceGroupName", Input::from(resource_group_name)),
            ("workflowName", Input::from(workflow_name)),
            ("triggerName", Input::from(trigger_name)),
        ]),
    );
    WorkflowTriggerCallbackUrl {
        value: result.clone().field("value").as_string(),
        base_path: result.clone().field("basePath").as_string(),
        method: result.field("method").as_string(),
    }
}
