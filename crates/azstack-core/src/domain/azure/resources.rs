use crate::domain::{
    azure::string_property,
    deployment::Deployment,
    error::DomainResult,
    input::Input,
    output::Output,
    resource::{Props, ResourceOptions, ResourceType, Urn},
};

#[derive(Debug, Clone)]
pub struct ResourceGroupArgs {
    pub location: Output<String>,
}

/// `azure-native:resources:ResourceGroup`
#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
    pub location: Output<String>,
}

impl ResourceGroup {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: ResourceGroupArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        let mut props = Props::new();
        props.insert("resourceGroupName".into(), Input::from(name));
        props.insert("location".into(), Input::from(args.location));

        let urn = deployment.declare(ResourceType::ResourceGroup, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            location: string_property(&urn, "location"),
            urn,
        })
    }
}
