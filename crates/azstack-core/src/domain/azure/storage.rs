use crate::domain::{
    azure::{insert_optional, string_property},
    deployment::Deployment,
    error::{DomainError, DomainResult},
    input::Input,
    output::Output,
    resource::{Props, ResourceOptions, ResourceType, Urn},
    value_objects::{SkuName, StorageKind},
};

#[derive(Debug, Clone)]
pub struct StorageAccountArgs {
    pub resource_group_name: Output<String>,
    /// Defaults to the resource group's location on the provider side.
    pub location: Option<Output<String>>,
    pub sku: SkuName,
    pub kind: StorageKind,
}

/// `azure-native:storage:StorageAccount`
#[derive(Debug, Clone)]
pub struct StorageAccount {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
    pub primary_blob_endpoint: Output<String>,
}

impl StorageAccount {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: StorageAccountArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        validate_account_name(name)?;

        let mut props = Props::new();
        props.insert("accountName".into(), Input::from(name));
        props.insert("resourceGroupName".into(), Input::from(args.resource_group_name));
        props.insert("sku".into(), Input::object([("name", Input::from(args.sku))]));
        props.insert("kind".into(), Input::from(args.kind));
        insert_optional(&mut props, "location", args.location);

        let urn = deployment.declare(ResourceType::StorageAccount, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            primary_blob_endpoint: string_property(&urn, "primaryBlobEndpoint"),
            urn,
        })
    }
}

/// Storage account names are 3-24 lowercase letters and digits.
fn validate_account_name(name: &str) -> DomainResult<()> {
    let ok_len = (3..=24).contains(&name.len());
    let ok_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if ok_len && ok_chars {
        Ok(())
    } else {
        Err(DomainError::InvalidResourceName {
            name: name.into(),
            reason: "storage account names are 3-24 lowercase letters and digits".into(),
        })
    }
}
