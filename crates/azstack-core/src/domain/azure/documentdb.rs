//! Cosmos DB (SQL API): account, database, container and key listing.

use std::collections::BTreeSet;

use crate::domain::{
    azure::string_property,
    deployment::Deployment,
    error::{DomainError, DomainResult},
    input::Input,
    output::Output,
    resource::{Function, Props, ResourceOptions, ResourceType, Urn},
    value_objects::{DatabaseAccountOfferType, DefaultConsistencyLevel, PartitionKind},
};

// ── Account ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AccountLocation {
    pub location_name: Output<String>,
    pub failover_priority: u32,
}

#[derive(Debug, Clone)]
pub struct DatabaseAccountArgs {
    pub resource_group_name: Output<String>,
    pub offer_type: DatabaseAccountOfferType,
    pub locations: Vec<AccountLocation>,
    pub consistency_level: DefaultConsistencyLevel,
}

/// `azure-native:documentdb:DatabaseAccount`
#[derive(Debug, Clone)]
pub struct DatabaseAccount {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
    pub document_endpoint: Output<String>,
}

impl DatabaseAccount {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: DatabaseAccountArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        validate_locations(name, &args.locations)?;

        // Validation guarantees exactly one primary.
        let primary = args
            .locations
            .iter()
            .find(|l| l.failover_priority == 0)
            .map(|l| l.location_name.clone());

        let locations = Input::array(args.locations.into_iter().map(|l| {
            Input::object([
                ("locationName", Input::from(l.location_name)),
                ("failoverPriority", Input::from(l.failover_priority)),
            ])
        }));

        let mut props = Props::new();
        props.insert("accountName".into(), Input::from(name));
        props.insert("resourceGroupName".into(), Input::from(args.resource_group_name));
        props.insert("databaseAccountOfferType".into(), Input::from(args.offer_type));
        props.insert("locations".into(), locations);
        props.insert(
            "consistencyPolicy".into(),
            Input::object([(
                "defaultConsistencyLevel",
                Input::from(args.consistency_level),
            )]),
        );
        if let Some(primary) = primary {
            props.insert("location".into(), Input::from(primary));
        }

        let urn = deployment.declare(ResourceType::DatabaseAccount, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            document_endpoint: string_property(&urn, "documentEndpoint"),
            urn,
        })
    }
}

/// At least one location, exactly one with failover priority 0, no repeated priorities.
fn validate_locations(account: &str, locations: &[AccountLocation]) -> DomainResult<()> {
    let invalid = |reason: &str| DomainError::InvalidLocations {
        account: account.into(),
        reason: reason.into(),
    };

    if locations.is_empty() {
        return Err(invalid("at least one location is required"));
    }
    let primaries = locations.iter().filter(|l| l.failover_priority == 0).count();
    if primaries != 1 {
        return Err(invalid(&format!(
            "exactly one location must have failover priority 0, found {primaries}"
        )));
    }
    let mut seen = BTreeSet::new();
    if let Some(dup) = locations
        .iter()
        .find(|l| !seen.insert(l.failover_priority))
    {
        return Err(invalid(&format!(
            "failover priority {} is used more than once",
            dup.failover_priority
        )));
    }
    Ok(())
}

// ── Database ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlDatabaseArgs {
    pub resource_group_name: Output<String>,
    pub account_name: Output<String>,
    /// Database id inside the account.
    pub database_id: String,
}

/// `azure-native:documentdb:SqlResourceSqlDatabase`
#[derive(Debug, Clone)]
pub struct SqlDatabase {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
}

impl SqlDatabase {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: SqlDatabaseArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        let mut props = Props::new();
        props.insert("databaseName".into(), Input::from(name));
        props.insert("resourceGroupName".into(), Input::from(args.resource_group_name));
        props.insert("accountName".into(), Input::from(args.account_name));
        props.insert(
            "resource".into(),
            Input::object([("id", Input::from(args.database_id))]),
        );

        let urn = deployment.declare(ResourceType::SqlDatabase, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            urn,
        })
    }
}

// ── Container ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKey {
    pub paths: Vec<String>,
    pub kind: PartitionKind,
}

impl PartitionKey {
    /// Single-path hash partitioning.
    pub fn hash(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
            kind: PartitionKind::Hash,
        }
    }

    pub fn validate(&self, container: &str) -> DomainResult<()> {
        if self.paths.is_empty() {
            return Err(DomainError::EmptyPartitionKey {
                container: container.into(),
            });
        }
        match self.paths.iter().find(|p| !p.starts_with('/') || p.len() < 2) {
            Some(path) => Err(DomainError::InvalidPartitionKeyPath {
                container: container.into(),
                path: path.clone(),
            }),
            None => Ok(()),
        }
    }

    fn to_input(&self) -> Input {
        Input::object([
            (
                "paths",
                Input::array(self.paths.iter().map(|p| Input::from(p.as_str()))),
            ),
            ("kind", Input::from(self.kind)),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct SqlContainerArgs {
    pub resource_group_name: Output<String>,
    pub account_name: Output<String>,
    pub database_name: Output<String>,
    /// Container id inside the database.
    pub container_id: String,
    pub partition_key: PartitionKey,
}

/// `azure-native:documentdb:SqlResourceSqlContainer`
#[derive(Debug, Clone)]
pub struct SqlContainer {
    pub urn: Urn,
    pub id: Output<String>,
    pub name: Output<String>,
}

impl SqlContainer {
    pub fn new(
        deployment: &mut Deployment,
        name: &str,
        args: SqlContainerArgs,
        options: ResourceOptions,
    ) -> DomainResult<Self> {
        args.partition_key.validate(name)?;

        let mut props = Props::new();
        props.insert("containerName".into(), Input::from(name));
        props.insert("resourceGroupName".into(), Input::from(args.resource_group_name));
        props.insert("accountName".into(), Input::from(args.account_name));
        props.insert("databaseName".into(), Input::from(args.database_name));
        props.insert(
            "resource".into(),
            Input::object([
                ("id", Input::from(args.container_id)),
                ("partitionKey", args.partition_key.to_input()),
            ]),
        );

        let urn = deployment.declare(ResourceType::SqlContainer, name, props, options)?;
        Ok(Self {
            id: string_property(&urn, "id"),
            name: string_property(&urn, "name"),
            urn,
        })
    }
}

// ── Functions ────────────────────────────────────────────────────────────────

/// Result of `listDatabaseAccountKeys`. Every key is secret.
#[derive(Debug, Clone)]
pub struct DatabaseAccountKeys {
    pub primary_master_key: Output<String>,
    pub secondary_master_key: Output<String>,
}

pub fn list_database_account_keys(
    account_name: &Output<String>,
    resource_group_name: &Output<String>,
) -> DatabaseAccountKeys {
    let result = Output::invoke(
        Function::ListDatabaseAccountKeys,
        Input::object([
            ("accountName", Input::from(account_name)),
            ("resourceGroupName", Input::from(resource_group_name)),
        ]),
    )
    .as_secret();

    DatabaseAccountKeys {
        primary_master_key: result.clone().field("primaryMasterKey").as_string(),
        secondary_master_key: result.field("secondaryMasterKey").as_string(),
    }
}
