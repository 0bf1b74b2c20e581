//! `base-infra`: the shared data layer.

use std::sync::Arc;

use tracing::debug;

use azstack_core::{
    application::ports::{Program, ProgramContext},
    domain::{
        CrossStackOutputs, DatabaseAccountOfferType, DefaultConsistencyLevel, Output,
        ProtectTransform, ResourceOptions, SkuName, StorageKind,
        azure::{
            AccountLocation, DatabaseAccount, DatabaseAccountArgs, PartitionKey, ResourceGroup,
            ResourceGroupArgs, SqlContainer, SqlContainerArgs, SqlDatabase, SqlDatabaseArgs,
            StorageAccount, StorageAccountArgs,
        },
    },
    error::CoreResult,
};

/// Config keys read by [`BaseInfra`].
pub mod keys {
    pub const PROTECT: &str = "protect_flag";
    pub const LOCATION: &str = "azure-native:location";
    pub const STORAGE_ACCOUNT_NAME: &str = "storage_account_name";
    pub const STORAGE_SKU: &str = "storage_sku";
    pub const PARTITION_KEY_PATH: &str = "partition_key_path";
}

const DEFAULT_RESOURCE_GROUP: &str = "resourceGroup";
const DEFAULT_STORAGE_ACCOUNT: &str = "logicappdemosa";
const DEFAULT_COSMOSDB_ACCOUNT: &str = "logicappdemo-cdb";
const DEFAULT_DB: &str = "sqldb";
const DEFAULT_CONTAINER: &str = "container";
const DEFAULT_PARTITION_KEY_PATH: &str = "/myPartitionKey";

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseInfra;

impl BaseInfra {
    pub const NAME: &'static str = "base-infra";
}

/// Everything the program reads from configuration, collected up front so a
/// bad value fails before anything is declared.
#[derive(Debug)]
struct Settings {
    protect: bool,
    location: String,
    resource_group: String,
    storage_account: String,
    storage_sku: SkuName,
    cosmosdb_account: String,
    db: String,
    container: String,
    partition_key_path: String,
}

impl Settings {
    fn read(ctx: &ProgramContext<'_>) -> CoreResult<Self> {
        let config = ctx.config();
        let storage_sku = match config.get(keys::STORAGE_SKU) {
            Some(sku) => sku.parse()?,
            None => SkuName::StandardLrs,
        };
        Ok(Self {
            protect: config.get_bool(keys::PROTECT)?.unwrap_or(true),
            location: config.require(keys::LOCATION)?.to_string(),
            resource_group: config
                .get_or(CrossStackOutputs::RESOURCE_GROUP_NAME, DEFAULT_RESOURCE_GROUP),
            storage_account: config.get_or(keys::STORAGE_ACCOUNT_NAME, DEFAULT_STORAGE_ACCOUNT),
            storage_sku,
            cosmosdb_account: config
                .get_or(CrossStackOutputs::COSMOSDB_ACCOUNT_NAME, DEFAULT_COSMOSDB_ACCOUNT),
            db: config.get_or(CrossStackOutputs::DB_NAME, DEFAULT_DB),
            container: config.get_or(CrossStackOutputs::DB_CONTAINER_NAME, DEFAULT_CONTAINER),
            partition_key_path: config
                .get_or(keys::PARTITION_KEY_PATH, DEFAULT_PARTITION_KEY_PATH),
        })
    }
}

impl Program for BaseInfra {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Resource group, storage account and Cosmos DB account, database and container"
    }

    fn run(&self, ctx: &mut ProgramContext<'_>) -> CoreResult<()> {
        let settings = Settings::read(ctx)?;
        debug!(?settings, "base-infra settings");
        let d = ctx.deployment();

        let rg = ResourceGroup::new(
            d,
            &settings.resource_group,
            ResourceGroupArgs {
                location: Output::known(settings.location.clone()),
            },
            ResourceOptions::protect(settings.protect),
        )?;

        // Everything declared from here on carries the same protect flag.
        d.register_transform(Arc::new(ProtectTransform::new(settings.protect)))?;

        StorageAccount::new(
            d,
            &settings.storage_account,
            StorageAccountArgs {
                resource_group_name: rg.name.clone(),
                location: None,
                sku: settings.storage_sku,
                kind: StorageKind::StorageV2,
            },
            ResourceOptions::new(),
        )?;

        let account = DatabaseAccount::new(
            d,
            &settings.cosmosdb_account,
            DatabaseAccountArgs {
                resource_group_name: rg.name.clone(),
                offer_type: DatabaseAccountOfferType::Standard,
                locations: vec![AccountLocation {
                    location_name: rg.location.clone(),
                    failover_priority: 0,
                }],
                consistency_level: DefaultConsistencyLevel::Session,
            },
            ResourceOptions::new(),
        )?;

        let db = SqlDatabase::new(
            d,
            &settings.db,
            SqlDatabaseArgs {
                resource_group_name: rg.name.clone(),
                account_name: account.name.clone(),
                database_id: settings.db.clone(),
            },
            ResourceOptions::new(),
        )?;

        let container = SqlContainer::new(
            d,
            &settings.container,
            SqlContainerArgs {
                resource_group_name: rg.name.clone(),
                account_name: account.name.clone(),
                database_name: db.name.clone(),
                container_id: settings.container.clone(),
                partition_key: PartitionKey::hash(settings.partition_key_path.clone()),
            },
            ResourceOptions::new(),
        )?;

        d.export(CrossStackOutputs::COSMOSDB_ACCOUNT_NAME, account.name)?;
        d.export(CrossStackOutputs::RESOURCE_GROUP_NAME, rg.name)?;
        d.export(CrossStackOutputs::RESOURCE_GROUP_LOCATION, rg.location)?;
        d.export(CrossStackOutputs::DB_NAME, db.name)?;
        d.export(CrossStackOutputs::DB_CONTAINER_NAME, container.name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use azstack_core::{
        domain::{Deployment, DomainError, ResourceType, StackConfig, StackContext},
        error::CoreError,
    };

    use super::*;
    use crate::state_store::InMemoryStateStore;

    fn run(config: StackConfig) -> CoreResult<Deployment> {
        let store = InMemoryStateStore::new();
        let deployment = Deployment::new(
            StackContext::new("org", BaseInfra::NAME, "dev").unwrap(),
            config,
        );
        let mut ctx = ProgramContext::new(deployment, &store);
        BaseInfra.run(&mut ctx)?;
        Ok(ctx.into_deployment())
    }

    fn config() -> StackConfig {
        StackConfig::new(BaseInfra::NAME).with_value(keys::LOCATION, "westus2")
    }

    #[test]
    fn declares_five_resources_and_five_exports() {
        let d = run(config()).unwrap();
        let types: Vec<ResourceType> = d.resources().iter().map(|r| r.resource_type()).collect();
        assert_eq!(
            types,
            [
                ResourceType::ResourceGroup,
                ResourceType::StorageAccount,
                ResourceType::DatabaseAccount,
                ResourceType::SqlDatabase,
                ResourceType::SqlContainer,
            ]
        );
        let exports: Vec<&str> = d.exports().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(exports, CrossStackOutputs::KEYS);
    }

    #[test]
    fn everything_is_protected_by_default() {
        let d = run(config()).unwrap();
        assert!(d.resources().iter().all(|r| r.is_protected()));

        // The group is protected explicitly; the rest through the transform.
        assert!(d.resources()[0].applied_transforms().is_empty());
        assert!(
            d.resources()[1..]
                .iter()
                .all(|r| r.applied_transforms() == ["protect".to_string()])
        );
    }

    #[test]
    fn protect_flag_false_is_honored() {
        let d = run(config().with_value(keys::PROTECT, "false")).unwrap();
        assert!(d.resources().iter().all(|r| !r.is_protected()));
    }

    #[test]
    fn location_is_required_before_any_declaration() {
        let err = run(StackConfig::new(BaseInfra::NAME)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Domain(DomainError::MissingConfig { ref key }) if key == keys::LOCATION
        ));
    }

    #[test]
    fn invalid_protect_flag_fails_fast() {
        let err = run(config().with_value(keys::PROTECT, "maybe")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Domain(DomainError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn names_can_be_overridden() {
        let d = run(
            config()
                .with_value("db_name", "orders")
                .with_value("db_container_name", "line_items"),
        )
        .unwrap();
        let names: Vec<&str> = d.resources().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            ["resourceGroup", "logicappdemosa", "logicappdemo-cdb", "orders", "line_items"]
        );
        let container = &d.resources()[4];
        assert_eq!(
            container
                .input("resource")
                .and_then(|r| r.known())
                .map(|r| r["id"].clone()),
            Some(serde_json::json!("line_items"))
        );
    }

    #[test]
    fn bad_partition_key_path_is_rejected() {
        let err = run(config().with_value(keys::PARTITION_KEY_PATH, "noslash")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Domain(DomainError::InvalidPartitionKeyPath { .. })
        ));
    }
}
