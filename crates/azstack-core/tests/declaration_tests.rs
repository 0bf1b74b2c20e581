//! Integration tests for azstack-core declarations.

use std::sync::Arc;

use azstack_core::domain::azure::*;
use azstack_core::domain::{
    CrossStackOutputs, DatabaseAccountOfferType, DefaultConsistencyLevel, Deployment,
    DomainError, PartitionKind, ProtectTransform, ResourceOptions, StackConfig, StackContext,
    docs_path,
};

fn deployment() -> Deployment {
    Deployment::new(
        StackContext::new("organization", "base-infra", "dev").unwrap(),
        StackConfig::new("base-infra"),
    )
}

#[test]
fn protect_hook_applies_to_every_later_resource_and_no_earlier_one() {
    let mut d = deployment();
    let rg = ResourceGroup::new(
        &mut d,
        "resourceGroup",
        ResourceGroupArgs {
            location: "westus2".into(),
        },
        ResourceOptions::protect(false),
    )
    .unwrap();

    d.register_transform(Arc::new(ProtectTransform::new(true)))
        .unwrap();

    let account = DatabaseAccount::new(
        &mut d,
        "logicappdemo-cdb",
        DatabaseAccountArgs {
            resource_group_name: rg.name.clone(),
            offer_type: DatabaseAccountOfferType::Standard,
            locations: vec![AccountLocation {
                location_name: rg.location.clone(),
                failover_priority: 0,
            }],
            consistency_level: DefaultConsistencyLevel::Session,
        },
        ResourceOptions::protect(false),
    )
    .unwrap();
    let db = SqlDatabase::new(
        &mut d,
        "sqldb",
        SqlDatabaseArgs {
            resource_group_name: rg.name.clone(),
            account_name: account.name.clone(),
            database_id: "sqldb".into(),
        },
        ResourceOptions::new(),
    )
    .unwrap();

    let protected: Vec<bool> = d.resources().iter().map(|r| r.is_protected()).collect();
    assert_eq!(protected, vec![false, true, true]);
    assert!(d.resource(&db.urn).unwrap().is_protected());

    assert!(matches!(
        d.register_transform(Arc::new(ProtectTransform::new(false))),
        Err(DomainError::TransformAlreadyRegistered { .. })
    ));
}

#[test]
fn container_with_no_partition_paths_never_reaches_the_deployment() {
    let mut d = deployment();
    let result = SqlContainer::new(
        &mut d,
        "container",
        SqlContainerArgs {
            resource_group_name: "rg".into(),
            account_name: "acct".into(),
            database_name: "sqldb".into(),
            container_id: "container".into(),
            partition_key: PartitionKey {
                paths: Vec::new(),
                kind: PartitionKind::Hash,
            },
        },
        ResourceOptions::new(),
    );
    assert!(matches!(result, Err(DomainError::EmptyPartitionKey { .. })));
    assert!(d.resources().is_empty());
}

#[test]
fn action_path_matches_contract_for_arbitrary_names() {
    let names = ["sqldb", "a", "db-with-dashes", "Ünïcode", "x_y"];
    for db in names {
        for coll in names {
            assert_eq!(docs_path(db, coll), format!("/dbs/{db}/colls/{coll}/docs"));
        }
    }

    let outputs = CrossStackOutputs {
        cosmosdb_account_name: "logicappdemo-cdb".into(),
        resource_group_name: "resourceGroup".into(),
        resource_group_location: "westus2".into(),
        db_name: "sqldb".into(),
        db_container_name: "container".into(),
    };
    assert_eq!(outputs.docs_path(), "/dbs/sqldb/colls/container/docs");
}
