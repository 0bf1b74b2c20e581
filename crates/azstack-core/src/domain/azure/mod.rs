//! Typed constructors for the Azure resources and provider functions used by
//! the builtin programs.
//!
//! Every constructor takes the [`Deployment`](crate::domain::deployment::Deployment)
//! by mutable reference, validates what can be validated at declaration time
//! and returns a handle whose fields are deferred [`Output`]s.

pub mod authorization;
pub mod documentdb;
pub mod logic;
pub mod resources;
pub mod storage;
pub mod web;

pub use authorization::{ClientConfig, get_client_config};
pub use documentdb::{
    AccountLocation, DatabaseAccount, DatabaseAccountArgs, DatabaseAccountKeys, PartitionKey,
    SqlContainer, SqlContainerArgs, SqlDatabase, SqlDatabaseArgs, list_database_account_keys,
};
pub use logic::{
    ApiConnectionAction, Workflow, WorkflowArgs, WorkflowDefinition, WorkflowTriggerCallbackUrl,
    list_workflow_trigger_callback_url,
};
pub use resources::{ResourceGroup, ResourceGroupArgs};
pub use storage::{StorageAccount, StorageAccountArgs};
pub use web::{Connection, ConnectionArgs, managed_api_id};

use crate::domain::{
    input::Input,
    output::Output,
    resource::{Props, Urn},
};

/// String output property of a declared resource.
pub(crate) fn string_property(urn: &Urn, key: &str) -> Output<String> {
    Output::property(urn.clone(), key).as_string()
}

pub(crate) fn insert_optional(props: &mut Props, key: &str, value: Option<Output<String>>) {
    if let Some(value) = value {
        props.insert(key.to_string(), Input::from(value));
    }
}
