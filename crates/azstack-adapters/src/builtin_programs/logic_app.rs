//! `logic-app`: an HTTP-triggered workflow writing into the base stack's
//! Cosmos DB container.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use azstack_core::{
    application::ports::{Program, ProgramContext},
    domain::{
        Input, Output, ResourceOptions,
        azure::{
            ApiConnectionAction, Connection, ConnectionArgs, Workflow, WorkflowArgs,
            WorkflowDefinition, get_client_config, list_database_account_keys,
            list_workflow_trigger_callback_url, logic::CONNECTIONS_PARAMETER, managed_api_id,
        },
        docs_path,
    },
    error::CoreResult,
};

/// Managed API the connection binds to.
const MANAGED_API: &str = "documentdb";
const TRIGGER: &str = "Receive_post";

#[derive(Debug, Clone, Copy, Default)]
pub struct LogicApp;

impl LogicApp {
    pub const NAME: &'static str = "logic-app";
}

impl Program for LogicApp {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Logic App with an HTTP trigger that stores request bodies in Cosmos DB"
    }

    fn run(&self, ctx: &mut ProgramContext<'_>) -> CoreResult<()> {
        let base = ctx.cross_stack_outputs()?;
        debug!(
            account = %base.cosmosdb_account_name,
            resource_group = %base.resource_group_name,
            "Using base stack outputs"
        );

        let resource_group_name = Output::known(base.resource_group_name.clone());
        let account_name = Output::known(base.cosmosdb_account_name.clone());

        let account_keys = list_database_account_keys(&account_name, &resource_group_name);
        let client_config = get_client_config();
        let api_id = managed_api_id(
            client_config.subscription_id,
            Output::known(base.resource_group_location.clone()),
            MANAGED_API,
        );

        let d = ctx.deployment();

        let connection = Connection::new(
            d,
            "connection",
            ConnectionArgs {
                resource_group_name: resource_group_name.clone(),
                location: None,
                display_name: "cosmosdb_connection".into(),
                api_id: api_id.clone(),
                parameter_values: BTreeMap::from([
                    ("databaseAccount".to_string(), Input::from(&account_name)),
                    (
                        "accessKey".to_string(),
                        Input::from(account_keys.primary_master_key),
                    ),
                ]),
            },
            ResourceOptions::new(),
        )?;

        let path = Output::known(base.db_name.clone())
            .zip(Output::known(base.db_container_name.clone()))
            .map(|(db, container)| docs_path(&db, &container));

        let definition = WorkflowDefinition::new()
            .connections_parameter()
            .http_request_trigger(TRIGGER, "POST")
            .api_connection_action(
                "write_body",
                ApiConnectionAction {
                    connection: MANAGED_API.into(),
                    method: "post".into(),
                    path,
                    body: Input::from(json!({ "data": "@triggerBody()", "id": "@utcNow()" })),
                },
            );

        let connections = Input::object([(
            MANAGED_API,
            Input::object([
                ("connectionId", Input::from(connection.id)),
                ("connection_name", Input::from("logicapp-cosmosdb-connection")),
                ("id", Input::from(api_id)),
            ]),
        )]);

        let workflow = Workflow::new(
            d,
            "workflow",
            WorkflowArgs {
                resource_group_name: resource_group_name.clone(),
                location: None,
                definition,
                parameters: BTreeMap::from([(CONNECTIONS_PARAMETER.to_string(), connections)]),
            },
            ResourceOptions::new(),
        )?;

        let callback =
            list_workflow_trigger_callback_url(&resource_group_name, &workflow.name, TRIGGER);
        d.export("endpoint", callback.value)?;
        Ok(())
    }
}
