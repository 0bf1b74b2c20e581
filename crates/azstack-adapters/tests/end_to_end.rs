//! Base stack, then the logic app through both output sources, against the
//! simulated cloud.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use azstack_adapters::{
    CloudIdentity, InMemoryProgramStore, InMemoryStateStore, JsonManifestRenderer,
    SimulatedCloud, StackConfigLoader,
};
use azstack_core::{
    application::{ApplicationError, DeploymentEvent, DeploymentService},
    domain::{Function, ResourceType, StackConfig, StackContext, StackRef},
    error::CoreError,
};

const SUBSCRIPTION: &str = "11111111-2222-3333-4444-555555555555";

struct Harness {
    service: DeploymentService,
    cloud: SimulatedCloud,
}

fn harness() -> Harness {
    let cloud = SimulatedCloud::new(CloudIdentity::for_subscription(SUBSCRIPTION));
    let service = DeploymentService::new(
        Box::new(InMemoryProgramStore::with_builtin().unwrap()),
        Box::new(cloud.clone()),
        Box::new(InMemoryStateStore::new()),
        Box::new(JsonManifestRenderer::new()),
    );
    Harness { service, cloud }
}

fn ctx(project: &str, stack: &str) -> StackContext {
    StackContext::new("organization", project, stack).unwrap()
}

fn base_config() -> StackConfig {
    StackConfig::new("base-infra").with_value("azure-native:location", "westus2")
}

fn rg_id() -> String {
    format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/resourceGroup")
}

fn cloud_inputs(cloud: &SimulatedCloud, id: &str) -> Value {
    cloud.resource(id).unwrap().inputs
}

#[test]
fn base_stack_exports_the_contract() {
    let h = harness();
    let summary = h
        .service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();

    assert_eq!(summary.created, 5);
    assert_eq!(
        summary.outputs(false),
        [
            ("cosmosdb_account_name", "logicappdemo-cdb"),
            ("db_container_name", "container"),
            ("db_name", "sqldb"),
            ("resource_group_location", "westus2"),
            ("resource_group_name", "resourceGroup"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect::<BTreeMap<String, Value>>()
    );
    assert!(summary.state.resources.iter().all(|r| r.protect));

    let account_id = format!(
        "{}/providers/Microsoft.DocumentDB/databaseAccounts/logicappdemo-cdb",
        rg_id()
    );
    let account = cloud_inputs(&h.cloud, &account_id);
    assert_eq!(account["locations"][0]["locationName"], json!("westus2"));
    assert_eq!(account["locations"][0]["failoverPriority"], json!(0));
}

#[test]
fn logic_app_reads_base_outputs_by_stack_reference() {
    let h = harness();
    h.service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();

    let config = StackConfig::new("logic-app").with_value("baseProjectName", "base-infra");
    let summary = h
        .service
        .up("logic-app", ctx("logic-app", "dev"), config)
        .unwrap();

    let endpoint = summary.state.output_string("endpoint").unwrap();
    assert!(endpoint.starts_with("https://prod-00.westus2.logic.azure.com:443/workflows/"));
    assert!(endpoint.contains("/triggers/Receive_post/paths/invoke"));

    let connection = cloud_inputs(
        &h.cloud,
        &format!("{}/providers/Microsoft.Web/connections/connection", rg_id()),
    );
    let params = &connection["properties"]["parameterValues"];
    assert_eq!(params["databaseAccount"], json!("logicappdemo-cdb"));
    assert!(params["accessKey"].as_str().is_some_and(|k| k.ends_with("==")));
    assert_eq!(
        connection["properties"]["api"]["id"],
        json!(format!(
            "/subscriptions/{SUBSCRIPTION}/providers/Microsoft.Web/locations/westus2/managedApis/documentdb"
        ))
    );

    let workflow = cloud_inputs(
        &h.cloud,
        &format!("{}/providers/Microsoft.Logic/workflows/workflow", rg_id()),
    );
    assert_eq!(
        workflow["definition"]["actions"]["write_body"]["inputs"]["path"],
        json!("/dbs/sqldb/colls/container/docs")
    );
    let binding = &workflow["parameters"]["$connections"]["value"]["documentdb"];
    assert_eq!(binding["connection_name"], json!("logicapp-cosmosdb-connection"));
    assert!(
        binding["connectionId"]
            .as_str()
            .is_some_and(|id| id.ends_with("/connections/connection"))
    );
}

#[test]
fn both_sources_produce_the_same_endpoint() {
    let h = harness();
    let base = h
        .service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();

    let by_reference = h
        .service
        .up(
            "logic-app",
            ctx("logic-app", "dev"),
            StackConfig::new("logic-app").with_value("baseProjectName", "base-infra"),
        )
        .unwrap();

    let from_config = base
        .state
        .outputs
        .iter()
        .fold(StackConfig::new("logic-app"), |c, (k, o)| {
            c.with_value(k.as_str(), o.value.as_str().unwrap_or_default())
        });
    let by_config = h
        .service
        .up("logic-app", ctx("logic-app", "esc"), from_config)
        .unwrap();

    assert_eq!(
        by_reference.state.output("endpoint").map(|o| &o.value),
        by_config.state.output("endpoint").map(|o| &o.value)
    );
}

#[test]
fn environment_imports_feed_the_config_source() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("environments")).unwrap();
    std::fs::create_dir_all(dir.path().join("logic-app")).unwrap();
    std::fs::write(
        dir.path().join("environments/base-outputs.toml"),
        r#"
[values]
cosmosdb_account_name = { fromStack = "organization/base-infra/dev", output = "cosmosdb_account_name" }
resource_group_name = { fromStack = "organization/base-infra/dev", output = "resource_group_name" }
resource_group_location = { fromStack = "organization/base-infra/dev", output = "resource_group_location" }
db_name = { fromStack = "organization/base-infra/dev", output = "db_name" }
db_container_name = { fromStack = "organization/base-infra/dev", output = "db_container_name" }
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("logic-app/Stack.dev.toml"),
        "[environment]\nimports = [\"base-outputs\"]\n",
    )
    .unwrap();

    let store = InMemoryStateStore::new();
    let cloud = SimulatedCloud::new(CloudIdentity::for_subscription(SUBSCRIPTION));
    let service = DeploymentService::new(
        Box::new(InMemoryProgramStore::with_builtin().unwrap()),
        Box::new(cloud),
        Box::new(store.clone()),
        Box::new(JsonManifestRenderer::new()),
    );
    service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();

    let config = StackConfigLoader::new(dir.path())
        .load("logic-app", "dev", Some(&store))
        .unwrap();
    let summary = service
        .up("logic-app", ctx("logic-app", "dev"), config)
        .unwrap();
    assert!(summary.state.output("endpoint").is_some());
}

#[test]
fn logic_app_without_base_stack_fails_before_creating_anything() {
    let h = harness();
    let err = h
        .service
        .up(
            "logic-app",
            ctx("logic-app", "dev"),
            StackConfig::new("logic-app").with_value("baseProjectName", "base-infra"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Application(ApplicationError::StackNotFound { ref stack })
            if stack == "organization/base-infra/dev"
    ));
    assert!(h.cloud.is_empty());
}

#[test]
fn events_follow_the_work() {
    let h = harness();
    h.service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();
    let summary = h
        .service
        .up(
            "logic-app",
            ctx("logic-app", "dev"),
            StackConfig::new("logic-app").with_value("baseProjectName", "base-infra"),
        )
        .unwrap();

    let position = |pred: &dyn Fn(&DeploymentEvent) -> bool| {
        summary.events.iter().position(pred).unwrap()
    };
    let keys = position(&|e| {
        matches!(e, DeploymentEvent::Invoked { function: Function::ListDatabaseAccountKeys })
    });
    let connection = position(&|e| {
        matches!(e, DeploymentEvent::Created { resource_type: ResourceType::Connection, .. })
    });
    let workflow = position(&|e| {
        matches!(e, DeploymentEvent::Created { resource_type: ResourceType::Workflow, .. })
    });
    let callback = position(&|e| {
        matches!(e, DeploymentEvent::Invoked { function: Function::ListWorkflowTriggerCallbackUrl })
    });
    let exported = position(&|e| matches!(e, DeploymentEvent::Exported { .. }));
    assert!(keys < connection);
    assert!(connection < workflow);
    assert!(workflow < callback);
    assert!(callback < exported);
}

#[test]
fn re_running_up_is_idempotent() {
    let h = harness();
    let first = h
        .service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();
    let resources = h.cloud.len();
    let second = h
        .service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();

    assert_eq!(h.cloud.len(), resources);
    assert_eq!(first.state.outputs, second.state.outputs);
    assert_eq!(first.state.resources, second.state.resources);
}

#[test]
fn protected_stack_cannot_be_destroyed() {
    let h = harness();
    h.service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();
    let stack: StackRef = "organization/base-infra/dev".parse().unwrap();

    let err = h.service.destroy(&stack).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Application(ApplicationError::ProtectedResource { .. })
    ));
    assert_eq!(h.cloud.len(), 5);
    assert!(h.service.state(&stack).unwrap().is_some());
}

#[test]
fn unprotected_stacks_destroy_in_reverse_order() {
    let h = harness();
    h.service
        .up(
            "base-infra",
            ctx("base-infra", "dev"),
            base_config().with_value("protect_flag", "false"),
        )
        .unwrap();
    h.service
        .up(
            "logic-app",
            ctx("logic-app", "dev"),
            StackConfig::new("logic-app").with_value("baseProjectName", "base-infra"),
        )
        .unwrap();

    let app: StackRef = "organization/logic-app/dev".parse().unwrap();
    let summary = h.service.destroy(&app).unwrap();
    let names: Vec<&str> = summary.deleted.iter().map(|u| u.name()).collect();
    assert_eq!(names, ["workflow", "connection"]);

    let base: StackRef = "organization/base-infra/dev".parse().unwrap();
    h.service.destroy(&base).unwrap();
    assert!(h.cloud.is_empty());
    assert!(h.service.stacks().unwrap().is_empty());
}

#[test]
fn interrupted_destroy_can_be_finished_later() {
    let h = harness();
    h.service
        .up(
            "base-infra",
            ctx("base-infra", "dev"),
            base_config().with_value("protect_flag", "false"),
        )
        .unwrap();
    h.service
        .up(
            "logic-app",
            ctx("logic-app", "dev"),
            StackConfig::new("logic-app").with_value("baseProjectName", "base-infra"),
        )
        .unwrap();
    let base: StackRef = "organization/base-infra/dev".parse().unwrap();
    let app: StackRef = "organization/logic-app/dev".parse().unwrap();

    // The resource group still holds the logic app's resources.
    let err = h.service.destroy(&base).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Application(ApplicationError::ProviderFailed { .. })
    ));
    let left = h.service.state(&base).unwrap().unwrap();
    let names: Vec<&str> = left.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["resourceGroup"]);
    assert_eq!(h.cloud.len(), 3);

    h.service.destroy(&app).unwrap();
    let summary = h.service.destroy(&base).unwrap();
    assert_eq!(
        summary.events,
        [DeploymentEvent::Deleted {
            urn: left.resources[0].urn.clone()
        }]
    );
    assert!(h.cloud.is_empty());
    assert!(h.service.stacks().unwrap().is_empty());
}

#[test]
fn preview_masks_unknowns_and_secrets() {
    let h = harness();
    h.service
        .up("base-infra", ctx("base-infra", "dev"), base_config())
        .unwrap();
    let preview = h
        .service
        .preview(
            "logic-app",
            ctx("logic-app", "dev"),
            StackConfig::new("logic-app").with_value("baseProjectName", "base-infra"),
        )
        .unwrap();

    assert_eq!(preview.steps.len(), 2);
    let connection = &preview.steps[0].inputs;
    assert_eq!(
        connection["properties"]["parameterValues"]["accessKey"],
        json!("[secret]")
    );
    assert_eq!(preview.outputs["endpoint"], json!("[unknown]"));

    let rendered = h.service.render(&preview).unwrap();
    assert!(rendered.contains("/dbs/sqldb/colls/container/docs"));
    assert!(!rendered.contains("=="));
}
