//! Deterministic stand-in for the Azure resource-management API.
//!
//! Resources get ARM-style ids under the configured subscription. Children
//! are only accepted when their parents exist. Secrets (account keys, trigger
//! signatures) are derived with UUIDv5 from the resource id, so the same
//! inputs always produce the same outputs.
//!
//! The whole cloud can be snapshotted to a JSON file; separate processes
//! opening the same file see the same resources.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};
use uuid::Uuid;

use azstack_core::{
    application::{ApplicationError, ports::CloudProvider},
    domain::{Function, FunctionCall, ProviderResource, ResourceType},
    error::{Context, CoreError, CoreResult},
};

const DEFAULT_SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

/// Authentication context answered by `getClientConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudIdentity {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub object_id: String,
}

impl CloudIdentity {
    /// Identity for `subscription_id`; the other ids are derived from it.
    pub fn for_subscription(subscription_id: impl Into<String>) -> Self {
        let subscription_id = subscription_id.into();
        let derive = |what: &str| {
            Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{subscription_id}/{what}").as_bytes())
                .to_string()
        };
        Self {
            tenant_id: derive("tenant"),
            client_id: derive("client"),
            object_id: derive("object"),
            subscription_id,
        }
    }
}

impl Default for CloudIdentity {
    fn default() -> Self {
        Self::for_subscription(DEFAULT_SUBSCRIPTION)
    }
}

/// A resource as the simulated cloud stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedResource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    /// Inputs exactly as submitted.
    pub inputs: Value,
    pub outputs: Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CloudInner {
    #[serde(default)]
    resources: BTreeMap<String, SimulatedResource>,
}

/// In-process fake of the Azure control plane.
#[derive(Clone)]
pub struct SimulatedCloud {
    identity: CloudIdentity,
    inner: Arc<RwLock<CloudInner>>,
    snapshot: Option<PathBuf>,
}

impl SimulatedCloud {
    pub fn new(identity: CloudIdentity) -> Self {
        Self {
            identity,
            inner: Arc::new(RwLock::new(CloudInner::default())),
            snapshot: None,
        }
    }

    /// Open (or start) a cloud persisted at `path`.
    pub fn open(path: impl Into<PathBuf>, identity: CloudIdentity) -> CoreResult<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let text = fs::read_to_string(&path)
                .context(format!("reading cloud snapshot {}", path.display()))?;
            serde_json::from_str(&text)
                .context(format!("parsing cloud snapshot {}", path.display()))?
        } else {
            CloudInner::default()
        };
        debug!(path = %path.display(), resources = inner.resources.len(), "Opened simulated cloud");
        Ok(Self {
            identity,
            inner: Arc::new(RwLock::new(inner)),
            snapshot: Some(path),
        })
    }

    pub fn identity(&self) -> &CloudIdentity {
        &self.identity
    }

    /// Resource stored under `id`.
    pub fn resource(&self, id: &str) -> Option<SimulatedResource> {
        self.inner.read().ok()?.resources.get(id).cloned()
    }

    /// Ids of every stored resource, sorted.
    pub fn resource_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.resources.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.resources.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self, inner: &CloudInner) -> CoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context(format!("creating {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(inner).context("serializing cloud snapshot")?;
        fs::write(path, text).context(format!("writing cloud snapshot {}", path.display()))
    }

    fn resource_group_id(&self, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{name}",
            self.identity.subscription_id
        )
    }

    /// Id and location of the resource group named in `inputs`.
    ///
    /// An explicit `location` input wins over the group's.
    fn parent_group(
        &self,
        inner: &CloudInner,
        inputs: &Value,
        operation: &str,
    ) -> CoreResult<(String, String)> {
        let rg_id = self.resource_group_id(str_input(inputs, "resourceGroupName", operation)?);
        let rg = require(inner, &rg_id, "resource group", operation)?;
        let location = inputs
            .get("location")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| location_of(rg));
        Ok((rg_id, location))
    }

    fn derive(&self, id: &str, what: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{id}#{what}").as_bytes())
            .simple()
            .to_string()
    }
}

fn str_input<'a>(inputs: &'a Value, key: &str, operation: &str) -> CoreResult<&'a str> {
    inputs
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::provider(operation, format!("'{key}' is required")))
}

fn require<'a>(
    inner: &'a CloudInner,
    id: &str,
    what: &str,
    operation: &str,
) -> CoreResult<&'a SimulatedResource> {
    inner
        .resources
        .get(id)
        .ok_or_else(|| CoreError::provider(operation, format!("{what} '{id}' was not found")))
}

fn location_of(resource: &SimulatedResource) -> String {
    resource.outputs["location"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

impl CloudProvider for SimulatedCloud {
    #[instrument(skip_all, fields(resource_type = %resource_type, name = %name))]
    fn create(
        &self,
        resource_type: ResourceType,
        name: &str,
        inputs: &Value,
    ) -> CoreResult<ProviderResource> {
        let op = "create";
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let (id, outputs) = match resource_type {
            ResourceType::ResourceGroup => {
                let location = str_input(inputs, "location", op)?;
                let id = self.resource_group_id(name);
                let outputs = json!({ "name": name, "location": location, "id": id });
                (id, outputs)
            }
            ResourceType::StorageAccount => {
                let (rg_id, location) = self.parent_group(&inner, inputs, op)?;
                let id = format!("{rg_id}/providers/Microsoft.Storage/storageAccounts/{name}");
                let outputs = json!({
                    "name": name,
                    "id": id,
                    "location": location,
                    "sku": inputs["sku"],
                    "kind": inputs["kind"],
                    "primaryBlobEndpoint": format!("https://{name}.blob.core.windows.net/"),
                });
                (id, outputs)
            }
            ResourceType::DatabaseAccount => {
                let (rg_id, location) = self.parent_group(&inner, inputs, op)?;
                let id = format!("{rg_id}/providers/Microsoft.DocumentDB/databaseAccounts/{name}");
                let outputs = json!({
                    "name": name,
                    "id": id,
                    "location": location,
                    "databaseAccountOfferType": inputs["databaseAccountOfferType"],
                    "consistencyPolicy": inputs["consistencyPolicy"],
                    "locations": inputs["locations"],
                    "documentEndpoint": format!("https://{name}.documents.azure.com:443/"),
                });
                (id, outputs)
            }
            ResourceType::SqlDatabase => {
                let (rg_id, _) = self.parent_group(&inner, inputs, op)?;
                let account = str_input(inputs, "accountName", op)?;
                let account_id =
                    format!("{rg_id}/providers/Microsoft.DocumentDB/databaseAccounts/{account}");
                require(&inner, &account_id, "database account", op)?;
                let id = format!("{account_id}/sqlDatabases/{name}");
                let outputs = json!({ "name": name, "id": id, "resource": inputs["resource"] });
                (id, outputs)
            }
            ResourceType::SqlContainer => {
                let (rg_id, _) = self.parent_group(&inner, inputs, op)?;
                let account = str_input(inputs, "accountName", op)?;
                let database = str_input(inputs, "databaseName", op)?;
                let database_id = format!(
                    "{rg_id}/providers/Microsoft.DocumentDB/databaseAccounts/{account}/sqlDatabases/{database}"
                );
                require(&inner, &database_id, "database", op)?;
                let id = format!("{database_id}/containers/{name}");
                let outputs = json!({ "name": name, "id": id, "resource": inputs["resource"] });
                (id, outputs)
            }
            ResourceType::Connection => {
                let (rg_id, location) = self.parent_group(&inner, inputs, op)?;
                let id = format!("{rg_id}/providers/Microsoft.Web/connections/{name}");
                // Parameter values are write-only.
                let mut properties = inputs["properties"].clone();
                if let Some(props) = properties.as_object_mut() {
                    props.remove("parameterValues");
                    props.insert("statuses".into(), json!([{ "status": "Connected" }]));
                }
                let outputs = json!({
                    "name": name,
                    "id": id,
                    "location": location,
                    "properties": properties,
                });
                (id, outputs)
            }
            ResourceType::Workflow => {
                let (rg_id, location) = self.parent_group(&inner, inputs, op)?;
                let id = format!("{rg_id}/providers/Microsoft.Logic/workflows/{name}");
                let outputs = json!({
                    "name": name,
                    "id": id,
                    "location": location,
                    "state": "Enabled",
                    "accessEndpoint": format!(
                        "https://prod-00.{location}.logic.azure.com:443/workflows/{}",
                        self.derive(&id, "workflow")
                    ),
                });
                (id, outputs)
            }
        };

        inner.resources.insert(
            id.clone(),
            SimulatedResource {
                resource_type,
                name: name.to_string(),
                inputs: inputs.clone(),
                outputs: outputs.clone(),
            },
        );
        self.save(&inner)?;
        debug!(%id, "Created");
        Ok(ProviderResource { id, outputs })
    }

    #[instrument(skip(self, call), fields(function = %call.function))]
    fn invoke(&self, call: &FunctionCall) -> CoreResult<Value> {
        let op = call.function.token();
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        match call.function {
            Function::GetClientConfig => serde_json::to_value(&self.identity)
                .map_err(|e| CoreError::provider(op, e)),

            Function::ListDatabaseAccountKeys => {
                let account = str_input(&call.args, "accountName", op)?;
                let rg = str_input(&call.args, "resourceGroupName", op)?;
                let id = format!(
                    "{}/providers/Microsoft.DocumentDB/databaseAccounts/{account}",
                    self.resource_group_id(rg)
                );
                require(&inner, &id, "database account", op)?;
                let key = |what: &str| {
                    format!("{}{}==", self.derive(&id, what), self.derive(&id, &format!("{what}-2")))
                };
                Ok(json!({
                    "primaryMasterKey": key("primary"),
                    "secondaryMasterKey": key("secondary"),
                    "primaryReadonlyMasterKey": key("primary-readonly"),
                    "secondaryReadonlyMasterKey": key("secondary-readonly"),
                }))
            }

            Function::ListWorkflowTriggerCallbackUrl => {
                let rg = str_input(&call.args, "resourceGroupName", op)?;
                let workflow = str_input(&call.args, "workflowName", op)?;
                let trigger = str_input(&call.args, "triggerName", op)?;
                let id = format!(
                    "{}/providers/Microsoft.Logic/workflows/{workflow}",
                    self.resource_group_id(rg)
                );
                let resource = require(&inner, &id, "workflow", op)?;
                let trigger_def = resource
                    .inputs
                    .pointer(&format!("/definition/triggers/{trigger}"))
                    .ok_or_else(|| {
                        CoreError::provider(op, format!("workflow '{workflow}' has no trigger '{trigger}'"))
                    })?;
                let method = trigger_def
                    .pointer("/inputs/method")
                    .and_then(Value::as_str)
                    .unwrap_or("POST");

                let location = location_of(resource);
                let base_path = format!(
                    "https://prod-00.{location}.logic.azure.com/workflows/{}/triggers/{trigger}/paths/invoke",
                    self.derive(&id, "workflow")
                );
                let value = format!(
                    "https://prod-00.{location}.logic.azure.com:443/workflows/{}/triggers/{trigger}/paths/invoke?api-version=2016-10-01&sp=%2Ftriggers%2F{trigger}%2Frun&sv=1.0&sig={}",
                    self.derive(&id, "workflow"),
                    self.derive(&id, &format!("sig/{trigger}"))
                );
                Ok(json!({
                    "value": value,
                    "basePath": base_path,
                    "method": method,
                    "relativePath": "",
                }))
            }
        }
    }

    #[instrument(skip_all, fields(resource_type = %resource_type, id = %id))]
    fn delete(&self, resource_type: ResourceType, id: &str) -> CoreResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let prefix = format!("{id}/");
        if inner.resources.keys().any(|k| k.starts_with(&prefix)) {
            return Err(CoreError::provider(
                "delete",
                format!("'{id}' still contains child resources"),
            ));
        }
        match inner.resources.remove(id) {
            Some(_) => {
                self.save(&inner)?;
                debug!(%id, "Deleted");
                Ok(())
            }
            None => Err(CoreError::provider("delete", format!("'{id}' was not found"))),
        }
    }
}

impl std::fmt::Debug for SimulatedCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedCloud")
            .field("subscription_id", &self.identity.subscription_id)
            .field("resources", &self.len())
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

/// Default snapshot location inside a backend directory.
pub fn snapshot_path(backend_dir: &Path) -> PathBuf {
    backend_dir.join("cloud.json")
}
