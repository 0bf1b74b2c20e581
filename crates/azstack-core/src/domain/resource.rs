//! Resource identity and declarations.
//!
//! A [`ResourceDeclaration`] is the desired state of one cloud resource: its
//! type token, logical name, input property bag and options. Identities
//! ([`Urn`]) are assigned when the resource is declared; everything the cloud
//! computes (ids, keys, endpoints) is only reachable through deferred values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::input::Input;

/// Input property bag of a resource, keyed by property name.
pub type Props = BTreeMap<String, Input>;

// ── Urn ──────────────────────────────────────────────────────────────────────

/// Unique resource name: `urn:azstack:{stack}::{project}::{type}::{name}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    pub fn new(stack: &str, project: &str, resource_type: ResourceType, name: &str) -> Self {
        Self(format!(
            "urn:azstack:{stack}::{project}::{}::{name}",
            resource_type.token()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Logical name (last segment).
    pub fn name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Type tokens ──────────────────────────────────────────────────────────────

/// Resource types this crate knows how to declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "azure-native:resources:ResourceGroup")]
    ResourceGroup,
    #[serde(rename = "azure-native:storage:StorageAccount")]
    StorageAccount,
    #[serde(rename = "azure-native:documentdb:DatabaseAccount")]
    DatabaseAccount,
    #[serde(rename = "azure-native:documentdb:SqlResourceSqlDatabase")]
    SqlDatabase,
    #[serde(rename = "azure-native:documentdb:SqlResourceSqlContainer")]
    SqlContainer,
    #[serde(rename = "azure-native:web:Connection")]
    Connection,
    #[serde(rename = "azure-native:logic:Workflow")]
    Workflow,
}

impl ResourceType {
    pub const ALL: &'static [ResourceType] = &[
        Self::ResourceGroup,
        Self::StorageAccount,
        Self::DatabaseAccount,
        Self::SqlDatabase,
        Self::SqlContainer,
        Self::Connection,
        Self::Workflow,
    ];

    pub const fn token(self) -> &'static str {
        match self {
            Self::ResourceGroup => "azure-native:resources:ResourceGroup",
            Self::StorageAccount => "azure-native:storage:StorageAccount",
            Self::DatabaseAccount => "azure-native:documentdb:DatabaseAccount",
            Self::SqlDatabase => "azure-native:documentdb:SqlResourceSqlDatabase",
            Self::SqlContainer => "azure-native:documentdb:SqlResourceSqlContainer",
            Self::Connection => "azure-native:web:Connection",
            Self::Workflow => "azure-native:logic:Workflow",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.token() == token)
    }

    /// Input property carrying the physical name of the resource.
    pub const fn name_property(self) -> &'static str {
        match self {
            Self::ResourceGroup => "resourceGroupName",
            Self::StorageAccount | Self::DatabaseAccount => "accountName",
            Self::SqlDatabase => "databaseName",
            Self::SqlContainer => "containerName",
            Self::Connection => "connectionName",
            Self::Workflow => "workflowName",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Provider functions (invokes) this crate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    #[serde(rename = "azure-native:documentdb:listDatabaseAccountKeys")]
    ListDatabaseAccountKeys,
    #[serde(rename = "azure-native:authorization:getClientConfig")]
    GetClientConfig,
    #[serde(rename = "azure-native:logic:listWorkflowTriggerCallbackUrl")]
    ListWorkflowTriggerCallbackUrl,
}

impl Function {
    pub const fn token(self) -> &'static str {
        match self {
            Self::ListDatabaseAccountKeys => "azure-native:documentdb:listDatabaseAccountKeys",
            Self::GetClientConfig => "azure-native:authorization:getClientConfig",
            Self::ListWorkflowTriggerCallbackUrl => {
                "azure-native:logic:listWorkflowTriggerCallbackUrl"
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Per-resource options. Registered transforms may override them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOptions {
    /// Protected resources cannot be destroyed.
    pub protect: bool,
    /// Explicit ordering edges in addition to those implied by inputs.
    pub depends_on: Vec<Urn>,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protect(protect: bool) -> Self {
        Self {
            protect,
            ..Self::default()
        }
    }

    pub fn depends_on(mut self, urn: &Urn) -> Self {
        self.depends_on.push(urn.clone());
        self
    }
}

// ── Declaration ──────────────────────────────────────────────────────────────

/// Desired state of one resource, as handed to the engine.
#[derive(Debug, Clone)]
pub struct ResourceDeclaration {
    pub(crate) urn: Urn,
    pub(crate) resource_type: ResourceType,
    pub(crate) name: String,
    pub(crate) inputs: Props,
    pub(crate) options: ResourceOptions,
    pub(crate) applied_transforms: Vec<String>,
}

impl ResourceDeclaration {
    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &Props {
        &self.inputs
    }

    pub fn input(&self, key: &str) -> Option<&Input> {
        self.inputs.get(key)
    }

    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    pub fn is_protected(&self) -> bool {
        self.options.protect
    }

    /// Names of the transforms that touched this declaration, in order.
    pub fn applied_transforms(&self) -> &[String] {
        &self.applied_transforms
    }

    /// Every resource this one must wait for.
    pub fn dependencies(&self) -> BTreeSet<Urn> {
        let mut deps: BTreeSet<Urn> = self
            .inputs
            .values()
            .flat_map(|input| input.dependencies())
            .collect();
        deps.extend(self.options.depends_on.iter().cloned());
        deps.remove(&self.urn);
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urn_layout_and_name() {
        let urn = Urn::new("dev", "base-infra", ResourceType::ResourceGroup, "resourceGroup");
        assert_eq!(
            urn.as_str(),
            "urn:azstack:dev::base-infra::azure-native:resources:ResourceGroup::resourceGroup"
        );
        assert_eq!(urn.name(), "resourceGroup");
    }

    #[test]
    fn type_tokens_round_trip() {
        for t in ResourceType::ALL {
            assert_eq!(ResourceType::from_token(t.token()), Some(*t));
        }
        assert_eq!(ResourceType::from_token("aws:s3:Bucket"), None);
    }

    #[test]
    fn type_serializes_as_token() {
        let json = serde_json::to_string(&ResourceType::Workflow).unwrap();
        assert_eq!(json, "\"azure-native:logic:Workflow\"");
    }
}
