//! The five-field contract passed from the base stack to its dependents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Outputs of the base stack consumed by dependent stacks.
///
/// Every field is required. There are no defaults: a missing or empty value
/// aborts resolution with the name of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossStackOutputs {
    pub cosmosdb_account_name: String,
    pub resource_group_name: String,
    pub resource_group_location: String,
    pub db_name: String,
    pub db_container_name: String,
}

impl CrossStackOutputs {
    pub const COSMOSDB_ACCOUNT_NAME: &'static str = "cosmosdb_account_name";
    pub const RESOURCE_GROUP_NAME: &'static str = "resource_group_name";
    pub const RESOURCE_GROUP_LOCATION: &'static str = "resource_group_location";
    pub const DB_NAME: &'static str = "db_name";
    pub const DB_CONTAINER_NAME: &'static str = "db_container_name";

    /// Output names, in contract order.
    pub const KEYS: [&'static str; 5] = [
        Self::COSMOSDB_ACCOUNT_NAME,
        Self::RESOURCE_GROUP_NAME,
        Self::RESOURCE_GROUP_LOCATION,
        Self::DB_NAME,
        Self::DB_CONTAINER_NAME,
    ];

    /// Build the contract from a lookup, failing on the first absent field.
    ///
    /// `provenance` names where the values came from, for error messages.
    pub fn from_lookup<F>(provenance: &str, mut lookup: F) -> DomainResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut field = |name: &str| -> DomainResult<String> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DomainError::MissingStackOutput {
                    name: name.into(),
                    provenance: provenance.into(),
                })
        };

        Ok(Self {
            cosmosdb_account_name: field(Self::COSMOSDB_ACCOUNT_NAME)?,
            resource_group_name: field(Self::RESOURCE_GROUP_NAME)?,
            resource_group_location: field(Self::RESOURCE_GROUP_LOCATION)?,
            db_name: field(Self::DB_NAME)?,
            db_container_name: field(Self::DB_CONTAINER_NAME)?,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            Self::COSMOSDB_ACCOUNT_NAME => Some(&self.cosmosdb_account_name),
            Self::RESOURCE_GROUP_NAME => Some(&self.resource_group_name),
            Self::RESOURCE_GROUP_LOCATION => Some(&self.resource_group_location),
            Self::DB_NAME => Some(&self.db_name),
            Self::DB_CONTAINER_NAME => Some(&self.db_container_name),
            _ => None,
        }
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        Self::KEYS
            .iter()
            .filter_map(|k| self.get(k).map(|v| (k.to_string(), v.to_string())))
            .collect()
    }

    /// Document path of the container these outputs describe.
    pub fn docs_path(&self) -> String {
        docs_path(&self.db_name, &self.db_container_name)
    }
}

/// `/dbs/{db}/colls/{container}/docs`
pub fn docs_path(db_name: &str, container_name: &str) -> String {
    format!("/dbs/{db_name}/colls/{container_name}/docs")
}
