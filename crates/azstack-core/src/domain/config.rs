//! Stack configuration.
//!
//! The settings a program reads while declaring resources. Values arrive
//! already merged (environment imports, then the stack file); the domain only
//! looks them up. A bare key falls back to its `project:key` spelling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::{DomainError, DomainResult},
    output::Output,
};

/// One configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub value: String,
    #[serde(default)]
    pub secret: bool,
}

/// Key/value settings for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackConfig {
    project: String,
    values: BTreeMap<String, ConfigEntry>,
}

impl StackConfig {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value, false);
        self
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value, true);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, secret: bool) {
        self.values.insert(
            key.into(),
            ConfigEntry {
                value: value.into(),
                secret,
            },
        );
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    fn lookup(&self, key: &str) -> Option<&ConfigEntry> {
        self.values
            .get(key)
            .or_else(|| self.values.get(&format!("{}:{key}", self.project)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lookup(key).map(|e| e.value.as_str())
    }

    /// Value of `key`, or [`DomainError::MissingConfig`].
    pub fn require(&self, key: &str) -> DomainResult<&str> {
        self.get(key).ok_or_else(|| DomainError::MissingConfig { key: key.into() })
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Boolean value of `key`; anything but `true`/`false` is an error.
    pub fn get_bool(&self, key: &str) -> DomainResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(v) => Err(DomainError::InvalidConfig {
                key: key.into(),
                reason: format!("expected true or false, found '{v}'"),
            }),
        }
    }

    /// Required value as a deferred handle that keeps the secret flag.
    pub fn require_output(&self, key: &str) -> DomainResult<Output<String>> {
        let entry = self
            .lookup(key)
            .ok_or_else(|| DomainError::MissingConfig { key: key.into() })?;
        let out = Output::known(entry.value.clone());
        Ok(if entry.secret { out.as_secret() } else { out })
    }

    pub fn is_secret(&self, key: &str) -> bool {
        self.lookup(key).is_some_and(|e| e.secret)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigEntry)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
