//! Realized stack state as persisted by a state store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    input::SECRET_PLACEHOLDER,
    resource::{ResourceType, Urn},
    stack::StackRef,
};

/// What a provider returns after creating a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResource {
    pub id: String,
    /// Output properties, always a JSON object.
    pub outputs: Value,
}

/// One resource after it has been created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedResource {
    pub urn: Urn,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub id: String,
    pub outputs: Value,
    #[serde(default)]
    pub protect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOutput {
    pub value: Value,
    #[serde(default)]
    pub secret: bool,
}

/// Everything known about a stack after its last `up`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackState {
    pub stack: StackRef,
    #[serde(default)]
    pub resources: Vec<RealizedResource>,
    #[serde(default)]
    pub outputs: BTreeMap<String, StackOutput>,
    pub updated_at: DateTime<Utc>,
}

impl StackState {
    pub fn new(stack: StackRef) -> Self {
        Self {
            stack,
            resources: Vec::new(),
            outputs: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn output(&self, name: &str) -> Option<&StackOutput> {
        self.outputs.get(name)
    }

    /// String value of an output; non-string outputs are rendered as JSON.
    pub fn output_string(&self, name: &str) -> Option<String> {
        self.output(name).map(|o| match &o.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Outputs for display, with secrets masked unless `show_secrets`.
    pub fn display_outputs(&self, show_secrets: bool) -> BTreeMap<String, Value> {
        self.outputs
            .iter()
            .map(|(k, o)| {
                let value = if o.secret && !show_secrets {
                    Value::String(SECRET_PLACEHOLDER.into())
                } else {
                    o.value.clone()
                };
                (k.clone(), value)
            })
            .collect()
    }

    pub fn resource(&self, urn: &Urn) -> Option<&RealizedResource> {
        self.resources.iter().find(|r| &r.urn == urn)
    }

    pub fn protected_resources(&self) -> impl Iterator<Item = &RealizedResource> {
        self.resources.iter().filter(|r| r.protect)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn state() -> StackState {
        let mut state = StackState::new("org/base-infra/dev".parse().unwrap());
        state.outputs.insert(
            "db_name".into(),
            StackOutput {
                value: json!("sqldb"),
                secret: false,
            },
        );
        state.outputs.insert(
            "key".into(),
            StackOutput {
                value: json!("hunter2"),
                secret: true,
            },
        );
        state
    }

    #[test]
    fn display_masks_secrets_by_default() {
        let s = state();
        let shown = s.display_outputs(false);
        assert_eq!(shown["db_name"], json!("sqldb"));
        assert_eq!(shown["key"], json!(SECRET_PLACEHOLDER));
        assert_eq!(s.display_outputs(true)["key"], json!("hunter2"));
    }

    #[test]
    fn output_string_reads_secrets_too() {
        let s = state();
        assert_eq!(s.output_string("key").as_deref(), Some("hunter2"));
        assert_eq!(s.output_string("missing"), None);
    }

    #[test]
    fn serializes_resource_type_as_token() {
        let mut s = state();
        s.resources.push(RealizedResource {
            urn: Urn::new("dev", "base-infra", ResourceType::ResourceGroup, "rg"),
            resource_type: ResourceType::ResourceGroup,
            name: "rg".into(),
            id: "/subscriptions/x/resourceGroups/rg".into(),
            outputs: json!({ "name": "rg" }),
            protect: true,
        });
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json["resources"][0]["type"],
            json!("azure-native:resources:ResourceGroup")
        );
        let back: StackState = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.protected_resources().count(), 1);
    }
}
