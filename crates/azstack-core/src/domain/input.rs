//! Property-bag trees mixing known and deferred values.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::domain::{
    error::{DomainError, DomainResult},
    output::{Output, Resolve, Unresolved},
    resource::Urn,
};

/// Placeholder shown for values that are only known after deployment.
pub const UNKNOWN_PLACEHOLDER: &str = "[unknown]";
/// Placeholder shown in place of secret values.
pub const SECRET_PLACEHOLDER: &str = "[secret]";

/// A resource input, function argument or stack export.
#[derive(Debug, Clone)]
pub enum Input {
    Value(Value),
    Deferred(Output<Value>),
    Object(BTreeMap<String, Input>),
    Array(Vec<Input>),
}

impl Input {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Input)>) -> Self {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(items: impl IntoIterator<Item = Input>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    /// Resources that must be realized before this input resolves.
    pub fn dependencies(&self) -> BTreeSet<Urn> {
        match self {
            Self::Value(_) => BTreeSet::new(),
            Self::Deferred(out) => out.dependencies().clone(),
            Self::Object(map) => map.values().flat_map(Input::dependencies).collect(),
            Self::Array(items) => items.iter().flat_map(Input::dependencies).collect(),
        }
    }

    /// `true` if any leaf is secret.
    pub fn is_secret(&self) -> bool {
        match self {
            Self::Value(_) => false,
            Self::Deferred(out) => out.is_secret(),
            Self::Object(map) => map.values().any(Input::is_secret),
            Self::Array(items) => items.iter().any(Input::is_secret),
        }
    }

    pub fn resolve(&self, resolver: &dyn Resolve) -> DomainResult<Value> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Deferred(out) => out.resolve(resolver),
            Self::Object(map) => {
                let mut resolved = Map::new();
                for (key, input) in map {
                    resolved.insert(key.clone(), input.resolve(resolver)?);
                }
                Ok(Value::Object(resolved))
            }
            Self::Array(items) => items
                .iter()
                .map(|i| i.resolve(resolver))
                .collect::<DomainResult<Vec<_>>>()
                .map(Value::Array),
        }
    }

    /// Render for display before deployment: deferred values that cannot be
    /// computed yet become [`UNKNOWN_PLACEHOLDER`], secrets become
    /// [`SECRET_PLACEHOLDER`].
    pub fn preview(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Deferred(out) if out.is_secret() => Value::String(SECRET_PLACEHOLDER.into()),
            Self::Deferred(out) => out
                .resolve(&Unresolved)
                .unwrap_or_else(|_| Value::String(UNKNOWN_PLACEHOLDER.into())),
            Self::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.preview()))
                    .collect(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(Input::preview).collect()),
        }
    }

    /// The value if it can be computed without any realized state.
    pub fn known(&self) -> Option<Value> {
        self.resolve(&Unresolved).ok()
    }

    /// Child of an object input.
    pub fn get(&self, key: &str) -> Option<&Input> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Follow a path of object keys.
    pub fn pointer(&self, path: &[&str]) -> Option<&Input> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Insert into an object input.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Input>) -> DomainResult<()> {
        match self {
            Self::Object(map) => {
                map.insert(key.into(), value.into());
                Ok(())
            }
            _ => Err(DomainError::TypeMismatch {
                what: key.into(),
                expected: "an object input",
            }),
        }
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<u32> for Input {
    fn from(value: u32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<Output<Value>> for Input {
    fn from(value: Output<Value>) -> Self {
        Self::Deferred(value)
    }
}

impl From<Output<String>> for Input {
    fn from(value: Output<String>) -> Self {
        Self::Deferred(value.map(Value::String))
    }
}

impl From<&Output<String>> for Input {
    fn from(value: &Output<String>) -> Self {
        Self::from(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::resource::ResourceType;

    fn deferred(name: &str) -> Output<String> {
        Output::property(
            Urn::new("dev", "p", ResourceType::ResourceGroup, name),
            "name",
        )
        .as_string()
    }

    #[test]
    fn dependencies_collect_through_nesting() {
        let input = Input::object([
            ("plain", Input::from("x")),
            (
                "nested",
                Input::array([Input::from(deferred("a")), Input::from(deferred("b"))]),
            ),
        ]);
        assert_eq!(input.dependencies().len(), 2);
    }

    #[test]
    fn preview_masks_unknown_and_secret() {
        let input = Input::object([
            ("known", Input::from(Output::known("v".to_string()))),
            ("later", Input::from(deferred("a"))),
            ("key", Input::from(Output::known("k".to_string()).as_secret())),
        ]);
        assert_eq!(
            input.preview(),
            json!({ "known": "v", "later": UNKNOWN_PLACEHOLDER, "key": SECRET_PLACEHOLDER })
        );
    }

    #[test]
    fn pointer_walks_objects() {
        let input = Input::object([(
            "properties",
            Input::object([("displayName", Input::from("conn"))]),
        )]);
        let leaf = input.pointer(&["properties", "displayName"]).unwrap();
        assert_eq!(leaf.known(), Some(json!("conn")));
        assert!(input.pointer(&["properties", "missing"]).is_none());
    }

    #[test]
    fn insert_rejects_non_objects() {
        let mut input = Input::from("scalar");
        assert!(input.insert("k", "v").is_err());
    }
}
