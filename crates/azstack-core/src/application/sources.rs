//! Where a dependent stack gets the base stack's outputs from.
//!
//! Both sources produce the same [`CrossStackOutputs`] and fail the same way
//! when a field is absent; they differ only in provenance.

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use crate::application::{ApplicationError, ports::StateStore};
use crate::domain::{CrossStackOutputs, StackConfig, StackContext, StackRef};
use crate::error::{CoreError, CoreResult};

/// Config key selecting the source kind.
pub const SOURCE_KEY: &str = "crossStackSource";
/// Config key naming the base project for stack references.
pub const BASE_PROJECT_KEY: &str = "baseProjectName";

pub trait CrossStackSource {
    /// Human-readable origin of the values, used in error messages.
    fn provenance(&self) -> String;

    fn resolve(&self) -> CoreResult<CrossStackOutputs>;
}

/// Live reference to another stack's recorded outputs.
pub struct StackReferenceSource<'a> {
    store: &'a dyn StateStore,
    stack_ref: StackRef,
}

impl<'a> StackReferenceSource<'a> {
    pub fn new(store: &'a dyn StateStore, stack_ref: StackRef) -> Self {
        Self { store, stack_ref }
    }

    /// Reference the same organization and stage of the project named by
    /// `baseProjectName`.
    pub fn from_context(
        store: &'a dyn StateStore,
        context: &StackContext,
        config: &StackConfig,
    ) -> CoreResult<Self> {
        let base_project = config.require(BASE_PROJECT_KEY)?;
        Ok(Self::new(store, context.sibling(base_project)?))
    }

    pub fn stack_ref(&self) -> &StackRef {
        &self.stack_ref
    }
}

impl CrossStackSource for StackReferenceSource<'_> {
    fn provenance(&self) -> String {
        format!("stack {}", self.stack_ref)
    }

    #[instrument(skip(self), fields(stack = %self.stack_ref))]
    fn resolve(&self) -> CoreResult<CrossStackOutputs> {
        let state = self
            .store
            .get(&self.stack_ref)?
            .ok_or_else(|| ApplicationError::StackNotFound {
                stack: self.stack_ref.to_string(),
            })?;
        Ok(CrossStackOutputs::from_lookup(&self.provenance(), |key| {
            state.output_string(key)
        })?)
    }
}

/// Values already present in stack configuration, typically supplied by an
/// imported environment.
pub struct ConfigSource<'a> {
    config: &'a StackConfig,
}

impl<'a> ConfigSource<'a> {
    pub fn new(config: &'a StackConfig) -> Self {
        Self { config }
    }
}

impl CrossStackSource for ConfigSource<'_> {
    fn provenance(&self) -> String {
        "stack configuration".into()
    }

    fn resolve(&self) -> CoreResult<CrossStackOutputs> {
        Ok(CrossStackOutputs::from_lookup(&self.provenance(), |key| {
            self.config.get(key).map(str::to_string)
        })?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Reference,
    Config,
}

impl SourceKind {
    /// Explicit `crossStackSource`, else `reference` when a base project is
    /// configured, else `config`.
    pub fn for_config(config: &StackConfig) -> CoreResult<Self> {
        match config.get(SOURCE_KEY) {
            Some(value) => value.parse(),
            None if config.get(BASE_PROJECT_KEY).is_some() => Ok(Self::Reference),
            None => Ok(Self::Config),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "reference",
            Self::Config => "config",
        })
    }
}

impl FromStr for SourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reference" | "stack-reference" => Ok(Self::Reference),
            "config" | "environment" => Ok(Self::Config),
            _ => Err(ApplicationError::UnknownSourceKind { value: s.into() }.into()),
        }
    }
}

/// Pick the source the stack configuration asks for.
pub fn select_source<'a>(
    config: &'a StackConfig,
    context: &StackContext,
    store: &'a dyn StateStore,
) -> CoreResult<Box<dyn CrossStackSource + 'a>> {
    let kind = SourceKind::for_config(config)?;
    tracing::debug!(%kind, "Selected cross-stack source");
    Ok(match kind {
        SourceKind::Reference => Box::new(StackReferenceSource::from_context(store, context, config)?),
        SourceKind::Config => Box::new(ConfigSource::new(config)),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::application::ports::MockStateStore;
    use crate::domain::{DomainError, StackOutput, StackState};

    const VALUES: [(&str, &str); 5] = [
        ("cosmosdb_account_name", "logicappdemo-cdb"),
        ("resource_group_name", "resourceGroup"),
        ("resource_group_location", "westus2"),
        ("db_name", "sqldb"),
        ("db_container_name", "container"),
    ];

    fn base_state(skip: Option<&str>) -> StackState {
        let mut state = StackState::new("org/base-infra/dev".parse().unwrap());
        state.outputs = VALUES
            .iter()
            .filter(|(k, _)| Some(*k) != skip)
            .map(|(k, v)| {
                (
                    k.to_string(),
                    StackOutput {
                        value: json!(v),
                        secret: *k == "resource_group_location",
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        state
    }

    fn context() -> StackContext {
        StackContext::new("org", "logic-app", "dev").unwrap()
    }

    fn expected() -> CrossStackOutputs {
        CrossStackOutputs::from_lookup("test", |k| {
            VALUES.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn reference_reads_sibling_stack_outputs() {
        let mut store = MockStateStore::new();
        store
            .expect_get()
            .withf(|r| r.to_string() == "org/base-infra/dev")
            .times(1)
            .returning(|_| Ok(Some(base_state(None))));

        let config = StackConfig::new("logic-app").with_value(BASE_PROJECT_KEY, "base-infra");
        let source = StackReferenceSource::from_context(&store, &context(), &config).unwrap();
        assert_eq!(source.resolve().unwrap(), expected());
    }

    #[test]
    fn reference_names_each_missing_output() {
        for (missing, _) in VALUES {
            let mut store = MockStateStore::new();
            store
                .expect_get()
                .returning(move |_| Ok(Some(base_state(Some(missing)))));
            let source =
                StackReferenceSource::new(&store, "org/base-infra/dev".parse().unwrap());
            let err = source.resolve().unwrap_err();
            assert_eq!(
                err,
                CoreError::Domain(DomainError::MissingStackOutput {
                    name: missing.into(),
                    provenance: "stack org/base-infra/dev".into(),
                })
            );
        }
    }

    #[test]
    fn reference_to_unknown_stack_fails() {
        let mut store = MockStateStore::new();
        store.expect_get().returning(|_| Ok(None));
        let source = StackReferenceSource::new(&store, "org/base-infra/dev".parse().unwrap());
        assert!(matches!(
            source.resolve(),
            Err(CoreError::Application(ApplicationError::StackNotFound { .. }))
        ));
    }

    #[test]
    fn reference_requires_base_project_name() {
        let store = MockStateStore::new();
        let config = StackConfig::new("logic-app");
        let err = StackReferenceSource::from_context(&store, &context(), &config)
            .err()
            .unwrap();
        assert_eq!(
            err,
            CoreError::Domain(DomainError::MissingConfig {
                key: BASE_PROJECT_KEY.into()
            })
        );
    }

    #[test]
    fn config_source_names_each_missing_field() {
        for (missing, _) in VALUES {
            let mut config = StackConfig::new("logic-app");
            for (k, v) in VALUES.iter().filter(|(k, _)| *k != missing) {
                config.set(*k, *v, false);
            }
            let err = ConfigSource::new(&config).resolve().unwrap_err();
            assert_eq!(
                err,
                CoreError::Domain(DomainError::MissingStackOutput {
                    name: missing.into(),
                    provenance: "stack configuration".into(),
                })
            );
        }
    }

    #[test]
    fn both_sources_agree() {
        let mut store = MockStateStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(base_state(None))));
        let mut config = StackConfig::new("logic-app");
        for (k, v) in VALUES {
            config.set(k, v, false);
        }
        let from_ref = StackReferenceSource::new(&store, "org/base-infra/dev".parse().unwrap())
            .resolve()
            .unwrap();
        let from_config = ConfigSource::new(&config).resolve().unwrap();
        assert_eq!(from_ref, from_config);
    }

    #[test]
    fn selection_defaults_and_overrides() {
        let plain = StackConfig::new("p");
        assert_eq!(SourceKind::for_config(&plain).unwrap(), SourceKind::Config);

        let with_base = StackConfig::new("p").with_value(BASE_PROJECT_KEY, "base-infra");
        assert_eq!(SourceKind::for_config(&with_base).unwrap(), SourceKind::Reference);

        let forced = with_base.clone().with_value(SOURCE_KEY, "config");
        assert_eq!(SourceKind::for_config(&forced).unwrap(), SourceKind::Config);

        let bad = StackConfig::new("p").with_value(SOURCE_KEY, "carrier-pigeon");
        assert!(matches!(
            SourceKind::for_config(&bad),
            Err(CoreError::Application(ApplicationError::UnknownSourceKind { .. }))
        ));
    }

    #[test]
    fn select_source_reports_provenance() {
        let store = MockStateStore::new();
        let config = StackConfig::new("logic-app");
        let source = select_source(&config, &context(), &store).unwrap();
        assert_eq!(source.provenance(), "stack configuration");

        let config = StackConfig::new("logic-app").with_value(BASE_PROJECT_KEY, "base-infra");
        let source = select_source(&config, &context(), &store).unwrap();
        assert_eq!(source.provenance(), "stack org/base-infra/dev");
    }
}
