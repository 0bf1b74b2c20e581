//! The program port: the declarative body of a stack.

use serde::Serialize;

use crate::application::sources::{CrossStackSource, select_source};
use crate::application::ports::StateStore;
use crate::domain::{CrossStackOutputs, Deployment, StackConfig, StackContext};
use crate::error::CoreResult;

/// A named sequence of resource declarations.
pub trait Program: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Declare resources and exports into the context's deployment.
    fn run(&self, ctx: &mut ProgramContext<'_>) -> CoreResult<()>;
}

/// Listing entry for a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramInfo {
    pub name: String,
    pub description: String,
}

impl ProgramInfo {
    pub fn of(program: &dyn Program) -> Self {
        Self {
            name: program.name().to_string(),
            description: program.description().to_string(),
        }
    }
}

/// What a program sees while it runs.
///
/// Cross-stack outputs are resolved on first use, through the source the
/// stack configuration selects unless one was supplied up front.
pub struct ProgramContext<'a> {
    deployment: Deployment,
    state_store: &'a dyn StateStore,
    source: Option<Box<dyn CrossStackSource + 'a>>,
    resolved: Option<CrossStackOutputs>,
}

impl<'a> ProgramContext<'a> {
    pub fn new(deployment: Deployment, state_store: &'a dyn StateStore) -> Self {
        Self {
            deployment,
            state_store,
            source: None,
            resolved: None,
        }
    }

    /// Use `source` instead of the configured one.
    pub fn with_source(mut self, source: Box<dyn CrossStackSource + 'a>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn deployment(&mut self) -> &mut Deployment {
        &mut self.deployment
    }

    pub fn config(&self) -> &StackConfig {
        self.deployment.config()
    }

    pub fn context(&self) -> &StackContext {
        self.deployment.context()
    }

    /// The base stack's outputs, from whichever source applies.
    pub fn cross_stack_outputs(&mut self) -> CoreResult<CrossStackOutputs> {
        if let Some(resolved) = &self.resolved {
            return Ok(resolved.clone());
        }

        let outputs = match &self.source {
            Some(source) => {
                tracing::debug!(provenance = %source.provenance(), "Resolving cross-stack outputs");
                source.resolve()?
            }
            None => {
                let source = select_source(
                    self.deployment.config(),
                    self.deployment.context(),
                    self.state_store,
                )?;
                tracing::debug!(provenance = %source.provenance(), "Resolving cross-stack outputs");
                source.resolve()?
            }
        };
        self.resolved = Some(outputs.clone());
        Ok(outputs)
    }

    pub fn into_deployment(self) -> Deployment {
        self.deployment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockStateStore;
    use crate::application::sources::{BASE_PROJECT_KEY, ConfigSource};

    fn deployment() -> Deployment {
        let context = StackContext::new("org", "logic-app", "dev").unwrap();
        let config = StackConfig::new("logic-app").with_value(BASE_PROJECT_KEY, "base-infra");
        Deployment::new(context, config)
    }

    fn base_values() -> StackConfig {
        CrossStackOutputs::KEYS
            .iter()
            .fold(StackConfig::new("logic-app"), |config, key| {
                config.with_value(*key, format!("{key}-value"))
            })
    }

    #[test]
    fn supplied_source_overrides_configured_reference() {
        let mut store = MockStateStore::new();
        store.expect_get().never();
        let values = base_values();

        let mut ctx = ProgramContext::new(deployment(), &store)
            .with_source(Box::new(ConfigSource::new(&values)));
        let outputs = ctx.cross_stack_outputs().unwrap();

        assert_eq!(outputs.db_name, "db_name-value");
        assert_eq!(outputs.resource_group_name, "resource_group_name-value");
    }
}
