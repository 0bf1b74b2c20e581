//! Deployment Service - main application orchestrator.
//!
//! Use cases:
//! 1. `declare` / `preview`: run a program and show what it declares
//! 2. `up`: realize the declarations and record stack state
//! 3. `destroy`: delete realized resources, unless any is protected
//! 4. `outputs` / `stacks`: read recorded state

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{
            CloudProvider, ManifestRenderer, ProgramContext, ProgramInfo, ProgramStore,
            StateStore,
        },
        services::engine::{self, DeploymentEvent, topological_order},
    },
    domain::{
        Deployment, ResourceType, StackConfig, StackContext, StackRef, StackState, Urn,
    },
    error::CoreResult,
};

/// One resource as it would be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStep {
    pub urn: Urn,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub protect: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Urn>,
    /// Inputs with unknowns and secrets masked.
    pub inputs: Value,
}

/// What `up` would do, computed without calling the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub stack: StackRef,
    pub program: String,
    pub steps: Vec<PlannedStep>,
    pub outputs: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateSummary {
    pub stack: StackRef,
    pub created: usize,
    pub events: Vec<DeploymentEvent>,
    #[serde(skip)]
    pub state: StackState,
    pub updated_at: DateTime<Utc>,
}

impl UpdateSummary {
    /// Recorded outputs, secrets masked unless `show_secrets`.
    pub fn outputs(&self, show_secrets: bool) -> BTreeMap<String, Value> {
        self.state.display_outputs(show_secrets)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestroySummary {
    pub stack: StackRef,
    pub deleted: Vec<Urn>,
    pub events: Vec<DeploymentEvent>,
}

/// Main deployment service.
pub struct DeploymentService {
    programs: Box<dyn ProgramStore>,
    cloud: Box<dyn CloudProvider>,
    state: Box<dyn StateStore>,
    renderer: Box<dyn ManifestRenderer>,
}

impl DeploymentService {
    pub fn new(
        programs: Box<dyn ProgramStore>,
        cloud: Box<dyn CloudProvider>,
        state: Box<dyn StateStore>,
        renderer: Box<dyn ManifestRenderer>,
    ) -> Self {
        Self {
            programs,
            cloud,
            state,
            renderer,
        }
    }

    /// Run `program` and collect its declarations.
    ///
    /// Nothing is created; cross-stack outputs are read if the program asks.
    #[instrument(skip_all, fields(program = %program, stack = %context.stack_ref()))]
    pub fn declare(
        &self,
        program: &str,
        context: StackContext,
        config: StackConfig,
    ) -> CoreResult<Deployment> {
        let program = self.programs.get(program)?;
        let mut ctx = ProgramContext::new(Deployment::new(context, config), self.state.as_ref());
        program.run(&mut ctx)?;

        let deployment = ctx.into_deployment();
        info!(
            resources = deployment.resources().len(),
            exports = deployment.exports().len(),
            "Program declared"
        );
        Ok(deployment)
    }

    pub fn preview(
        &self,
        program: &str,
        context: StackContext,
        config: StackConfig,
    ) -> CoreResult<Preview> {
        let deployment = self.declare(program, context, config)?;
        Self::plan(program, &deployment)
    }

    /// Preview of an already-declared deployment.
    pub fn plan(program: &str, deployment: &Deployment) -> CoreResult<Preview> {
        let resources = deployment.resources();
        let steps = topological_order(resources)?
            .into_iter()
            .map(|i| {
                let decl = &resources[i];
                PlannedStep {
                    urn: decl.urn().clone(),
                    resource_type: decl.resource_type(),
                    name: decl.name().to_string(),
                    protect: decl.is_protected(),
                    transforms: decl.applied_transforms().to_vec(),
                    depends_on: decl.dependencies().into_iter().collect(),
                    inputs: Value::Object(
                        decl.inputs()
                            .iter()
                            .map(|(k, v)| (k.clone(), v.preview()))
                            .collect(),
                    ),
                }
            })
            .collect();

        let outputs = deployment
            .exports()
            .iter()
            .map(|e| (e.name.clone(), e.value.preview()))
            .collect();

        Ok(Preview {
            stack: deployment.context().stack_ref().clone(),
            program: program.to_string(),
            steps,
            outputs,
        })
    }

    pub fn render(&self, preview: &Preview) -> CoreResult<String> {
        self.renderer.render(preview)
    }

    /// Realize every declaration of `program` and record the stack state.
    #[instrument(skip_all, fields(program = %program, stack = %context.stack_ref()))]
    pub fn up(
        &self,
        program: &str,
        context: StackContext,
        config: StackConfig,
    ) -> CoreResult<UpdateSummary> {
        let deployment = self.declare(program, context, config)?;
        let realization = engine::realize(&deployment, self.cloud.as_ref())?;

        let stack = deployment.context().stack_ref().clone();
        let mut state = StackState::new(stack.clone());
        state.resources = realization.resources;
        state.outputs = realization.outputs;
        self.state.put(&state)?;

        info!(
            created = state.resources.len(),
            outputs = state.outputs.len(),
            "Update complete"
        );
        Ok(UpdateSummary {
            stack,
            created: state.resources.len(),
            events: realization.events,
            updated_at: state.updated_at,
            state,
        })
    }

    /// Delete every resource of `stack`, newest first, then forget its state.
    ///
    /// Refuses without touching anything if any resource is protected. Each
    /// successful delete is recorded before the next one starts, so a failed
    /// destroy leaves state listing only what still exists.
    #[instrument(skip(self), fields(stack = %stack))]
    pub fn destroy(&self, stack: &StackRef) -> CoreResult<DestroySummary> {
        let mut state = self.require_state(stack)?;

        if let Some(protected) = state.protected_resources().next() {
            warn!(urn = %protected.urn, "Protected resource blocks destroy");
            return Err(ApplicationError::ProtectedResource {
                urn: protected.urn.to_string(),
            }
            .into());
        }

        let mut deleted = Vec::with_capacity(state.resources.len());
        let mut events = Vec::with_capacity(state.resources.len());
        while let Some(resource) = state.resources.pop() {
            if let Err(e) = self.cloud.delete(resource.resource_type, &resource.id) {
                warn!(urn = %resource.urn, remaining = state.resources.len() + 1, "Destroy stopped");
                return Err(e);
            }
            debug!(urn = %resource.urn, "Deleted");
            events.push(DeploymentEvent::Deleted {
                urn: resource.urn.clone(),
            });
            deleted.push(resource.urn);

            if !state.resources.is_empty() {
                state.updated_at = Utc::now();
                self.state.put(&state)?;
            }
        }
        self.state.remove(stack)?;

        info!(deleted = deleted.len(), "Stack destroyed");
        Ok(DestroySummary {
            stack: stack.clone(),
            deleted,
            events,
        })
    }

    pub fn outputs(
        &self,
        stack: &StackRef,
        show_secrets: bool,
    ) -> CoreResult<BTreeMap<String, Value>> {
        Ok(self.require_state(stack)?.display_outputs(show_secrets))
    }

    pub fn state(&self, stack: &StackRef) -> CoreResult<Option<StackState>> {
        self.state.get(stack)
    }

    pub fn stacks(&self) -> CoreResult<Vec<StackRef>> {
        self.state.list()
    }

    pub fn programs(&self) -> CoreResult<Vec<ProgramInfo>> {
        self.programs.list()
    }

    fn require_state(&self, stack: &StackRef) -> CoreResult<StackState> {
        self.state.get(stack)?.ok_or_else(|| {
            ApplicationError::StackNotFound {
                stack: stack.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::application::ports::{MockCloudProvider, MockStateStore, Program};
    use crate::domain::{
        Input, Props, ProviderResource, ProtectTransform, RealizedResource, ResourceOptions,
    };
    use crate::error::{CoreError, CoreResult};

    struct TwoGroups {
        protect: bool,
    }

    impl Program for TwoGroups {
        fn name(&self) -> &str {
            "two-groups"
        }
        fn description(&self) -> &str {
            "test program"
        }
        fn run(&self, ctx: &mut ProgramContext<'_>) -> CoreResult<()> {
            let protect = self.protect;
            let d = ctx.deployment();
            d.register_transform(Arc::new(ProtectTransform::new(protect)))?;
            let mut props = Props::new();
            props.insert("location".into(), Input::from("westus2"));
            let first = d.declare(ResourceType::ResourceGroup, "first", props, ResourceOptions::new())?;
            d.declare(
                ResourceType::ResourceGroup,
                "second",
                Props::new(),
                ResourceOptions::new().depends_on(&first),
            )?;
            d.export("first_location", crate::domain::Output::property(first, "location"))?;
            Ok(())
        }
    }

    struct OneProgram(Arc<dyn Program>);

    impl ProgramStore for OneProgram {
        fn get(&self, name: &str) -> CoreResult<Arc<dyn Program>> {
            if name == self.0.name() {
                Ok(Arc::clone(&self.0))
            } else {
                Err(ApplicationError::ProgramNotFound { name: name.into() }.into())
            }
        }
        fn list(&self) -> CoreResult<Vec<ProgramInfo>> {
            Ok(vec![ProgramInfo::of(self.0.as_ref())])
        }
    }

    struct JsonRenderer;

    impl ManifestRenderer for JsonRenderer {
        fn render(&self, preview: &Preview) -> CoreResult<String> {
            Ok(serde_json::to_string(preview).unwrap_or_default())
        }
    }

    fn context() -> StackContext {
        StackContext::new("org", "test", "dev").unwrap()
    }

    fn service(protect: bool, cloud: MockCloudProvider, state: MockStateStore) -> DeploymentService {
        DeploymentService::new(
            Box::new(OneProgram(Arc::new(TwoGroups { protect }))),
            Box::new(cloud),
            Box::new(state),
            Box::new(JsonRenderer),
        )
    }

    #[test]
    fn preview_never_calls_the_provider() {
        let mut cloud = MockCloudProvider::new();
        cloud.expect_create().never();
        cloud.expect_invoke().never();
        let svc = service(true, cloud, MockStateStore::new());

        let preview = svc
            .preview("two-groups", context(), StackConfig::new("test"))
            .unwrap();
        assert_eq!(preview.steps.len(), 2);
        assert!(preview.steps.iter().all(|s| s.protect));
        assert_eq!(preview.steps[1].depends_on, vec![preview.steps[0].urn.clone()]);
        assert_eq!(preview.outputs["first_location"], json!("[unknown]"));
        assert!(svc.render(&preview).unwrap().contains("two-groups"));
    }

    #[test]
    fn up_records_state_and_outputs() {
        let mut cloud = MockCloudProvider::new();
        cloud.expect_create().times(2).returning(|_, name, inputs| {
            let mut outputs = inputs.clone();
            outputs["name"] = json!(name);
            Ok(ProviderResource {
                id: format!("/rg/{name}"),
                outputs,
            })
        });
        let mut state = MockStateStore::new();
        state
            .expect_put()
            .withf(|s| s.outputs["first_location"].value == json!("westus2"))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(true, cloud, state);
        let summary = svc
            .up("two-groups", context(), StackConfig::new("test"))
            .unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.outputs(false)["first_location"], json!("westus2"));
    }

    #[test]
    fn unknown_program_is_not_found() {
        let svc = service(true, MockCloudProvider::new(), MockStateStore::new());
        let err = svc
            .preview("nope", context(), StackConfig::new("test"))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Application(ApplicationError::ProgramNotFound { .. })
        ));
    }

    fn recorded(protect: bool) -> StackState {
        let mut state = StackState::new(context().stack_ref().clone());
        for name in ["first", "second"] {
            state.resources.push(RealizedResource {
                urn: Urn::new("dev", "test", ResourceType::ResourceGroup, name),
                resource_type: ResourceType::ResourceGroup,
                name: name.into(),
                id: format!("/rg/{name}"),
                outputs: json!({}),
                protect,
            });
        }
        state
    }

    #[test]
    fn destroy_refuses_protected_stacks() {
        let mut cloud = MockCloudProvider::new();
        cloud.expect_delete().never();
        let mut state = MockStateStore::new();
        state.expect_get().returning(|_| Ok(Some(recorded(true))));
        state.expect_remove().never();

        let svc = service(true, cloud, state);
        let err = svc.destroy(context().stack_ref()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Application(ApplicationError::ProtectedResource { .. })
        ));
    }

    #[test]
    fn destroy_deletes_in_reverse_order() {
        let mut cloud = MockCloudProvider::new();
        let mut seq = mockall::Sequence::new();
        for id in ["/rg/second", "/rg/first"] {
            cloud
                .expect_delete()
                .withf(move |_, got| got.to_string() == id)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        let mut state = MockStateStore::new();
        state.expect_get().returning(|_| Ok(Some(recorded(false))));
        state
            .expect_put()
            .withf(|s| s.resources.len() == 1 && s.resources[0].name == "first")
            .times(1)
            .returning(|_| Ok(()));
        state.expect_remove().times(1).returning(|_| Ok(true));

        let svc = service(false, cloud, state);
        let summary = svc.destroy(context().stack_ref()).unwrap();
        assert_eq!(summary.deleted.len(), 2);
        assert_eq!(summary.deleted[0].name(), "second");
        assert_eq!(
            summary.events,
            summary
                .deleted
                .iter()
                .map(|urn| DeploymentEvent::Deleted { urn: urn.clone() })
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn failed_delete_keeps_only_remaining_resources() {
        let mut cloud = MockCloudProvider::new();
        cloud
            .expect_delete()
            .withf(|_, id| id == "/rg/second")
            .times(1)
            .returning(|_, _| Ok(()));
        cloud
            .expect_delete()
            .withf(|_, id| id == "/rg/first")
            .times(1)
            .returning(|_, _| {
                Err(ApplicationError::ProviderFailed {
                    operation: "delete".into(),
                    reason: "still contains child resources".into(),
                }
                .into())
            });
        let mut state = MockStateStore::new();
        state.expect_get().returning(|_| Ok(Some(recorded(false))));
        state
            .expect_put()
            .withf(|s| s.resources.iter().map(|r| r.name.as_str()).eq(["first"]))
            .times(1)
            .returning(|_| Ok(()));
        state.expect_remove().never();

        let svc = service(false, cloud, state);
        let err = svc.destroy(context().stack_ref()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Application(ApplicationError::ProviderFailed { .. })
        ));
    }

    #[test]
    fn outputs_of_unknown_stack_fail() {
        let mut state = MockStateStore::new();
        state.expect_get().returning(|_| Ok(None));
        let svc = service(true, MockCloudProvider::new(), state);
        assert!(matches!(
            svc.outputs(context().stack_ref(), false),
            Err(CoreError::Application(ApplicationError::StackNotFound { .. }))
        ));
    }
}
