//! Realization engine.
//!
//! Walks declarations in dependency order, resolves each property bag against
//! what has been realized so far, creates the resource and records its
//! outputs. Provider function calls are memoized per call, so a value such as
//! the client config is fetched once no matter how many inputs use it.
//!
//! Every run realizes the full declaration set; there is no diffing against
//! previous state.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ports::CloudProvider};
use crate::domain::{
    Deployment, DomainError, DomainResult, Function, FunctionCall, RealizedResource,
    ResourceDeclaration, Resolve, ResourceType, StackOutput, Urn,
};
use crate::error::{CoreError, CoreResult};

/// Things that happened during an update, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeploymentEvent {
    Invoked {
        function: Function,
    },
    Created {
        urn: Urn,
        #[serde(rename = "type")]
        resource_type: ResourceType,
        id: String,
    },
    Exported {
        name: String,
        secret: bool,
    },
    Deleted {
        urn: Urn,
    },
}

/// Output of a realization run.
#[derive(Debug, Clone)]
pub struct Realization {
    pub resources: Vec<RealizedResource>,
    pub outputs: BTreeMap<String, StackOutput>,
    pub events: Vec<DeploymentEvent>,
}

/// Order declarations so that every resource comes after its dependencies.
///
/// Among resources whose dependencies are satisfied, declaration order wins.
pub fn topological_order(resources: &[ResourceDeclaration]) -> CoreResult<Vec<usize>> {
    let index: HashMap<&Urn, usize> = resources
        .iter()
        .enumerate()
        .map(|(i, r)| (r.urn(), i))
        .collect();

    let mut pending: Vec<BTreeSet<usize>> = Vec::with_capacity(resources.len());
    for r in resources {
        let mut deps = BTreeSet::new();
        for dep in r.dependencies() {
            let i = index.get(&dep).copied().ok_or_else(|| {
                ApplicationError::UnrealizedDependency {
                    resource: r.urn().to_string(),
                    dependency: dep.to_string(),
                }
            })?;
            deps.insert(i);
        }
        pending.push(deps);
    }

    let mut order = Vec::with_capacity(resources.len());
    let mut placed = vec![false; resources.len()];
    while order.len() < resources.len() {
        let next = (0..resources.len())
            .find(|&i| !placed[i] && pending[i].iter().all(|&d| placed[d]))
            .ok_or_else(|| {
                let stuck = (0..resources.len()).find(|&i| !placed[i]).unwrap_or(0);
                let dep = pending[stuck]
                    .iter()
                    .find(|&&d| !placed[d])
                    .map(|&d| resources[d].urn().to_string())
                    .unwrap_or_default();
                ApplicationError::UnrealizedDependency {
                    resource: resources[stuck].urn().to_string(),
                    dependency: dep,
                }
            })?;
        placed[next] = true;
        order.push(next);
    }
    Ok(order)
}

/// Resolver over realized resources, calling the provider for functions.
struct Realizer<'a> {
    cloud: &'a dyn CloudProvider,
    realized: HashMap<Urn, Value>,
    invokes: RefCell<HashMap<String, Value>>,
    events: RefCell<Vec<DeploymentEvent>>,
    provider_error: RefCell<Option<CoreError>>,
}

impl<'a> Realizer<'a> {
    fn new(cloud: &'a dyn CloudProvider) -> Self {
        Self {
            cloud,
            realized: HashMap::new(),
            invokes: RefCell::new(HashMap::new()),
            events: RefCell::new(Vec::new()),
            provider_error: RefCell::new(None),
        }
    }

    /// Prefer the provider's own error over the domain wrapper it caused.
    fn surface(&self, err: DomainError) -> CoreError {
        self.provider_error
            .borrow_mut()
            .take()
            .unwrap_or(CoreError::Domain(err))
    }

    fn push(&self, event: DeploymentEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl Resolve for Realizer<'_> {
    fn property(&self, urn: &Urn, key: &str) -> DomainResult<Value> {
        let outputs = self.realized.get(urn).ok_or_else(|| DomainError::Unknown {
            what: format!("{}.{}", urn.name(), key),
        })?;
        outputs
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::ResolutionFailed {
                what: format!("{}.{}", urn.name(), key),
                reason: "the provider did not return this property".into(),
            })
    }

    fn invoke(&self, call: &FunctionCall) -> DomainResult<Value> {
        let key = call.cache_key();
        if let Some(hit) = self.invokes.borrow().get(&key) {
            return Ok(hit.clone());
        }

        debug!(function = %call.function, "Invoking provider function");
        match self.cloud.invoke(call) {
            Ok(value) => {
                self.push(DeploymentEvent::Invoked {
                    function: call.function,
                });
                self.invokes.borrow_mut().insert(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                let reason = err.to_string();
                *self.provider_error.borrow_mut() = Some(err);
                Err(DomainError::ResolutionFailed {
                    what: call.function.token().into(),
                    reason,
                })
            }
        }
    }
}

/// Realize every declaration and export of `deployment`.
#[instrument(skip_all, fields(stack = %deployment.context().stack_ref()))]
pub fn realize(deployment: &Deployment, cloud: &dyn CloudProvider) -> CoreResult<Realization> {
    let declarations = deployment.resources();
    let order = topological_order(declarations)?;
    let mut realizer = Realizer::new(cloud);
    let mut resources = Vec::with_capacity(order.len());

    for i in order {
        let decl = &declarations[i];
        let mut inputs = Map::new();
        for (key, input) in decl.inputs() {
            let value = input.resolve(&realizer).map_err(|e| realizer.surface(e))?;
            inputs.insert(key.clone(), value);
        }

        debug!(urn = %decl.urn(), "Creating resource");
        let created = cloud.create(decl.resource_type(), decl.name(), &Value::Object(inputs))?;

        realizer.push(DeploymentEvent::Created {
            urn: decl.urn().clone(),
            resource_type: decl.resource_type(),
            id: created.id.clone(),
        });
        realizer
            .realized
            .insert(decl.urn().clone(), created.outputs.clone());
        resources.push(RealizedResource {
            urn: decl.urn().clone(),
            resource_type: decl.resource_type(),
            name: decl.name().to_string(),
            id: created.id,
            outputs: created.outputs,
            protect: decl.is_protected(),
        });
    }

    let mut outputs = BTreeMap::new();
    for export in deployment.exports() {
        let value = export
            .value
            .resolve(&realizer)
            .map_err(|e| realizer.surface(e))?;
        let secret = export.value.is_secret();
        realizer.push(DeploymentEvent::Exported {
            name: export.name.clone(),
            secret,
        });
        outputs.insert(export.name.clone(), StackOutput { value, secret });
    }

    Ok(Realization {
        resources,
        outputs,
        events: realizer.events.into_inner(),
    })
}
