//! In-memory program store with the builtin programs.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use azstack_core::{
    application::{
        ApplicationError,
        ports::{Program, ProgramInfo, ProgramStore},
    },
    error::CoreResult,
};

use crate::builtin_programs;

/// Thread-safe in-memory program store, keyed by program name.
#[derive(Clone, Default)]
pub struct InMemoryProgramStore {
    inner: Arc<RwLock<BTreeMap<String, Arc<dyn Program>>>>,
}

impl InMemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `base-infra` and `logic-app` registered.
    pub fn with_builtin() -> CoreResult<Self> {
        let store = Self::new();
        for program in builtin_programs::all_programs() {
            store.register(program)?;
        }
        Ok(store)
    }

    /// Add or replace a program.
    pub fn register(&self, program: Arc<dyn Program>) -> CoreResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(program.name().to_string(), program);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for InMemoryProgramStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .inner
            .read()
            .map(|i| i.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("InMemoryProgramStore")
            .field("programs", &names)
            .finish()
    }
}

impl ProgramStore for InMemoryProgramStore {
    fn get(&self, name: &str) -> CoreResult<Arc<dyn Program>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.get(name).cloned().ok_or_else(|| {
            ApplicationError::ProgramNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> CoreResult<Vec<ProgramInfo>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.values().map(|p| ProgramInfo::of(p.as_ref())).collect())
    }
}
