//! In-memory state store for testing.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use azstack_core::{
    application::{ApplicationError, ports::StateStore},
    domain::{StackRef, StackState},
    error::CoreResult,
};

/// Thread-safe in-memory state store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    inner: Arc<RwLock<BTreeMap<StackRef, StackState>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, stack: &StackRef) -> CoreResult<Option<StackState>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(stack).cloned())
    }

    fn put(&self, state: &StackState) -> CoreResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(state.stack.clone(), state.clone());
        Ok(())
    }

    fn remove(&self, stack: &StackRef) -> CoreResult<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.remove(stack).is_some())
    }

    fn list(&self) -> CoreResult<Vec<StackRef>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let store = InMemoryStateStore::new();
        let stack: StackRef = "org/base-infra/dev".parse().unwrap();
        assert!(store.get(&stack).unwrap().is_none());

        store.put(&StackState::new(stack.clone())).unwrap();
        assert!(store.get(&stack).unwrap().is_some());
        assert_eq!(store.list().unwrap(), vec![stack.clone()]);

        assert!(store.remove(&stack).unwrap());
        assert!(!store.remove(&stack).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let store = InMemoryStateStore::new();
        let other = store.clone();
        store
            .put(&StackState::new("org/p/dev".parse().unwrap()))
            .unwrap();
        assert_eq!(other.len(), 1);
    }
}
