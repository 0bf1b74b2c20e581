//! State store backed by JSON files on the local filesystem.
//!
//! Layout: `<root>/<organization>/<project>/<stack>.json`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use azstack_core::{
    application::{ApplicationError, ports::StateStore},
    domain::{StackRef, StackState},
    error::{CoreError, CoreResult},
};

#[derive(Debug, Clone)]
pub struct LocalStateStore {
    root: PathBuf,
}

impl LocalStateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the state of `stack`.
    pub fn path_for(&self, stack: &StackRef) -> PathBuf {
        self.root
            .join(stack.organization())
            .join(stack.project())
            .join(format!("{}.json", stack.stack()))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> CoreError {
    ApplicationError::StateStoreError {
        reason: format!("Failed to {} {}: {}", operation, path.display(), e),
    }
    .into()
}

impl StateStore for LocalStateStore {
    #[instrument(skip(self), fields(stack = %stack))]
    fn get(&self, stack: &StackRef) -> CoreResult<Option<StackState>> {
        let path = self.path_for(stack);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io_error(&path, e, "read")),
        };
        let state = serde_json::from_str(&text).map_err(|e| ApplicationError::StateStoreError {
            reason: format!("Corrupt state file {}: {}", path.display(), e),
        })?;
        Ok(Some(state))
    }

    #[instrument(skip_all, fields(stack = %state.stack))]
    fn put(&self, state: &StackState) -> CoreResult<()> {
        let path = self.path_for(&state.stack);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        let text = serde_json::to_string_pretty(state).map_err(|e| {
            ApplicationError::StateStoreError {
                reason: e.to_string(),
            }
        })?;

        // Write then rename so readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| map_io_error(&tmp, e, "write"))?;
        fs::rename(&tmp, &path).map_err(|e| map_io_error(&path, e, "replace"))?;
        debug!(path = %path.display(), "State written");
        Ok(())
    }

    fn remove(&self, stack: &StackRef) -> CoreResult<bool> {
        let path = self.path_for(stack);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(&path, e, "remove")),
        }
    }

    fn list(&self) -> CoreResult<Vec<StackRef>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut stacks = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(3).max_depth(3) {
            let entry = entry.map_err(|e| ApplicationError::StateStoreError {
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let parts = path
                .strip_prefix(&self.root)
                .ok()
                .map(|rel| {
                    rel.iter()
                        .map(|c| c.to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                });
            match parts.as_deref() {
                Some([org, project, file]) => {
                    let stack = file.trim_end_matches(".json");
                    match StackRef::new(org.as_str(), project.as_str(), stack) {
                        Ok(stack_ref) => stacks.push(stack_ref),
                        Err(e) => warn!(path = %path.display(), error = %e, "Skipping state file"),
                    }
                }
                _ => warn!(path = %path.display(), "Skipping unexpected file"),
            }
        }
        stacks.sort();
        Ok(stacks)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use azstack_core::domain::StackOutput;

    use super::*;

    fn store() -> (TempDir, LocalStateStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn round_trips_state_through_disk() {
        let (_dir, store) = store();
        let stack: StackRef = "org/base-infra/dev".parse().unwrap();
        let mut state = StackState::new(stack.clone());
        state.outputs.insert(
            "db_name".into(),
            StackOutput {
                value: json!("sqldb"),
                secret: false,
            },
        );
        store.put(&state).unwrap();

        assert!(store.path_for(&stack).ends_with("org/base-infra/dev.json"));
        assert_eq!(store.get(&stack).unwrap(), Some(state));
    }

    #[test]
    fn missing_stack_is_none() {
        let (_dir, store) = store();
        assert_eq!(store.get(&"o/p/s".parse().unwrap()).unwrap(), None);
        assert!(!store.remove(&"o/p/s".parse().unwrap()).unwrap());
    }

    #[test]
    fn lists_stacks_sorted_and_skips_noise() {
        let (dir, store) = store();
        for s in ["org/logic-app/dev", "org/base-infra/prod", "org/base-infra/dev"] {
            store.put(&StackState::new(s.parse().unwrap())).unwrap();
        }
        fs::write(dir.path().join("org/base-infra/notes.txt"), "hi").unwrap();

        let listed: Vec<String> = store.list().unwrap().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            listed,
            ["org/base-infra/dev", "org/base-infra/prod", "org/logic-app/dev"]
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (_dir, store) = store();
        let stack: StackRef = "o/p/s".parse().unwrap();
        let path = store.path_for(&stack);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(store.get(&stack).is_err());
    }
}
