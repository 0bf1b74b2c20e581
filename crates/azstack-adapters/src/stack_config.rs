//! Stack configuration files.
//!
//! Reads a project's `Stack.<stack>.toml` and the environments it imports,
//! producing the merged [`StackConfig`] a program runs with.
//!
//! # Layout
//!
//! ```text
//! <root>/
//! ├── environments/
//! │   └── base-outputs.toml     ← shared, importable by any stack
//! ├── base-infra/
//! │   └── Stack.dev.toml
//! └── logic-app/
//!     └── Stack.dev.toml
//! ```
//!
//! # `Stack.<stack>.toml`
//!
//! ```toml
//! [environment]
//! imports = ["base-outputs"]
//!
//! [config]
//! "azure-native:location" = "westus2"
//! protect_flag = true
//!
//! [secrets]
//! apiToken = "..."
//! ```
//!
//! # `environments/<name>.toml`
//!
//! ```toml
//! imports = ["azure-defaults"]
//!
//! [values]
//! db_name = "sqldb"
//! # Read from another stack's recorded outputs when the stack is loaded.
//! cosmosdb_account_name = { fromStack = "organization/base-infra/dev", output = "cosmosdb_account_name" }
//!
//! [secrets]
//! accessKey = "..."
//! ```
//!
//! Imports are applied in order, each one depth-first; later values override
//! earlier ones and the stack file overrides every environment.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use azstack_core::{
    application::ports::StateStore,
    domain::{StackConfig, StackRef},
    error::{CoreError, CoreResult},
};

const ENVIRONMENTS_DIR: &str = "environments";

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StackFileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Environment '{name}' not found at {path}")]
    MissingEnvironment { name: String, path: PathBuf },

    #[error("Environment import cycle: {chain}")]
    ImportCycle { chain: String },

    #[error("Value '{key}' in {path} must be a string, number or boolean")]
    NotScalar { key: String, path: PathBuf },

    #[error("Value '{key}' reads stack {stack}, but no state backend is available")]
    NoStateStore { key: String, stack: String },

    #[error("Value '{key}' reads output '{output}' of stack {stack}, which does not exist")]
    MissingOutput {
        key: String,
        stack: String,
        output: String,
    },

    #[error("Stack file {path} already exists")]
    AlreadyExists { path: PathBuf },
}

impl From<StackFileError> for CoreError {
    fn from(e: StackFileError) -> Self {
        CoreError::Configuration {
            message: e.to_string(),
        }
    }
}

// ── File formats ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StackFile {
    #[serde(default)]
    environment: EnvironmentSection,
    #[serde(default)]
    config: BTreeMap<String, toml::Value>,
    #[serde(default)]
    secrets: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnvironmentSection {
    #[serde(default)]
    imports: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnvironmentFile {
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    values: BTreeMap<String, EnvValue>,
    #[serde(default)]
    secrets: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnvValue {
    FromStack {
        #[serde(rename = "fromStack")]
        from_stack: String,
        output: String,
    },
    Literal(toml::Value),
}

// ── Loader ───────────────────────────────────────────────────────────────────

/// Loads [`StackConfig`] for any project under a root directory.
#[derive(Debug, Clone)]
pub struct StackConfigLoader {
    root: PathBuf,
}

impl StackConfigLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stack_file(&self, project: &str, stack: &str) -> PathBuf {
        self.root.join(project).join(format!("Stack.{stack}.toml"))
    }

    pub fn environment_file(&self, name: &str) -> PathBuf {
        self.root.join(ENVIRONMENTS_DIR).join(format!("{name}.toml"))
    }

    /// Merged configuration of `project`/`stack`.
    ///
    /// A missing stack file yields an empty configuration. `store` resolves
    /// `fromStack` values; without it they are an error.
    #[instrument(skip(self, store))]
    pub fn load(
        &self,
        project: &str,
        stack: &str,
        store: Option<&dyn StateStore>,
    ) -> CoreResult<StackConfig> {
        let mut config = StackConfig::new(project);
        let path = self.stack_file(project, stack);
        let Some(file) = read_toml::<StackFile>(&path)? else {
            debug!(path = %path.display(), "No stack file");
            return Ok(config);
        };

        let mut chain = Vec::new();
        for name in &file.environment.imports {
            self.apply_environment(name, &mut config, &mut chain, store)?;
        }
        for (key, value) in &file.config {
            config.set(key.as_str(), scalar(key, value, &path)?, false);
        }
        for (key, value) in &file.secrets {
            config.set(key.as_str(), scalar(key, value, &path)?, true);
        }
        debug!(path = %path.display(), values = config.len(), "Loaded stack config");
        Ok(config)
    }

    fn apply_environment(
        &self,
        name: &str,
        config: &mut StackConfig,
        chain: &mut Vec<String>,
        store: Option<&dyn StateStore>,
    ) -> CoreResult<()> {
        if chain.iter().any(|n| n == name) {
            chain.push(name.to_string());
            return Err(StackFileError::ImportCycle {
                chain: chain.join(" -> "),
            }
            .into());
        }

        let path = self.environment_file(name);
        let env = read_toml::<EnvironmentFile>(&path)?.ok_or_else(|| {
            StackFileError::MissingEnvironment {
                name: name.to_string(),
                path: path.clone(),
            }
        })?;

        chain.push(name.to_string());
        for import in &env.imports {
            self.apply_environment(import, config, chain, store)?;
        }
        chain.pop();

        for (key, value) in &env.values {
            let (value, secret) = match value {
                EnvValue::Literal(v) => (scalar(key, v, &path)?, false),
                EnvValue::FromStack { from_stack, output } => {
                    stack_output(key, from_stack, output, store)?
                }
            };
            config.set(key.as_str(), value, secret);
        }
        for (key, value) in &env.secrets {
            config.set(key.as_str(), scalar(key, value, &path)?, true);
        }
        debug!(environment = name, "Applied environment");
        Ok(())
    }

    /// Write a new stack file. Fails if one exists unless `force`.
    pub fn write_stack_file(
        &self,
        project: &str,
        stack: &str,
        contents: &str,
        force: bool,
    ) -> CoreResult<PathBuf> {
        let path = self.stack_file(project, stack);
        if path.exists() && !force {
            return Err(StackFileError::AlreadyExists { path }.into());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StackFileError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| StackFileError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, StackFileError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StackFileError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|source| StackFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn scalar(key: &str, value: &toml::Value, path: &Path) -> Result<String, StackFileError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        _ => Err(StackFileError::NotScalar {
            key: key.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

fn stack_output(
    key: &str,
    stack: &str,
    output: &str,
    store: Option<&dyn StateStore>,
) -> CoreResult<(String, bool)> {
    let store = store.ok_or_else(|| StackFileError::NoStateStore {
        key: key.to_string(),
        stack: stack.to_string(),
    })?;
    let stack_ref: StackRef = stack.parse()?;
    let missing = || StackFileError::MissingOutput {
        key: key.to_string(),
        stack: stack.to_string(),
        output: output.to_string(),
    };

    let state = store.get(&stack_ref)?.ok_or_else(missing)?;
    let secret = state.output(output).is_some_and(|o| o.secret);
    let value = state.output_string(output).ok_or_else(missing)?;
    Ok((value, secret))
}
