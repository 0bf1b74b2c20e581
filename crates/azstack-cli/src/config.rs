//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `ARM_SUBSCRIPTION_ID` for `azure.subscription_id`
//! 3. Environment variables, `AZSTACK_<SECTION>__<KEY>`
//! 4. Config file
//! 5. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults for stack identity.
    pub defaults: Defaults,
    /// Where state is kept.
    pub backend: BackendConfig,
    /// Cloud identity.
    pub azure: AzureConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Log file settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    pub organization: String,
    pub stack: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Relative paths resolve against the workspace directory.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AzureConfig {
    pub subscription_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write JSON logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults {
                organization: "organization".into(),
                stack: "dev".into(),
            },
            backend: BackendConfig {
                dir: PathBuf::from(".azstack"),
            },
            azure: AzureConfig::default(),
            output: OutputConfig {
                no_color: false,
                format: "human".into(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// `config_file` is the path passed via `--config`; it must exist.  Without
    /// it the default location is read if present.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(p) => (p.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let mut cfg: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix("AZSTACK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?
            .try_deserialize()
            .context("invalid configuration")?;

        if let Some(sub) = std::env::var("ARM_SUBSCRIPTION_ID")
            .ok()
            .filter(|s| !s.is_empty())
        {
            cfg.azure.subscription_id = Some(sub);
        }
        Ok(cfg)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.azstack.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "azstack", "azstack")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".azstack.toml"))
    }

    /// Look up a dotted key such as `defaults.stack`.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut value = serde_json::to_value(self).ok()?;
        for part in key.split('.') {
            value = value.get(part)?.clone();
        }
        Some(value)
    }

    /// Every leaf value as `(dotted.key, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, serde_json::Value)> {
        fn walk(prefix: &str, value: serde_json::Value, out: &mut Vec<(String, serde_json::Value)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                leaf => out.push((prefix.to_string(), leaf)),
            }
        }

        let mut out = Vec::new();
        if let Ok(value) = serde_json::to_value(self) {
            walk("", value, &mut out);
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
