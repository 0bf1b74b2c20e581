//! `azstack config`: read and write configuration values.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::{OutputManager, display_value},
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    config: AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(AppConfig::config_path);

    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key).ok_or_else(|| unknown_key(&key))?;
            output.data(&display_value(&value))?;
        }

        ConfigCommands::Set { key, value } => {
            set_value(&path, &key, &value)?;
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
            } else {
                output.header("Current Configuration:")?;
                let entries = config.entries();
                output.key_values(entries.iter().map(|(k, v)| (k.as_str(), v)))?;
            }
        }

        ConfigCommands::Path => {
            output.data(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn unknown_key(key: &str) -> CliError {
    CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    }
}

/// Parse `raw` to the type of the key's default value.
fn typed_value(key: &str, raw: &str) -> CliResult<toml::Value> {
    let default = AppConfig::default().get(key).ok_or_else(|| unknown_key(key))?;
    match default {
        Value::Bool(_) => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|e| CliError::InvalidInput {
                message: format!("'{key}' expects true or false"),
                source: Some(Box::new(e)),
            }),
        Value::Object(_) => Err(CliError::InvalidInput {
            message: format!("'{key}' is a section; set one of its keys"),
            source: None,
        }),
        _ => Ok(toml::Value::String(raw.to_string())),
    }
}

/// Write `key = raw` into the TOML file at `path`, keeping other values.
fn set_value(path: &Path, key: &str, raw: &str) -> CliResult<()> {
    let value = typed_value(key, raw)?;

    let mut doc = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_cli_context(|| format!("reading {}", path.display()))?;
        text.parse::<toml::Table>()
            .map_err(|e| CliError::ConfigError {
                message: format!("{} is not valid TOML", path.display()),
                source: Some(Box::new(e)),
            })?
    } else {
        toml::Table::new()
    };

    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = parts.pop().ok_or_else(|| unknown_key(key))?;
    let mut table = &mut doc;
    for part in parts {
        let entry = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()));
        table = entry.as_table_mut().ok_or_else(|| CliError::ConfigError {
            message: format!("'{part}' in {} is not a table", path.display()),
            source: None,
        })?;
    }
    table.insert(leaf.to_string(), value);

    let text = toml::to_string_pretty(&doc).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;
    if let Some(parent) = parent_dir(path) {
        std::fs::create_dir_all(&parent)
            .with_cli_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, text).with_cli_context(|| format!("writing {}", path.display()))?;

    // Refuse to leave a file behind that no longer loads.
    AppConfig::load(Some(&path.to_path_buf())).with_cli_context(|| "validating written config")?;
    Ok(())
}

fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

// ── tests ─────────────────────────────────────────────────────────────────────
