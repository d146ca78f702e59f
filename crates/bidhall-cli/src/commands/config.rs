//! Config get/set command.

use std::path::Path;

use anyhow::{Context, Result};
use bidhall_core::Config;
use serde_json::Value;

use crate::ui;

/// Config subcommand.
#[derive(Debug, Clone, Default)]
pub enum ConfigAction {
    /// Print the effective configuration.
    #[default]
    Show,
    /// Print one value by dotted path.
    Get(String),
    /// Set one value by dotted path.
    Set {
        /// Dotted key, e.g. `api.baseUrl`.
        key: String,
        /// New value, parsed as JSON when possible.
        value: String,
    },
    /// Check syntax and schema.
    Validate,
}

/// Config command arguments.
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    /// What to do.
    pub action: ConfigAction,
}

/// Run the config command.
pub fn run_config(args: ConfigArgs) -> Result<()> {
    let config_path = Config::default_path();

    match args.action {
        ConfigAction::Show => show_config(&config_path),
        ConfigAction::Get(key) => get_config_value(&config_path, &key),
        ConfigAction::Set { key, value } => set_config_value(&config_path, &key, &value),
        ConfigAction::Validate => validate_config(&config_path),
    }
}

/// Configuration as JSON: the file when present, otherwise the defaults.
fn effective_config(config_path: &Path) -> Result<Value> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Ok(json5::from_str(&content)?)
    } else {
        Ok(serde_json::to_value(Config::default())?)
    }
}

/// Show the full configuration.
fn show_config(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        ui::info(&format!(
            "No config file at {}; showing defaults",
            config_path.display()
        ));
    }

    let value = effective_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Get a specific config value by path.
fn get_config_value(config_path: &Path, key: &str) -> Result<()> {
    let value = effective_config(config_path)?;

    let Some(found) = lookup(&value, key) else {
        ui::error(&format!("Key not found: {key}"));
        return Ok(());
    };

    match found {
        Value::String(s) => println!("{s}"),
        Value::Number(n) => println!("{n}"),
        Value::Bool(b) => println!("{b}"),
        Value::Null => println!("null"),
        _ => println!("{}", serde_json::to_string_pretty(found)?),
    }
    Ok(())
}

/// Follow a dotted path through nested objects.
fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |current, part| current.get(part))
}

/// Set a config value, refusing values that fail validation.
fn set_config_value(config_path: &Path, key: &str, raw: &str) -> Result<()> {
    let mut value = effective_config(config_path)?;
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        anyhow::bail!("Invalid key. Use a dotted path such as api.baseUrl");
    }

    set_nested_value(&mut value, &parts, parse_value(raw));

    let config: Config = serde_json::from_value(value.clone())
        .with_context(|| format!("'{key}' does not fit the configuration schema"))?;
    config.validate()?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, serde_json::to_string_pretty(&value)?)?;

    ui::success(&format!("Set {key} = {raw}"));
    Ok(())
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Set a nested value, creating intermediate objects.
fn set_nested_value(root: &mut Value, path: &[&str], new_value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for part in parents {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry((*part).to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new())),
            _ => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(map) = current {
        map.insert((*last).to_string(), new_value);
    }
}

/// Validate the configuration.
fn validate_config(config_path: &Path) -> Result<()> {
    ui::header("Validating Configuration");

    if !config_path.exists() {
        ui::warning(&format!("Config file not found: {}", config_path.display()));
        ui::info("Defaults will be used");
        return Ok(());
    }

    let content = std::fs::read_to_string(config_path)?;
    match json5::from_str::<Value>(&content) {
        Ok(_) => ui::success("Syntax: Valid JSON5"),
        Err(e) => {
            ui::error(&format!("Syntax error: {e}"));
            return Ok(());
        }
    }

    match Config::load(config_path) {
        Ok(config) => {
            ui::success("Schema: Configuration is valid");
            ui::kv("API", &config.api.base_url);
            ui::kv("Session", &Config::session_path().display().to_string());
        }
        Err(e) => ui::error(&format!("Schema error: {e}")),
    }
    Ok(())
}
