//! Configuration system for mindful.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: [`schema::MindfulConfig::default()`]
//! 2. **User global config**: `~/.mindful/config.toml`
//! 3. **Project local config**: `.mindful.toml` in the current directory
//! 4. **Environment variables**: `MINDFUL_*` overrides (highest precedence)
//!
//! Later layers override earlier ones key by key: file layers are merged as
//! TOML tables before deserialization, so a project file that only sets
//! `[chat] failure_policy` keeps the global file's `[server]` section.
//!
//! # Usage
//!
//! ```rust,ignore
//! let cfg = mindful::config::load();
//! let client = HttpClient::from_config(&cfg.server);
//! ```

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::{FailurePolicy, MindfulConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> MindfulConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: MindfulConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Read a TOML file as a raw value tree.
///
/// Missing or malformed files yield `None`; a broken config file must not
/// stop the client from starting.
fn load_toml_value(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge `overlay` into `base`, recursing into tables.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.mindful/config.toml`
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mindful").join("config.toml"))
}

/// `.mindful.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".mindful.toml"))
}

/// Path to the global config file, for display.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Path to the project config file, for display.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment overrides using `lookup` to read variables.
///
/// Supported variables:
/// - `MINDFUL_SERVER_URL`: server base URL
/// - `MINDFUL_TIMEOUT_MS`: request timeout
/// - `MINDFUL_FAILURE_POLICY`: `apologize` or `local-fallback`
/// - `MINDFUL_LOCAL_CRISIS_CHECK`: local crisis keyword scan (`1`/`true`)
/// - `MINDFUL_STORAGE_PATH`: storage file
/// - `MINDFUL_LOG`: event log on/off
fn apply_env_overrides(config: &mut MindfulConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("MINDFUL_SERVER_URL")
        && !val.is_empty()
    {
        config.server.base_url = val;
    }
    if let Some(val) = lookup("MINDFUL_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.server.timeout_ms = ms;
    }
    if let Some(val) = lookup("MINDFUL_FAILURE_POLICY")
        && let Some(policy) = parse_failure_policy(&val)
    {
        config.chat.failure_policy = policy;
    }
    if let Some(val) = lookup("MINDFUL_LOCAL_CRISIS_CHECK") {
        config.chat.local_crisis_check = is_truthy(&val);
    }
    if let Some(val) = lookup("MINDFUL_STORAGE_PATH")
        && !val.is_empty()
    {
        config.storage.path = Some(val);
    }
    if let Some(val) = lookup("MINDFUL_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse an explicit on/off value. Anything unrecognised is `None`, so a typo
/// never reads as `false`.
pub(crate) fn parse_bool(val: &str) -> Option<bool> {
    match val.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_failure_policy(val: &str) -> Option<FailurePolicy> {
    match val.to_ascii_lowercase().as_str() {
        "apologize" | "apology" => Some(FailurePolicy::Apologize),
        "local-fallback" | "local_fallback" | "fallback" => Some(FailurePolicy::LocalFallback),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.mindful/config.toml`.
///
/// Fails if the file exists unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.mindful/ directory")?;
    }

    fs::write(&path, MindfulConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a dotted key (e.g. `chat.failure_policy`) in the global config file.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&MindfulConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that would no longer deserialize (e.g. a bad enum name).
    let _: MindfulConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML tree using a dotted key path.
///
/// The type of an existing value decides how `raw_value` is parsed; new
/// keys are stored as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table for '{key}'"))?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => {
            let b = parse_bool(raw_value)
                .with_context(|| format!("expected on/off for '{key}', got '{raw_value}'"))?;
            toml::Value::Boolean(b)
        }
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// The effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
