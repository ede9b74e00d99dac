//! Configuration system for optic.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults** — hardcoded in [`schema::OpticConfig::default()`]
//! 2. **User global config** — `~/.optic/config.toml`
//! 3. **Project local config** — `.optic.toml` in the current working directory
//! 4. **Environment variables** — `OPTIC_*` overrides (highest precedence)
//!
//! Later layers override earlier ones. After merging, chart settings are
//! validated so downstream aggregation never sees a zero bin count.

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::OpticConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved optic configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars → validation. This is the primary entry point for all modules that
/// need configuration; the result is resolved once at startup and passed
/// down.
pub fn load() -> OpticConfig {
    let mut config = OpticConfig::default();

    // Layer 2: user global config (~/.optic/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    // Layer 3: project local config (.optic.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config.charts.validate();

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A malformed config file never prevents the tool
/// from running with defaults.
fn load_toml_file(path: Option<PathBuf>) -> Option<OpticConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.optic/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".optic").join("config.toml"))
}

/// Path to the project local config: `.optic.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".optic.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `OPTIC_ENDPOINT` — GraphQL endpoint URL
/// - `OPTIC_TIMEOUT_MS` — HTTP request timeout
/// - `OPTIC_HIGH_CONFIDENCE_THRESHOLD` — high-confidence cutoff (0.0–1.0)
fn apply_env_overrides(config: &mut OpticConfig) {
    if let Ok(val) = std::env::var("OPTIC_ENDPOINT")
        && !val.is_empty()
    {
        config.endpoint.url = val;
    }
    if let Ok(val) = std::env::var("OPTIC_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.endpoint.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("OPTIC_HIGH_CONFIDENCE_THRESHOLD")
        && let Ok(threshold) = val.parse::<f64>()
    {
        config.charts.high_confidence_threshold = threshold;
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.optic/config.toml`.
///
/// Creates the `~/.optic/` directory if it doesn't exist. Returns an error
/// if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.optic/ directory")?;
    }

    fs::write(&path, OpticConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `endpoint.url`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut value_table: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        let toml_str = toml::to_string_pretty(&OpticConfig::default())
            .context("failed to serialize default config")?;
        toml::from_str(&toml_str).context("failed to parse serialized defaults")?
    };

    set_toml_value(&mut value_table, key, value)?;

    let output = toml::to_string_pretty(&value_table).context("failed to serialize config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value is parsed according to the type of the existing value at
/// that key, so `optic config set endpoint.timeout_ms 5000` stores an
/// integer and not the string `"5000"`.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let existing = table.get(leaf);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => {
            let b = matches!(raw_value.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            toml::Value::Boolean(b)
        }
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
