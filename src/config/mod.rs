//! Configuration system for domo-viewer.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: hardcoded in [`schema::ViewerConfig::default()`]
//! 2. **User global config**: `~/.domo-viewer/config.toml`
//! 3. **Project local config**: `.domo-viewer.toml` in the current directory
//! 4. **Environment variables**: `DOMO_VIEWER_*` overrides (highest precedence)
//!
//! File layers are merged at the key level: a project file that only sets
//! `[web] addr` keeps every other value from the global file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domo_viewer::config;
//!
//! let cfg = config::load();
//! let client = DomoClient::from_config(&cfg.api);
//! ```

pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::ViewerConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Malformed files
/// are skipped so a broken config never prevents the viewer from starting.
pub fn load() -> ViewerConfig {
    let mut merged = match toml::Value::try_from(ViewerConfig::default()) {
        Ok(value) => value,
        Err(_) => return apply_env(ViewerConfig::default()),
    };

    for path in [global_config_path(), project_config_path()]
        .into_iter()
        .flatten()
    {
        if let Some(layer) = load_toml_value(&path) {
            merge_values(&mut merged, layer);
        }
    }

    let config = merged.try_into().unwrap_or_default();
    apply_env(config)
}

fn apply_env(mut config: ViewerConfig) -> ViewerConfig {
    apply_env_overrides(&mut config);
    config
}

/// Read a TOML file as an untyped value. `None` if missing or malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in the overlay replaces the base value.
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

/// Directory holding the global config and the fetch log: `~/.domo-viewer`.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".domo-viewer"))
}

fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".domo-viewer.toml"))
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
/// - `DOMO_VIEWER_BASE_URL`: host template, `{instance}` placeholder allowed
/// - `DOMO_VIEWER_TIMEOUT_MS`: per-request timeout
/// - `DOMO_VIEWER_ADDR`: web UI bind address
/// - `DOMO_VIEWER_OPEN_BROWSER`: open the browser on start (`1`/`true`/...)
/// - `DOMO_VIEWER_EAGER_COUNTS`: fetch card counts with dashboards
/// - `DOMO_VIEWER_LOG`: fetch logging enabled
fn apply_env_overrides(config: &mut ViewerConfig) {
    if let Ok(val) = std::env::var("DOMO_VIEWER_BASE_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("DOMO_VIEWER_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("DOMO_VIEWER_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("DOMO_VIEWER_OPEN_BROWSER") {
        config.web.open_browser = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("DOMO_VIEWER_EAGER_COUNTS") {
        config.dashboards.eager_card_counts = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("DOMO_VIEWER_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / show
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.domo-viewer/config.toml`.
///
/// Returns an error if the file already exists, unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.domo-viewer/ directory")?;
    }

    fs::write(&path, ViewerConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single dotted key (e.g. `web.addr`) in the global config file.
///
/// Starts from the serialized defaults when the file does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&ViewerConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject values that no longer deserialize (e.g. a string where a
    // number is expected in a file that lacked the key).
    let _: ViewerConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The new value's type follows the existing value at that key.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be of the form section.key, got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
