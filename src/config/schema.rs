/// Configuration schema and defaults for domo-viewer.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[api]`, `[web]`, `[dashboards]` and `[logging]`.
///
/// Credentials are deliberately absent: the instance and developer token
/// live only in the in-memory session and are never written to disk.
use serde::{Deserialize, Serialize};

/// Host template used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://{instance}.domo.com";

/// Placeholder substituted with the instance name in `api.base_url`.
pub const INSTANCE_PLACEHOLDER: &str = "{instance}";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level domo-viewer configuration.
///
/// Maps directly to `~/.domo-viewer/config.toml` and `.domo-viewer.toml`.
/// All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub api: ApiConfig,
    pub web: WebConfig,
    pub dashboards: DashboardsConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Outbound platform API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host template. `{instance}` is replaced with the session's instance.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 30_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Local browser UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address for the embedded HTTP server.
    pub addr: String,
    /// Open the system browser when the server starts.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboards]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardsConfig {
    /// Fetch the cards of every page after loading dashboards so the table
    /// can show per-dashboard card counts and the overall average.
    pub eager_card_counts: bool,
}

impl Default for DashboardsConfig {
    fn default() -> Self {
        Self {
            eager_card_counts: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one line per outbound fetch to `~/.domo-viewer/fetch-log.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ViewerConfig {
    /// The annotated default config written by `domo-viewer config init`.
    pub fn default_toml() -> String {
        r#"# domo-viewer configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (DOMO_VIEWER_*)
#   2. Project config (.domo-viewer.toml in current directory)
#   3. User global config (~/.domo-viewer/config.toml)
#   4. Built-in defaults
#
# Credentials are never read from or written to this file.

[api]
base_url = "https://{instance}.domo.com"   # {instance} is replaced per session
timeout_ms = 30000

[web]
addr = "127.0.0.1:9747"
open_browser = true

[dashboards]
eager_card_counts = true   # fetch cards per page to show counts and the average

[logging]
enabled = true             # ~/.domo-viewer/fetch-log.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ViewerConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_ms, 30_000);
        assert_eq!(config.web.addr, "127.0.0.1:9747");
        assert!(config.web.open_browser);
        assert!(config.dashboards.eager_card_counts);
        assert!(config.logging.enabled);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[dashboards]
eager_card_counts = false
"#;
        let config: ViewerConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.dashboards.eager_card_counts);
        // Everything else falls back to defaults
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.logging.enabled);
    }

    #[test]
    fn default_toml_parses_back() {
        let config: ViewerConfig = toml::from_str(&ViewerConfig::default_toml()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.web.addr, "127.0.0.1:9747");
        assert!(config.dashboards.eager_card_counts);
    }
}
