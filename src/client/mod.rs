//! Platform REST client.
//!
//! Talks to `https://{instance}.domo.com` using the synchronous `ureq` HTTP
//! client. Four fixed endpoints are supported, each a plain GET:
//!
//! | Endpoint   | Path                                  |
//! |------------|---------------------------------------|
//! | Pages      | `/api/content/v1/pages`               |
//! | Cards      | `/api/content/v1/pages/{id}/cards`    |
//! | Datasets   | `/api/data/v3/datasources`            |
//! | Dataflows  | `/api/dataprocessing/v1/dataflows/`   |
//!
//! Headers are built from the session credentials on every call, so a
//! credential change takes effect on the next request without rebuilding
//! the client.
//!
//! [`fetch`] wraps the raw client with the "empty result plus message"
//! policy used by the session controller.

mod error;
pub mod fetch;

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde_json::Value;

use crate::config::schema::{ApiConfig, INSTANCE_PLACEHOLDER};
use crate::session::credentials::Credentials;

pub use error::FetchError;

/// Header carrying the developer token.
pub const TOKEN_HEADER: &str = "X-DOMO-Developer-Token";

static PAGE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid page id regex"));

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// One of the fixed GET endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Pages,
    Cards { page_id: String },
    Datasets,
    Dataflows,
}

impl Endpoint {
    pub fn cards(page_id: impl Into<String>) -> Self {
        Self::Cards {
            page_id: page_id.into(),
        }
    }

    /// Request path relative to the instance host.
    pub fn path(&self) -> Result<String, FetchError> {
        Ok(match self {
            Self::Pages => "/api/content/v1/pages".to_string(),
            Self::Cards { page_id } => {
                if !PAGE_ID_RE.is_match(page_id) {
                    return Err(FetchError::InvalidPageId(page_id.clone()));
                }
                format!("/api/content/v1/pages/{page_id}/cards")
            }
            Self::Datasets => "/api/data/v3/datasources".to_string(),
            Self::Dataflows => "/api/dataprocessing/v1/dataflows/".to_string(),
        })
    }

    /// Plural noun used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pages => "dashboards",
            Self::Cards { .. } => "cards",
            Self::Datasets => "datasets",
            Self::Dataflows => "dataflows",
        }
    }
}

// ---------------------------------------------------------------------------
// Client seam
// ---------------------------------------------------------------------------

/// Anything that can answer a GET for one of the fixed endpoints.
///
/// The session controller only depends on this trait; tests substitute a
/// scripted implementation.
pub trait ContentApi {
    fn get(&self, credentials: &Credentials, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

/// Synchronous platform client backed by a `ureq` agent.
#[derive(Debug)]
pub struct DomoClient {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl DomoClient {
    /// Build a client from the resolved `[api]` config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Host for the given instance, e.g. `https://acme-1.domo.com`.
    pub fn host_for(&self, instance: &str) -> String {
        self.base_url.replace(INSTANCE_PLACEHOLDER, instance)
    }

    /// Full URL for an endpoint.
    pub fn url_for(&self, credentials: &Credentials, endpoint: &Endpoint) -> Result<String, FetchError> {
        Ok(format!(
            "{}{}",
            self.host_for(credentials.instance()),
            endpoint.path()?
        ))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ContentApi for DomoClient {
    fn get(&self, credentials: &Credentials, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let url = self.url_for(credentials, endpoint)?;

        let result = self
            .agent
            .get(&url)
            .set(TOKEN_HEADER, credentials.token())
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .call();

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|e| FetchError::Transport(e.to_string()))?;
                if !(200..300).contains(&status) {
                    return Err(FetchError::status(status, body));
                }
                serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(FetchError::status(status, body))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(FetchError::Transport(transport.to_string()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Pages.path().unwrap(), "/api/content/v1/pages");
        assert_eq!(
            Endpoint::cards("123").path().unwrap(),
            "/api/content/v1/pages/123/cards"
        );
        assert_eq!(Endpoint::Datasets.path().unwrap(), "/api/data/v3/datasources");
        assert_eq!(
            Endpoint::Dataflows.path().unwrap(),
            "/api/dataprocessing/v1/dataflows/"
        );
    }

    #[test]
    fn cards_path_rejects_unsafe_ids() {
        for bad in ["", "1/../2", "a b", "p?x=1"] {
            assert!(matches!(
                Endpoint::cards(bad).path(),
                Err(FetchError::InvalidPageId(_))
            ));
        }
    }

    #[test]
    fn client_from_default_config() {
        let client = DomoClient::from_config(&ApiConfig::default());
        assert_eq!(client.host_for("acme-1"), "https://acme-1.domo.com");
        assert_eq!(client.timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn client_strips_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..ApiConfig::default()
        };
        let client = DomoClient::from_config(&config);
        let creds = Credentials::new("acme-1", "t123");
        assert_eq!(
            client.url_for(&creds, &Endpoint::Pages).unwrap(),
            "http://127.0.0.1:8080/api/content/v1/pages"
        );
    }

    #[test]
    fn url_uses_instance_host() {
        let client = DomoClient::from_config(&ApiConfig::default());
        let creds = Credentials::new("acme-1", "t123");
        assert_eq!(
            client.url_for(&creds, &Endpoint::cards("p1")).unwrap(),
            "https://acme-1.domo.com/api/content/v1/pages/p1/cards"
        );
    }
}
