//! JSON API handlers for the browser viewer.
//!
//! Every action handler answers with the notices it produced and a fresh
//! session snapshot, so the frontend re-renders from one response.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::ContentApi;
use crate::notice::Notice;
use crate::session::{ResourceKind, Session, SessionSnapshot};

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// A finished HTTP answer, independent of the server library.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn html(html: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: html.as_bytes().to_vec(),
        }
    }

    /// Serialize `data` as a JSON reply.
    pub fn json<T: Serialize>(status: u16, data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data).context("failed to serialize JSON response")?;
        Ok(Self {
            status,
            content_type: "application/json; charset=utf-8",
            body,
        })
    }

    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: value.to_string().into_bytes(),
        }
    }

    fn bad_request(message: String) -> Self {
        Self::json_value(400, &serde_json::json!({ "error": message }))
    }
}

// ---------------------------------------------------------------------------
// JSON request / response types
// ---------------------------------------------------------------------------

/// Answer to every state-changing call.
#[derive(Debug, Serialize)]
struct ActionResponse {
    notices: Vec<Notice>,
    session: SessionSnapshot,
}

/// `PUT /api/credentials` body. An absent or `null` token keeps the current
/// one; an empty string clears it.
#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    #[serde(default)]
    instance: String,
    #[serde(default)]
    token: Option<String>,
}

/// `POST /api/dashboards/select` body.
#[derive(Debug, Deserialize)]
struct SelectRequest {
    title: String,
}

fn action<A: ContentApi>(session: &Session<A>, notices: Vec<Notice>) -> Result<Reply> {
    Reply::json(
        200,
        &ActionResponse {
            notices,
            session: session.snapshot(),
        },
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /api/session`: current snapshot.
pub fn get_session<A: ContentApi>(session: &Session<A>) -> Result<Reply> {
    Reply::json(200, &session.snapshot())
}

/// `PUT /api/credentials`: replace the session credentials.
///
/// Expects JSON body: `{ "instance": "acme-1", "token": "..." }`
pub fn put_credentials<A: ContentApi>(session: &mut Session<A>, body: &str) -> Result<Reply> {
    let req: CredentialsRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(Reply::bad_request(format!("invalid credentials request: {e}"))),
    };

    let token = req
        .token
        .unwrap_or_else(|| session.credentials().token().to_string());
    session.set_credentials(&req.instance, &token);

    action(session, Vec::new())
}

/// `POST /api/{datasets,dashboards,dataflows}`: fetch one collection.
pub fn post_fetch<A: ContentApi>(session: &mut Session<A>, kind: ResourceKind) -> Result<Reply> {
    let notices = session.fetch(kind);
    action(session, notices)
}

/// `POST /api/dashboards/select`: drill into a dashboard's cards.
///
/// Expects JSON body: `{ "title": "Sales" }`
pub fn post_select<A: ContentApi>(session: &mut Session<A>, body: &str) -> Result<Reply> {
    let req: SelectRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(Reply::bad_request(format!("invalid select request: {e}"))),
    };

    let notices = session.select_dashboard(&req.title);
    action(session, notices)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_request_token_is_optional() {
        let req: CredentialsRequest = serde_json::from_str(r#"{"instance": "acme-1"}"#).unwrap();
        assert_eq!(req.instance, "acme-1");
        assert!(req.token.is_none());
    }

    #[test]
    fn credentials_request_keeps_empty_token() {
        let req: CredentialsRequest =
            serde_json::from_str(r#"{"instance": "acme-1", "token": ""}"#).unwrap();
        assert_eq!(req.token.as_deref(), Some(""));
        let req: CredentialsRequest =
            serde_json::from_str(r#"{"instance": "acme-1", "token": null}"#).unwrap();
        assert!(req.token.is_none());
    }

    #[test]
    fn select_request_requires_title() {
        assert!(serde_json::from_str::<SelectRequest>("{}").is_err());
        let req: SelectRequest = serde_json::from_str(r#"{"title": "Sales"}"#).unwrap();
        assert_eq!(req.title, "Sales");
    }

    #[test]
    fn json_value_reply_sets_content_type() {
        let reply = Reply::json_value(404, &serde_json::json!({"error": "not found"}));
        assert_eq!(reply.status, 404);
        assert!(reply.content_type.starts_with("application/json"));
        assert_eq!(reply.body, br#"{"error":"not found"}"#);
    }
}
