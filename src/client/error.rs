use thiserror::Error;

/// Longest response body kept in an error message.
const MAX_BODY_CHARS: usize = 2_000;

/// Failure of a single platform API call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("{status} {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS, DNS or timeout failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body is not JSON.
    #[error("response is not valid JSON: {0}")]
    Decode(String),

    /// The page id cannot be placed in a URL path segment.
    #[error("invalid page id '{0}'")]
    InvalidPageId(String),
}

impl FetchError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: clip(body.into()),
        }
    }

    /// HTTP status code, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn clip(mut body: String) -> String {
    if let Some((idx, _)) = body.char_indices().nth(MAX_BODY_CHARS) {
        body.truncate(idx);
        body.push('…');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_shows_code_and_body() {
        let err = FetchError::status(401, r#"{"status":401,"message":"Unauthorized"}"#);
        assert_eq!(
            err.to_string(),
            r#"401 {"status":401,"message":"Unauthorized"}"#
        );
        assert_eq!(err.status_code(), Some(401));
    }

    #[test]
    fn long_bodies_are_clipped() {
        let err = FetchError::status(500, "x".repeat(MAX_BODY_CHARS + 50));
        let FetchError::Status { body, .. } = err else {
            panic!("expected status error");
        };
        assert_eq!(body.chars().count(), MAX_BODY_CHARS + 1);
        assert!(body.ends_with('…'));
    }

    #[test]
    fn transport_has_no_status() {
        assert_eq!(FetchError::Transport("dns".into()).status_code(), None);
    }
}
