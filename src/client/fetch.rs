//! Degrade-to-empty fetch policy.
//!
//! Every call ends in a list of records: a failed request or an unexpected
//! payload yields an empty list and a notice describing what went wrong.
//! Nothing here returns an error to the caller.

use std::time::Instant;

use super::{ContentApi, Endpoint, FetchError};
use crate::activity::{ActivityLog, FetchLogEntry};
use crate::normalize::{self, Record};
use crate::notice::Notice;
use crate::session::credentials::Credentials;

/// Result of one fetch after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    pub records: Vec<Record>,
    /// `false` when the request failed or the payload had the wrong shape.
    pub ok: bool,
    pub notices: Vec<Notice>,
}

/// GET `endpoint`, normalize the payload and report problems as notices.
pub fn fetch_records<A: ContentApi + ?Sized>(
    api: &A,
    credentials: &Credentials,
    endpoint: &Endpoint,
    log: Option<&ActivityLog>,
) -> Fetched {
    let start = Instant::now();
    let result = api.get(credentials, endpoint);
    let latency_ms = start.elapsed().as_millis() as u64;

    let mut entry = FetchLogEntry::new(endpoint.label(), credentials.instance(), "ok", latency_ms);
    if let Endpoint::Cards { page_id } = endpoint {
        entry.page_id = Some(page_id.clone());
    }

    let fetched = match result {
        Ok(payload) => {
            let normalized = normalize::for_endpoint(endpoint, payload);
            entry.records = Some(normalized.records.len());
            match normalized.diagnostic {
                Some(diagnostic) => {
                    entry.outcome = "unexpected_shape".to_string();
                    Fetched {
                        records: Vec::new(),
                        ok: false,
                        notices: vec![diagnostic],
                    }
                }
                None => Fetched {
                    records: normalized.records,
                    ok: true,
                    notices: Vec::new(),
                },
            }
        }
        Err(err) => {
            entry.outcome = outcome_name(&err).to_string();
            entry.status = err.status_code();
            Fetched {
                records: Vec::new(),
                ok: false,
                notices: vec![Notice::error(format!(
                    "Failed to fetch {}: {err}",
                    endpoint.label()
                ))],
            }
        }
    };

    if let Some(log) = log {
        log.record(&entry);
    }

    fetched
}

fn outcome_name(err: &FetchError) -> &'static str {
    match err {
        FetchError::Status { .. } => "http_error",
        FetchError::Transport(_) => "transport_error",
        FetchError::Decode(_) => "decode_error",
        FetchError::InvalidPageId(_) => "rejected",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
