//! Response normalization: raw endpoint JSON → list of JSON objects.
//!
//! Pages, cards and dataflows answer with a bare array; datasets answer with
//! an object wrapping the array under `dataSources`. Whatever the shape,
//! normalization never fails. Non-object array entries are dropped and an
//! unexpected payload becomes an empty list plus a warning that shows the
//! raw payload.

use serde_json::{Map, Value};

use crate::client::Endpoint;
use crate::notice::Notice;

/// Key holding the dataset list in the datasources response.
pub const DATA_SOURCES_KEY: &str = "dataSources";

/// Longest raw payload echoed back in a diagnostic.
const MAX_PAYLOAD_CHARS: usize = 1_000;

pub type Record = Map<String, Value>;

/// Records extracted from one response, plus a diagnostic when the payload
/// did not have the expected shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<Record>,
    pub diagnostic: Option<Notice>,
}

/// Normalize a successful response for the given endpoint.
pub fn for_endpoint(endpoint: &Endpoint, payload: Value) -> Normalized {
    match endpoint {
        Endpoint::Datasets => data_sources(payload),
        other => bare_list(other.label(), payload),
    }
}

/// Keep the object entries of a bare JSON array.
pub fn bare_list(label: &str, payload: Value) -> Normalized {
    match payload {
        Value::Array(items) => Normalized {
            records: objects_only(items),
            diagnostic: None,
        },
        other => unexpected(
            &format!("Unexpected {label} response: expected a list"),
            &other,
        ),
    }
}

/// Extract the list under `dataSources` from the datasets response object.
pub fn data_sources(payload: Value) -> Normalized {
    let Value::Object(mut object) = payload else {
        return unexpected(
            "Unexpected datasets response: expected an object",
            &payload,
        );
    };

    match object.remove(DATA_SOURCES_KEY) {
        Some(Value::Array(items)) => Normalized {
            records: objects_only(items),
            diagnostic: None,
        },
        Some(other) => {
            object.insert(DATA_SOURCES_KEY.to_string(), other);
            unexpected(
                &format!("Unexpected datasets response: '{DATA_SOURCES_KEY}' is not a list"),
                &Value::Object(object),
            )
        }
        None => unexpected(
            &format!("Unexpected datasets response: no '{DATA_SOURCES_KEY}' key"),
            &Value::Object(object),
        ),
    }
}

fn objects_only(items: Vec<Value>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

fn unexpected(reason: &str, payload: &Value) -> Normalized {
    Normalized {
        records: Vec::new(),
        diagnostic: Some(Notice::warning(format!(
            "{reason}. Raw payload: {}",
            render_payload(payload)
        ))),
    }
}

fn render_payload(payload: &Value) -> String {
    let text = payload.to_string();
    match text.char_indices().nth(MAX_PAYLOAD_CHARS) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::notice::Level;

    #[test]
    fn data_sources_extracts_inner_list() {
        let out = data_sources(json!({
            "dataSources": [{"id": "d1"}, {"id": "d2"}, {}],
            "totalCount": 3
        }));
        assert_eq!(out.records.len(), 3);
        assert!(out.diagnostic.is_none());
    }

    #[test]
    fn data_sources_missing_key_is_empty_with_diagnostic() {
        let out = data_sources(json!({"error": "nope"}));
        assert!(out.records.is_empty());
        let notice = out.diagnostic.unwrap();
        assert_eq!(notice.level, Level::Warning);
        assert!(notice.message.contains("dataSources"));
        assert!(notice.message.contains(r#"{"error":"nope"}"#));
    }

    #[test]
    fn data_sources_non_list_value_is_empty_with_diagnostic() {
        let out = data_sources(json!({"dataSources": "many"}));
        assert!(out.records.is_empty());
        assert!(out.diagnostic.unwrap().message.contains("\"many\""));
    }

    #[test]
    fn data_sources_bare_list_is_unexpected() {
        let out = data_sources(json!([{"id": "d1"}]));
        assert!(out.records.is_empty());
        assert!(out.diagnostic.is_some());
    }

    #[test]
    fn bare_list_drops_non_objects() {
        let out = bare_list(
            "dashboards",
            json!([{"id": 1}, "junk", 42, null, [1, 2], {"id": 2}]),
        );
        assert_eq!(out.records.len(), 2);
        assert!(out.diagnostic.is_none());
    }

    #[test]
    fn bare_list_rejects_objects() {
        let out = bare_list("dataflows", json!({"status": 403}));
        assert!(out.records.is_empty());
        assert!(out.diagnostic.unwrap().message.contains("dataflows"));
    }

    #[test]
    fn for_endpoint_picks_shape() {
        let flows = for_endpoint(&Endpoint::Dataflows, json!([{"id": 7}]));
        assert_eq!(flows.records.len(), 1);

        let datasets = for_endpoint(&Endpoint::Datasets, json!([{"id": 7}]));
        assert!(datasets.records.is_empty());
    }

    #[test]
    fn long_payloads_are_clipped() {
        let big = Value::String("y".repeat(5_000));
        let rendered = render_payload(&big);
        assert_eq!(rendered.chars().count(), MAX_PAYLOAD_CHARS + 1);
    }
}
