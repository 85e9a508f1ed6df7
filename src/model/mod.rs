//! Typed records decoded from normalized API objects.
//!
//! The platform's payloads are loosely shaped: ids are sometimes numbers and
//! sometimes strings, optional fields may be absent or `null`, and
//! individual fields can have an unexpected type. Decoding is therefore
//! lenient: every field falls back to "absent" instead of failing the record.

mod lenient;

use serde::Deserialize;
use serde_json::Value;

use crate::normalize::Record;

/// A dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub owners: Vec<Value>,
}

impl Page {
    /// Display name of the first listed owner.
    pub fn owner_name(&self) -> Option<&str> {
        self.owners
            .first()?
            .get("displayName")?
            .as_str()
            .filter(|name| !name.is_empty())
    }
}

/// A card on a dashboard page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Card {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
}

/// A registered data source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Dataset {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
}

/// A Magic ETL dataflow.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Dataflow {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub inputs: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub outputs: Vec<Value>,
}

impl Dataflow {
    /// Dataset ids read by this dataflow, in declaration order.
    pub fn input_ids(&self) -> Vec<String> {
        self.inputs.iter().filter_map(dataset_ref).collect()
    }

    /// Dataset ids written by this dataflow, in declaration order.
    pub fn output_ids(&self) -> Vec<String> {
        self.outputs.iter().filter_map(dataset_ref).collect()
    }
}

/// An input/output reference: either an object naming the dataset via
/// `dataSourceId` (or `id`), or the bare id itself.
fn dataset_ref(entry: &Value) -> Option<String> {
    match entry {
        Value::Object(obj) => obj
            .get("dataSourceId")
            .and_then(lenient::id_value)
            .or_else(|| obj.get("id").and_then(lenient::id_value)),
        other => lenient::id_value(other),
    }
}

/// Decode a record, falling back to the all-absent record.
pub trait FromRecord: Sized + Default + for<'de> Deserialize<'de> {
    fn from_record(record: Record) -> Self {
        serde_json::from_value(Value::Object(record)).unwrap_or_default()
    }
}

impl FromRecord for Page {}
impl FromRecord for Card {}
impl FromRecord for Dataset {}
impl FromRecord for Dataflow {}

/// Decode every record of a normalized list.
pub fn decode_all<T: FromRecord>(records: Vec<Record>) -> Vec<T> {
    records.into_iter().map(T::from_record).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn page_decodes_owner() {
        let page = Page::from_record(record(json!({
            "id": "p1",
            "title": "Sales",
            "owners": [{"displayName": "Ann"}, {"displayName": "Bob"}]
        })));
        assert_eq!(page.id.as_deref(), Some("p1"));
        assert_eq!(page.title.as_deref(), Some("Sales"));
        assert_eq!(page.owner_name(), Some("Ann"));
    }

    #[test]
    fn numeric_ids_become_strings() {
        let page = Page::from_record(record(json!({"id": 1234567, "title": "Ops"})));
        assert_eq!(page.id.as_deref(), Some("1234567"));
    }

    #[test]
    fn page_without_owners_has_no_owner() {
        for value in [
            json!({"id": "p1"}),
            json!({"id": "p1", "owners": []}),
            json!({"id": "p1", "owners": null}),
            json!({"id": "p1", "owners": "Ann"}),
            json!({"id": "p1", "owners": [{}]}),
            json!({"id": "p1", "owners": [{"displayName": 7}]}),
        ] {
            assert_eq!(Page::from_record(record(value)).owner_name(), None);
        }
    }

    #[test]
    fn wrong_field_types_degrade_to_absent() {
        let dataset = Dataset::from_record(record(json!({
            "id": {"nested": true},
            "name": null,
            "type": ["x"]
        })));
        assert_eq!(dataset, Dataset::default());
    }

    #[test]
    fn dataset_reads_type_field() {
        let dataset = Dataset::from_record(record(json!({
            "id": "d1", "name": "Orders", "type": "webform"
        })));
        assert_eq!(dataset.kind.as_deref(), Some("webform"));
    }

    #[test]
    fn dataflow_ids_from_objects_and_bare_values() {
        let flow = Dataflow::from_record(record(json!({
            "id": 42,
            "name": "Nightly",
            "inputs": [{"dataSourceId": "a"}, {"id": "b"}, "c", 9, null, {"name": "x"}],
            "outputs": [{"dataSourceId": "z"}]
        })));
        assert_eq!(flow.id.as_deref(), Some("42"));
        assert_eq!(flow.input_ids(), ["a", "b", "c", "9"]);
        assert_eq!(flow.output_ids(), ["z"]);
    }

    #[test]
    fn decode_all_keeps_order() {
        let cards: Vec<Card> = decode_all(vec![
            record(json!({"id": "c1", "title": "Revenue"})),
            record(json!({"id": "c2"})),
        ]);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title.as_deref(), Some("Revenue"));
        assert_eq!(cards[1].title, None);
    }
}
