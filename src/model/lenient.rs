//! Field deserializers that never fail.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifier given as a string or a number.
pub fn id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(id_value(&Value::deserialize(de)?))
}

/// Free text; scalars other than strings are rendered as text.
pub fn text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// A JSON array; anything else reads as empty.
pub fn list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

pub fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
