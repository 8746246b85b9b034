//! Conversions between TOML values and the JSON/liquid data models.

use serde_json::Value as JsonValue;
use toml::{Table, Value};

/// Convert a TOML value to JSON.
///
/// Datetimes become strings; non-finite floats become `null`.
pub fn toml_to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        Value::Array(arr) => JsonValue::Array(arr.iter().map(toml_to_json).collect()),
        Value::Table(table) => table_to_json(table),
    }
}

/// Convert a TOML table to a JSON object.
pub fn table_to_json(table: &Table) -> JsonValue {
    JsonValue::Object(
        table
            .iter()
            .map(|(k, v)| (k.clone(), toml_to_json(v)))
            .collect(),
    )
}

/// Convert a TOML table to liquid render globals.
pub fn table_to_liquid(table: &Table) -> Result<liquid::Object, liquid::Error> {
    liquid::to_object(&table_to_json(table))
}

/// Plain text form of a value: strings unquoted, everything else as TOML.
pub fn value_to_plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
