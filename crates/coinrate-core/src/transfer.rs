//! Export and import of entry collections as JSON files.

use chrono::NaiveDate;
use serde_json::Value;

use crate::entry::Entry;
use crate::error::ImportError;

/// Pretty-printed JSON array of `entries`.
pub fn export_json(entries: &[Entry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Export file name embedding `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("cpm-entries-{}.json", date.format("%Y-%m-%d"))
}

/// Parse an import file.
///
/// The top level must be an array or nothing is imported. Elements are
/// coerced field by field, with `now_ms` standing in for missing timestamps.
pub fn parse_import(text: &str, now_ms: i64) -> Result<Vec<Entry>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(items) => Ok(items.iter().map(|v| Entry::coerce(v, now_ms)).collect()),
        other => Err(ImportError::NotAnArray(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
