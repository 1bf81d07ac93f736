//! Data models for flowsync.
//!
//! Server records arrive as loosely-shaped JSON objects. This module is the
//! boundary where they become typed records:
//! - Flow (plus `FlowDraft` / `FlowUpdate` for mutations)
//! - Project (plus `ProjectDraft`)
//!
//! Id lookups across legacy field names happen here once, through
//! [`record_id`], so the sync engines only ever see a single canonical id.

pub mod flow;
pub mod project;

pub use flow::{Flow, FlowDraft, FlowUpdate};
pub use project::{Project, ProjectDraft};

use serde_json::{Map, Value};

/// Reasons a JSON value cannot be read as a domain record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The value is not a JSON object.
    #[error("expected a JSON object")]
    NotAnObject,
    /// None of the id fields is present.
    #[error("record has no id")]
    MissingId,
}

/// Look up a record's id under any of its accepted field names.
///
/// The first present, non-empty scalar wins. Numbers are stringified so
/// `42` and `"42"` produce the same id.
#[must_use]
pub fn record_id(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| record.get(*key).and_then(id_value))
}

/// Read one id-valued field: a non-blank string or a number.
pub(crate) fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Stringify an optional scalar field (`last_tested_version` may be a number).
pub(crate) fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    }
}

/// Take the object map out of a value.
pub(crate) fn into_object(value: Value) -> Result<Map<String, Value>, RecordError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RecordError::NotAnObject),
    }
}
