//! Canonical form and content hashing for change detection.
//!
//! Two records are "unchanged" when their canonical forms match. The
//! canonical form sorts object keys and renders every scalar as a string,
//! so `{"id": 42}` and `{"id": "42"}` compare equal and insertion order
//! never matters. It is used only for comparison, never for storage.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical serialization of a JSON value.
#[must_use]
pub fn canonical(value: &Value) -> String {
    normalize(value).to_string()
}

/// Whether two records are semantically identical.
#[must_use]
pub fn unchanged(a: &Value, b: &Value) -> bool {
    canonical(a) == canonical(b)
}

/// SHA256 of the canonical form, as lowercase hex.
#[must_use]
pub fn content_hash(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical(value).as_bytes());
    format!("{:x}", hasher.finalize())
}

fn normalize(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, normalize(v))).collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": {"y": 2, "x": 3}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": {"x": 3, "y": 2}, "b": 1}"#).unwrap();
        assert_eq!(canonical(&a), canonical(&b));
        assert!(unchanged(&a, &b));
    }

    #[test]
    fn test_canonical_numeric_and_string_ids_equal() {
        assert!(unchanged(&json!({"id": 42}), &json!({"id": "42"})));
        assert!(unchanged(&json!({"flag": true}), &json!({"flag": "true"})));
    }

    #[test]
    fn test_canonical_keeps_null_distinct() {
        assert!(!unchanged(&json!({"folder_id": null}), &json!({"folder_id": "null"})));
        assert!(!unchanged(&json!({"a": 1}), &json!({"a": 1, "b": null})));
    }

    #[test]
    fn test_canonical_array_order_matters() {
        assert!(!unchanged(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_canonical_is_stable() {
        let v = json!({"z": [{"b": 1, "a": 2}], "a": "x"});
        assert_eq!(canonical(&v), canonical(&v));
        assert_eq!(canonical(&v), r#"{"a":"x","z":[{"a":"2","b":"1"}]}"#);
    }

    #[test]
    fn test_content_hash() {
        let hash = content_hash(&json!({"id": 1}));
        assert_eq!(hash.len(), 64); // SHA256 produces 64 hex chars
        assert_eq!(hash, content_hash(&json!({"id": "1"})));
        assert_ne!(hash, content_hash(&json!({"id": 2})));
    }
}
