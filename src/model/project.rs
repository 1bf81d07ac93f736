//! Project model for flowsync.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::{RecordError, into_object, record_id};

/// Field names under which a project's id may appear.
pub const PROJECT_ID_KEYS: &[&str] = &["id", "project_id"];

/// Keys never carried into a provisioning or upsert payload.
const NON_PORTABLE_KEYS: &[&str] = &["flows", "id", "project_id"];

/// A project: the server-side grouping for flows.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Server-assigned id.
    pub id: String,

    /// Mutable display name.
    pub name: String,

    /// Remaining fields (description, auth settings, ...). Never holds `flows`.
    pub metadata: Map<String, Value>,
}

impl Project {
    /// Create a project with empty metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metadata: Map::new(),
        }
    }

    /// Builder: add a metadata field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Read a project from a JSON record.
    ///
    /// Any embedded flow list is dropped here.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or carries no id.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let mut metadata = into_object(value)?;
        let id = record_id(&metadata, PROJECT_ID_KEYS).ok_or(RecordError::MissingId)?;
        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        for key in NON_PORTABLE_KEYS {
            metadata.remove(*key);
        }
        metadata.remove("name");

        Ok(Self { id, name, metadata })
    }

    /// The `project.json` document written to the remote store.
    ///
    /// Never carries a flow list, however the project was built.
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut doc = self.metadata.clone();
        for key in NON_PORTABLE_KEYS {
            doc.remove(*key);
        }
        doc.insert("id".to_string(), Value::String(self.id.clone()));
        doc.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(doc)
    }

    /// Draft that applies `fields` on top of this project's current state.
    ///
    /// A `name` field renames the project; id-like keys and any flow list are
    /// ignored.
    #[must_use]
    pub fn patched(&self, fields: Map<String, Value>) -> ProjectDraft {
        let mut metadata = self.metadata.clone();
        let mut name = self.name.clone();
        for (key, value) in fields {
            if key == "name" {
                if let Value::String(new_name) = value {
                    if !new_name.trim().is_empty() {
                        name = new_name;
                    }
                }
            } else if !NON_PORTABLE_KEYS.contains(&key.as_str()) {
                metadata.insert(key, value);
            }
        }
        ProjectDraft { name, metadata }
    }
}

impl Serialize for Project {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Payload for creating or updating a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub metadata: Map<String, Value>,
}

impl ProjectDraft {
    /// Build a draft from a remote `project.json` document.
    ///
    /// Id-like keys and any flow list are stripped. Returns `None` when the
    /// document is not an object or has no usable name.
    #[must_use]
    pub fn provisioning_payload(document: Value) -> Option<Self> {
        let mut metadata = into_object(document).ok()?;
        for key in NON_PORTABLE_KEYS {
            metadata.remove(*key);
        }
        let name = match metadata.remove("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            _ => return None,
        };
        Some(Self { name, metadata })
    }

    /// Draft a new project named `name` with extra `fields`.
    ///
    /// Id-like keys, any flow list and a `name` inside `fields` are dropped.
    #[must_use]
    pub fn from_fields(name: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        for key in NON_PORTABLE_KEYS {
            fields.remove(*key);
        }
        fields.remove("name");
        Self {
            name: name.into(),
            metadata: fields,
        }
    }

    /// JSON body for the create/update request.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut body = self.metadata.clone();
        body.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_drops_flow_list() {
        let project = Project::from_value(json!({
            "id": 7,
            "name": "Sales",
            "description": "pipeline",
            "flows": [{"id": "1"}]
        }))
        .unwrap();

        assert_eq!(project.id, "7");
        assert_eq!(project.name, "Sales");
        assert!(!project.metadata.contains_key("flows"));
        assert!(project.to_document().get("flows").is_none());
        assert_eq!(project.to_document()["description"], "pipeline");
    }

    #[test]
    fn test_document_never_embeds_flows() {
        let project = Project::new("7", "Sales")
            .with_field("flows", json!([{"id": "1"}]))
            .with_field("description", json!("team"));

        let doc = project.to_document();
        assert!(doc.get("flows").is_none());
        assert_eq!(doc["id"], "7");
        assert_eq!(doc["description"], "team");
    }

    #[test]
    fn test_patched_merges_fields() {
        let project = Project::new("7", "Sales").with_field("description", json!("old"));
        let draft = project.patched(
            json!({"name": "Revenue", "description": "new", "id": "9", "flows": []})
                .as_object()
                .cloned()
                .unwrap(),
        );

        assert_eq!(draft.name, "Revenue");
        assert_eq!(draft.metadata["description"], "new");
        assert!(!draft.metadata.contains_key("id"));
        assert!(!draft.metadata.contains_key("flows"));
    }

    #[test]
    fn test_patched_keeps_name_when_blank() {
        let project = Project::new("7", "Sales");
        let draft = project.patched(json!({"name": " "}).as_object().cloned().unwrap());
        assert_eq!(draft.name, "Sales");
    }

    #[test]
    fn test_from_fields_strips_ids() {
        let draft = ProjectDraft::from_fields(
            "Sales",
            json!({"id": "1", "name": "Other", "description": "d"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(draft.name, "Sales");
        assert_eq!(draft.payload(), json!({"name": "Sales", "description": "d"}));
    }

    #[test]
    fn test_from_value_accepts_legacy_id() {
        let project = Project::from_value(json!({"project_id": "p1", "name": "X"})).unwrap();
        assert_eq!(project.id, "p1");
    }

    #[test]
    fn test_provisioning_payload_strips_ids() {
        let draft = ProjectDraft::provisioning_payload(json!({
            "id": "7",
            "project_id": "7",
            "name": "Sales",
            "flows": [],
            "description": "d"
        }))
        .unwrap();

        assert_eq!(draft.name, "Sales");
        let body = draft.payload();
        assert!(body.get("id").is_none());
        assert!(body.get("project_id").is_none());
        assert!(body.get("flows").is_none());
        assert_eq!(body["description"], "d");
    }

    #[test]
    fn test_provisioning_payload_requires_name() {
        assert!(ProjectDraft::provisioning_payload(json!({"id": "7"})).is_none());
        assert!(ProjectDraft::provisioning_payload(json!({"name": "  "})).is_none());
        assert!(ProjectDraft::provisioning_payload(json!("Sales")).is_none());
    }
}
