//! Flow model.
//!
//! A flow is a server-side document optionally associated with one project.
//! The association is a soft reference: nothing enforces that the project
//! exists, and push/pull resolve it at the time they run.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::{RecordError, id_value, into_object, record_id, scalar_string};

/// Field names under which a flow's id may appear.
pub const FLOW_ID_KEYS: &[&str] = &["id", "flow_id"];

/// Field names under which a flow's project association may appear.
/// The first one is what the server expects on writes.
pub const FLOW_PROJECT_KEYS: &[&str] = &["folder_id", "project_id"];

/// Compatibility marker consulted by the version gate.
pub const VERSION_KEY: &str = "last_tested_version";

const DEFAULT_NAME: &str = "Unnamed";

/// A flow record.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    /// Server-assigned id (always a string after normalization).
    pub id: String,

    /// Display name; not unique.
    pub name: String,

    /// Associated project, if any.
    pub project_id: Option<String>,

    /// Server version the flow was last tested with.
    pub last_tested_version: Option<String>,

    /// Every other field of the record, kept verbatim.
    pub data: Map<String, Value>,
}

impl Flow {
    /// Create a flow with no project and no payload.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project_id: None,
            last_tested_version: None,
            data: Map::new(),
        }
    }

    /// Builder: associate with a project.
    #[must_use]
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Builder: set the compatibility marker.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.last_tested_version = Some(version.into());
        self
    }

    /// Builder: add a payload field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Read a flow from a JSON record (server response or remote document).
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or carries no id.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let mut data = into_object(value)?;
        let id = record_id(&data, FLOW_ID_KEYS).ok_or(RecordError::MissingId)?;
        let project_id = record_id(&data, FLOW_PROJECT_KEYS);
        let name = data
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NAME)
            .to_string();
        let last_tested_version = scalar_string(data.get(VERSION_KEY));

        for key in FLOW_ID_KEYS.iter().chain(FLOW_PROJECT_KEYS) {
            data.remove(*key);
        }
        data.remove("name");
        data.remove(VERSION_KEY);

        Ok(Self {
            id,
            name,
            project_id,
            last_tested_version,
            data,
        })
    }

    /// The document written to the remote store.
    #[must_use]
    pub fn to_document(&self) -> Value {
        let mut doc = self.content_fields();
        doc.insert("id".to_string(), Value::String(self.id.clone()));
        doc.insert(
            FLOW_PROJECT_KEYS[0].to_string(),
            self.project_id.clone().map_or(Value::Null, Value::String),
        );
        Value::Object(doc)
    }

    /// This flow with `fields` applied on top.
    ///
    /// The id never changes. A project field (`folder_id` or `project_id`)
    /// moves the flow, `null` detaches it. A blank `name` is ignored.
    #[must_use]
    pub fn patched(&self, fields: Map<String, Value>) -> Self {
        let mut flow = self.clone();
        for (key, value) in fields {
            if FLOW_ID_KEYS.contains(&key.as_str()) {
                continue;
            }
            if FLOW_PROJECT_KEYS.contains(&key.as_str()) {
                flow.project_id = id_value(&value);
            } else if key == "name" {
                if let Some(name) = value.as_str().filter(|n| !n.trim().is_empty()) {
                    flow.name = name.to_string();
                }
            } else if key == VERSION_KEY {
                flow.last_tested_version = scalar_string(Some(&value));
            } else {
                flow.data.insert(key, value);
            }
        }
        flow
    }

    /// Name, version marker and payload: everything but identity and association.
    fn content_fields(&self) -> Map<String, Value> {
        let mut fields = self.data.clone();
        fields.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(version) = &self.last_tested_version {
            fields.insert(VERSION_KEY.to_string(), Value::String(version.clone()));
        }
        fields
    }
}

impl Serialize for Flow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Payload for creating a flow on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDraft {
    /// Id to request; the server may assign its own.
    pub id: Option<String>,
    pub name: String,
    pub project_id: Option<String>,
    pub data: Map<String, Value>,
}

impl FlowDraft {
    /// Draft a new server flow from a pulled document.
    #[must_use]
    pub fn from_flow(flow: &Flow, project_id: Option<String>) -> Self {
        let mut data = flow.content_fields();
        data.remove("name");
        Self {
            id: Some(flow.id.clone()),
            name: flow.name.clone(),
            project_id,
            data,
        }
    }

    /// Draft a brand-new flow from loose fields.
    ///
    /// Id-like keys are dropped so the server assigns the id. A project field
    /// becomes the association. `name` wins over a name inside `fields`.
    /// Returns `None` when neither supplies a non-blank name.
    #[must_use]
    pub fn from_fields(mut fields: Map<String, Value>, name: Option<&str>) -> Option<Self> {
        let project_id = record_id(&fields, FLOW_PROJECT_KEYS);
        for key in FLOW_ID_KEYS.iter().chain(FLOW_PROJECT_KEYS) {
            fields.remove(*key);
        }
        let embedded = fields.remove("name");
        let name = name
            .map(str::to_string)
            .or_else(|| embedded.as_ref().and_then(Value::as_str).map(str::to_string))
            .filter(|n| !n.trim().is_empty())?;
        Some(Self {
            id: None,
            name,
            project_id,
            data: fields,
        })
    }

    /// JSON body for the create request.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut body = self.data.clone();
        body.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(id) = &self.id {
            body.insert("id".to_string(), Value::String(id.clone()));
        }
        body.insert(
            FLOW_PROJECT_KEYS[0].to_string(),
            self.project_id.clone().map_or(Value::Null, Value::String),
        );
        Value::Object(body)
    }
}

/// Payload for updating an existing server flow in place.
///
/// Built fresh by the pull engine so the record read from the store is never
/// mutated into the request.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowUpdate {
    pub id: String,
    pub project_id: Option<String>,
    pub data: Map<String, Value>,
}

impl FlowUpdate {
    /// Update `flow.id` with the document's content and the given association.
    #[must_use]
    pub fn from_flow(flow: &Flow, project_id: Option<String>) -> Self {
        Self {
            id: flow.id.clone(),
            project_id,
            data: flow.content_fields(),
        }
    }

    /// JSON body for the update request.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut body = self.data.clone();
        body.insert(
            FLOW_PROJECT_KEYS[0].to_string(),
            self.project_id.clone().map_or(Value::Null, Value::String),
        );
        Value::Object(body)
    }
}
