//! HTTP client for the Langflow REST API.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::FlowServer;
use crate::error::{Error, Result};
use crate::model::{Flow, FlowDraft, FlowUpdate, Project, ProjectDraft, RecordError};

const API_KEY_HEADER: &str = "x-api-key";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Langflow client authenticated with an API key.
pub struct LangflowClient {
    http: Client,
    base: Url,
    api_key: String,
}

impl LangflowClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("invalid server URL '{base_url}': {e}")))?;
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("flowsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base,
            api_key: api_key.into(),
        })
    }

    /// Base URL the client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `<base>/api/v1/<segments...>`
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("server URL cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        self.send(self.http.get(url))
    }

    /// GET that maps 404 to `None`.
    fn get_optional(&self, segments: &[&str]) -> Result<Option<Value>> {
        match self.get(segments) {
            Ok(value) => Ok(Some(value)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn post(&self, segments: &[&str], body: &Value) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");
        self.send(self.http.post(url).json(body))
    }

    fn patch(&self, segments: &[&str], body: &Value) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!(%url, "PATCH");
        self.send(self.http.patch(url).json(body))
    }

    fn delete(&self, segments: &[&str]) -> Result<Value> {
        let url = self.endpoint(segments)?;
        debug!(%url, "DELETE");
        self.send(self.http.delete(url))
    }
}

impl FlowServer for LangflowClient {
    fn list_projects(&self) -> Result<Vec<Project>> {
        let body = self.get(&["projects", ""])?;
        list_items(body, "projects")
            .into_iter()
            .map(|v| Project::from_value(v).map_err(|e| malformed("projects", &e)))
            .collect()
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.get_optional(&["projects", id])?
            .map(|v| Project::from_value(v).map_err(|e| malformed("project", &e)))
            .transpose()
    }

    fn create_project(&self, draft: &ProjectDraft) -> Result<Project> {
        let body = self.post(&["projects", ""], &draft.payload())?;
        Project::from_value(body).map_err(|e| malformed("created project", &e))
    }

    fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<Project> {
        let body = self.patch(&["projects", id], &draft.payload())?;
        Project::from_value(body).map_err(|e| malformed("updated project", &e))
    }

    fn list_flows(&self, project_id: Option<&str>) -> Result<Vec<Flow>> {
        let body = self.get(&["flows", ""])?;
        let flows = list_items(body, "flows")
            .into_iter()
            .map(|v| Flow::from_value(v).map_err(|e| malformed("flows", &e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(match project_id {
            Some(project_id) => flows
                .into_iter()
                .filter(|f| f.project_id.as_deref() == Some(project_id))
                .collect(),
            None => flows,
        })
    }

    fn get_flow(&self, id: &str) -> Result<Option<Flow>> {
        self.get_optional(&["flows", id])?
            .map(|v| Flow::from_value(v).map_err(|e| malformed("flow", &e)))
            .transpose()
    }

    fn create_flow(&self, draft: &FlowDraft) -> Result<Flow> {
        let body = self.post(&["flows", ""], &draft.payload())?;
        Flow::from_value(body).map_err(|e| malformed("created flow", &e))
    }

    fn update_flow(&self, update: &FlowUpdate) -> Result<Flow> {
        let body = self.patch(&["flows", &update.id], &update.payload())?;
        Flow::from_value(body).map_err(|e| malformed("updated flow", &e))
    }

    fn delete_flow(&self, id: &str) -> Result<()> {
        missing_as(self.delete(&["flows", id]), || Error::FlowNotFound {
            id: id.to_string(),
        })
    }

    fn delete_project(&self, id: &str) -> Result<()> {
        missing_as(self.delete(&["projects", id]), || Error::ProjectNotFound {
            id: id.to_string(),
        })
    }

    fn server_version(&self) -> Result<Option<String>> {
        let body = self.get(&["version"])?;
        Ok(crate::model::scalar_string(body.get("version")))
    }

    fn server_config(&self) -> Result<Value> {
        self.get(&["config"])
    }
}

/// Replace a 404 with the caller's not-found error and drop the body.
fn missing_as(result: Result<Value>, not_found: impl FnOnce() -> Error) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(Error::Api { status: 404, .. }) => Err(not_found()),
        Err(e) => Err(e),
    }
}

/// Listing endpoints return either a bare array or `{"<key>": [...]}`.
fn list_items(body: Value, key: &str) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Prefer the JSON `detail` field of an error body, else the raw text.
fn error_detail(body: &str) -> String {
    let text = body.trim();
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => text.to_string(),
        },
        _ if text.is_empty() => "empty response".to_string(),
        _ => text.to_string(),
    }
}

fn malformed(what: &str, err: &RecordError) -> Error {
    Error::MalformedContent {
        path: what.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_items_shapes() {
        assert_eq!(list_items(json!([{"id": 1}]), "flows").len(), 1);
        assert_eq!(list_items(json!({"flows": [{"id": 1}, {"id": 2}]}), "flows").len(), 2);
        assert!(list_items(json!({"other": []}), "flows").is_empty());
        assert!(list_items(Value::Null, "flows").is_empty());
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(r#"{"detail": "Flow not found"}"#), "Flow not found");
        assert_eq!(
            error_detail(r#"{"detail": [{"msg": "bad"}]}"#),
            r#"[{"msg":"bad"}]"#
        );
        assert_eq!(error_detail("Internal Server Error"), "Internal Server Error");
        assert_eq!(error_detail("  "), "empty response");
    }

    #[test]
    fn test_missing_as_maps_only_404() {
        let not_found = || Error::FlowNotFound { id: "1".into() };
        let gone = Err(Error::Api {
            status: 404,
            message: "Flow not found".into(),
        });
        assert!(matches!(missing_as(gone, not_found), Err(Error::FlowNotFound { .. })));

        let denied = Err(Error::Api {
            status: 403,
            message: "forbidden".into(),
        });
        assert!(matches!(
            missing_as(denied, not_found),
            Err(Error::Api { status: 403, .. })
        ));
        assert!(missing_as(Ok(Value::Null), not_found).is_ok());
    }

    #[test]
    fn test_config_endpoint_path() {
        let client = LangflowClient::new("http://localhost:7860", "key").unwrap();
        assert_eq!(
            client.endpoint(&["config"]).unwrap().as_str(),
            "http://localhost:7860/api/v1/config"
        );
    }

    #[test]
    fn test_endpoint_paths() {
        let client = LangflowClient::new("http://localhost:7860/", "key").unwrap();
        assert_eq!(
            client.endpoint(&["flows", ""]).unwrap().as_str(),
            "http://localhost:7860/api/v1/flows/"
        );
        assert_eq!(
            client.endpoint(&["projects", "a b"]).unwrap().as_str(),
            "http://localhost:7860/api/v1/projects/a%20b"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = LangflowClient::new("https://example.com/langflow", "key").unwrap();
        assert_eq!(
            client.endpoint(&["version"]).unwrap().as_str(),
            "https://example.com/langflow/api/v1/version"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            LangflowClient::new("not a url", "key"),
            Err(Error::Config(_))
        ));
    }
}
