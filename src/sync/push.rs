//! Push engine: server records → remote store.
//!
//! Every document goes through the same decision: compute its path, look at
//! what the remote holds there, and write only when the canonical forms
//! differ. Unreadable remote content is overwritten rather than failing the
//! push.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::hash::{content_hash, unchanged};
use super::paths::{flow_file_path, project_file_path, project_folder};
use super::types::{BatchResult, ItemKind, ItemReport, RemoteState, SyncOutcome};
use crate::api::FlowServer;
use crate::error::{Error, Result};
use crate::model::{Flow, Project};
use crate::remote::RemoteStore;

/// Pushes flows and projects to one branch of a remote store.
pub struct Pusher<'a> {
    server: &'a dyn FlowServer,
    store: &'a dyn RemoteStore,
    branch: &'a str,
    message: Option<&'a str>,
}

impl<'a> Pusher<'a> {
    /// Create a pusher targeting `branch`.
    pub fn new(server: &'a dyn FlowServer, store: &'a dyn RemoteStore, branch: &'a str) -> Self {
        Self {
            server,
            store,
            branch,
            message: None,
        }
    }

    /// Use `message` for every commit instead of the generated ones.
    #[must_use]
    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    /// Push one flow into `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote store cannot be queried or written.
    pub fn push_flow(&self, flow: &Flow, folder: &str) -> Result<ItemReport> {
        let path = flow_file_path(folder, &flow.name, &flow.id);
        let message = self.commit_message("Push flow", &flow.name);
        let mut report =
            self.push_document(ItemKind::Flow, &flow.name, &path, &flow.to_document(), &message)?;
        report.id = Some(flow.id.clone());
        report.project_id.clone_from(&flow.project_id);
        Ok(report)
    }

    /// Fetch a flow from the server and push it into its project's folder.
    ///
    /// # Errors
    ///
    /// Returns `FlowNotFound` if the flow does not exist, or any server or
    /// remote-store error.
    pub fn push_flow_by_id(&self, flow_id: &str) -> Result<ItemReport> {
        let flow = self
            .server
            .get_flow(flow_id)?
            .ok_or_else(|| Error::FlowNotFound {
                id: flow_id.to_string(),
            })?;

        let project = match &flow.project_id {
            Some(project_id) => self.server.get_project(project_id)?,
            None => None,
        };
        if project.is_none() {
            debug!(flow = %flow.id, "flow has no resolvable project");
        }
        let folder = project_folder(
            project.as_ref().map(|p| p.name.as_str()),
            project.as_ref().map(|p| p.id.as_str()),
        );
        self.push_flow(&flow, &folder)
    }

    /// Push a project's metadata and, unless `metadata_only`, all its flows.
    ///
    /// Per-document failures are recorded in the result and never stop the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project does not exist, or an error
    /// if the project or its flow list cannot be fetched.
    pub fn push_project(&self, project_id: &str, metadata_only: bool) -> Result<BatchResult> {
        let project = self
            .server
            .get_project(project_id)?
            .ok_or_else(|| Error::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        let folder = project_folder(Some(&project.name), Some(&project.id));
        info!(project = %project.name, %folder, branch = self.branch, "pushing project");

        let mut batch = BatchResult {
            project: Some(self.push_metadata(&project)),
            items: Vec::new(),
        };
        if metadata_only {
            return Ok(batch);
        }

        for flow in self.server.list_flows(Some(&project.id))? {
            let report = self.push_flow(&flow, &folder).unwrap_or_else(|e| {
                warn!(flow = %flow.name, error = %e, "flow push failed");
                ItemReport::flow_error(&flow.name, flow_file_path(&folder, &flow.name, &flow.id), e)
                    .with_id(&flow.id)
            });
            batch.items.push(report);
        }
        Ok(batch)
    }

    fn push_metadata(&self, project: &Project) -> ItemReport {
        let path = project_file_path(Some(&project.name), Some(&project.id));
        let message = self.commit_message("Push project", &project.name);
        self.push_document(
            ItemKind::Project,
            &project.name,
            &path,
            &project.to_document(),
            &message,
        )
        .unwrap_or_else(|e| {
            warn!(project = %project.name, error = %e, "project metadata push failed");
            ItemReport::new(ItemKind::Project, &project.name, &path, SyncOutcome::Error(e.to_string()))
        })
        .with_id(&project.id)
    }

    fn push_document(
        &self,
        kind: ItemKind,
        name: &str,
        path: &str,
        document: &Value,
        message: &str,
    ) -> Result<ItemReport> {
        let state = self.inspect(kind, path, document)?;
        let outcome = match &state {
            RemoteState::Matching => {
                debug!(path, "unchanged, skipping");
                SyncOutcome::SkippedUnchanged
            }
            RemoteState::Missing => {
                self.write(path, document, message)?;
                SyncOutcome::Created
            }
            RemoteState::Differing | RemoteState::Malformed(_) => {
                self.write(path, document, message)?;
                SyncOutcome::Updated
            }
        };

        let mut report = ItemReport::new(kind, name, path, outcome);
        report.content_hash = Some(content_hash(document));
        if let RemoteState::Malformed(reason) = &state {
            report
                .warnings
                .push(format!("existing document could not be compared ({reason}); overwritten"));
        }
        report.remote = Some(state);
        Ok(report)
    }

    /// Classify what the remote currently holds at `path`.
    fn inspect(&self, kind: ItemKind, path: &str, document: &Value) -> Result<RemoteState> {
        if !self.store.file_exists(path, self.branch)? {
            return Ok(RemoteState::Missing);
        }
        let text = match self.store.get_file(path, self.branch) {
            Ok(text) => text,
            Err(e) => return Ok(RemoteState::Malformed(e.to_string())),
        };
        let existing: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => return Ok(RemoteState::Malformed(format!("invalid JSON: {e}"))),
        };
        // Read the stored record through the same model so legacy field
        // names compare equal to their normalized form.
        let existing = match kind {
            ItemKind::Flow => Flow::from_value(existing).map(|f| f.to_document()),
            ItemKind::Project => Project::from_value(existing).map(|p| p.to_document()),
        };
        Ok(match existing {
            Ok(existing) if unchanged(&existing, document) => RemoteState::Matching,
            Ok(_) => RemoteState::Differing,
            Err(e) => RemoteState::Malformed(e.to_string()),
        })
    }

    fn write(&self, path: &str, document: &Value, message: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(document)?;
        self.store.put_file(path, &content, message, self.branch)?;
        info!(path, branch = self.branch, "pushed");
        Ok(())
    }

    fn commit_message(&self, verb: &str, name: &str) -> String {
        self.message
            .map_or_else(|| format!("{verb}: {name}"), str::to_string)
    }
}
