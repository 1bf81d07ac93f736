//! Flow-server API.
//!
//! The sync engines talk to the server only through [`FlowServer`].
//! [`LangflowClient`] is the HTTP implementation. Unit tests use the
//! in-process `MemoryServer`.

mod client;
#[cfg(test)]
pub mod memory;

pub use client::LangflowClient;
#[cfg(test)]
pub use memory::MemoryServer;

use serde_json::Value;

use crate::error::Result;
use crate::model::{Flow, FlowDraft, FlowUpdate, Project, ProjectDraft};

/// Operations the sync engines need from a flow server.
///
/// "Not found" is a value (`Ok(None)`) on the lookups, never an error.
pub trait FlowServer {
    /// All projects visible to the caller.
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// One project, or `None` if it does not exist.
    fn get_project(&self, id: &str) -> Result<Option<Project>>;

    /// Create a project and return it with its assigned id.
    fn create_project(&self, draft: &ProjectDraft) -> Result<Project>;

    /// Overwrite a project's name and metadata.
    fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<Project>;

    /// Flows, optionally only those associated with `project_id`.
    fn list_flows(&self, project_id: Option<&str>) -> Result<Vec<Flow>>;

    /// One flow, or `None` if it does not exist.
    fn get_flow(&self, id: &str) -> Result<Option<Flow>>;

    /// Create a flow and return it as stored.
    fn create_flow(&self, draft: &FlowDraft) -> Result<Flow>;

    /// Update a flow in place and return it as stored.
    fn update_flow(&self, update: &FlowUpdate) -> Result<Flow>;

    /// Delete a flow.
    ///
    /// A missing flow is `FlowNotFound`.
    fn delete_flow(&self, id: &str) -> Result<()>;

    /// Delete a project.
    ///
    /// A missing project is `ProjectNotFound`.
    fn delete_project(&self, id: &str) -> Result<()>;

    /// Live server version string.
    fn server_version(&self) -> Result<Option<String>>;

    /// The server's runtime configuration, as it reports it.
    fn server_config(&self) -> Result<Value>;
}

/// Find a project id by exact display name.
///
/// # Errors
///
/// Returns `ProjectNotFound` when no project carries that name.
pub fn project_id_by_name(server: &dyn FlowServer, name: &str) -> Result<String> {
    server
        .list_projects()?
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.id)
        .ok_or_else(|| crate::error::Error::ProjectNotFound {
            id: name.to_string(),
        })
}
