//! In-process flow server.
//!
//! Holds projects and flows in memory, assigns sequential ids, counts
//! mutations, and can be told to fail specific operations. Used by the
//! engine tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use serde_json::{Value, json};

use super::FlowServer;
use crate::error::{Error, Result};
use crate::model::{Flow, FlowDraft, FlowUpdate, Project, ProjectDraft};

/// Server operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListProjects,
    GetProject,
    CreateProject,
    UpdateProject,
    ListFlows,
    GetFlow,
    CreateFlow,
    UpdateFlow,
    DeleteFlow,
    DeleteProject,
    Version,
    Config,
}

#[derive(Debug, Default)]
struct State {
    projects: Vec<Project>,
    flows: Vec<Flow>,
}

/// A [`FlowServer`] backed by in-memory vectors.
#[derive(Debug)]
pub struct MemoryServer {
    state: RefCell<State>,
    version: Option<String>,
    config: Value,
    failing: RefCell<HashSet<Op>>,
    next_id: Cell<u64>,
    mutations: Cell<usize>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::default()),
            version: None,
            config: json!({}),
            failing: RefCell::new(HashSet::new()),
            next_id: Cell::new(100),
            mutations: Cell::new(0),
        }
    }

    /// Builder: report this live version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Builder: report this configuration.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Make `op` return an API error from now on.
    pub fn fail_on(&self, op: Op) {
        self.failing.borrow_mut().insert(op);
    }

    /// Seed a project without counting it as a mutation.
    pub fn insert_project(&self, project: Project) -> Project {
        self.state.borrow_mut().projects.push(project.clone());
        project
    }

    /// Seed a flow without counting it as a mutation.
    pub fn insert_flow(&self, flow: Flow) -> Flow {
        self.state.borrow_mut().flows.push(flow.clone());
        flow
    }

    /// Snapshot of all projects.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.state.borrow().projects.clone()
    }

    /// Snapshot of all flows.
    #[must_use]
    pub fn flows(&self) -> Vec<Flow> {
        self.state.borrow().flows.clone()
    }

    /// Number of create/update/delete calls that succeeded.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.mutations.get()
    }

    fn check(&self, op: Op) -> Result<()> {
        if self.failing.borrow().contains(&op) {
            return Err(Error::Api {
                status: 500,
                message: format!("{op:?} failed"),
            });
        }
        Ok(())
    }

    fn assign_id(&self) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id.to_string()
    }

    fn mutated(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl FlowServer for MemoryServer {
    fn list_projects(&self) -> Result<Vec<Project>> {
        self.check(Op::ListProjects)?;
        Ok(self.projects())
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.check(Op::GetProject)?;
        Ok(self
            .state
            .borrow()
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn create_project(&self, draft: &ProjectDraft) -> Result<Project> {
        self.check(Op::CreateProject)?;
        let project = Project {
            id: self.assign_id(),
            name: draft.name.clone(),
            metadata: draft.metadata.clone(),
        };
        self.state.borrow_mut().projects.push(project.clone());
        self.mutated();
        Ok(project)
    }

    fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<Project> {
        self.check(Op::UpdateProject)?;
        let mut state = self.state.borrow_mut();
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound { id: id.to_string() })?;
        project.name.clone_from(&draft.name);
        project.metadata.clone_from(&draft.metadata);
        let updated = project.clone();
        drop(state);
        self.mutated();
        Ok(updated)
    }

    fn list_flows(&self, project_id: Option<&str>) -> Result<Vec<Flow>> {
        self.check(Op::ListFlows)?;
        Ok(self
            .state
            .borrow()
            .flows
            .iter()
            .filter(|f| project_id.is_none_or(|p| f.project_id.as_deref() == Some(p)))
            .cloned()
            .collect())
    }

    fn get_flow(&self, id: &str) -> Result<Option<Flow>> {
        self.check(Op::GetFlow)?;
        Ok(self.state.borrow().flows.iter().find(|f| f.id == id).cloned())
    }

    fn create_flow(&self, draft: &FlowDraft) -> Result<Flow> {
        self.check(Op::CreateFlow)?;
        let taken = draft
            .id
            .as_ref()
            .is_some_and(|id| self.state.borrow().flows.iter().any(|f| &f.id == id));
        let id = match &draft.id {
            Some(id) if !taken => id.clone(),
            _ => self.assign_id(),
        };
        let mut body = draft.payload();
        body["id"] = Value::String(id);
        let flow = Flow::from_value(body).map_err(|e| Error::Other(e.to_string()))?;
        self.state.borrow_mut().flows.push(flow.clone());
        self.mutated();
        Ok(flow)
    }

    fn update_flow(&self, update: &FlowUpdate) -> Result<Flow> {
        self.check(Op::UpdateFlow)?;
        let mut body = update.payload();
        body["id"] = Value::String(update.id.clone());
        let replacement = Flow::from_value(body).map_err(|e| Error::Other(e.to_string()))?;

        let mut state = self.state.borrow_mut();
        let slot = state
            .flows
            .iter_mut()
            .find(|f| f.id == update.id)
            .ok_or_else(|| Error::FlowNotFound {
                id: update.id.clone(),
            })?;
        *slot = replacement.clone();
        drop(state);
        self.mutated();
        Ok(replacement)
    }

    fn delete_flow(&self, id: &str) -> Result<()> {
        self.check(Op::DeleteFlow)?;
        let mut state = self.state.borrow_mut();
        let index = state
            .flows
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Error::FlowNotFound { id: id.to_string() })?;
        state.flows.remove(index);
        drop(state);
        self.mutated();
        Ok(())
    }

    fn delete_project(&self, id: &str) -> Result<()> {
        self.check(Op::DeleteProject)?;
        let mut state = self.state.borrow_mut();
        let index = state
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound { id: id.to_string() })?;
        state.projects.remove(index);
        drop(state);
        self.mutated();
        Ok(())
    }

    fn server_version(&self) -> Result<Option<String>> {
        self.check(Op::Version)?;
        Ok(self.version.clone())
    }

    fn server_config(&self) -> Result<Value> {
        self.check(Op::Config)?;
        Ok(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_assigns_sequential_ids() {
        let server = MemoryServer::new();
        let draft = ProjectDraft {
            name: "Sales".into(),
            metadata: serde_json::Map::new(),
        };
        let a = server.create_project(&draft).unwrap();
        let b = server.create_project(&draft).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(server.mutations(), 2);
    }

    #[test]
    fn test_create_flow_keeps_requested_id() {
        let server = MemoryServer::new();
        let flow = Flow::new("42", "Flow").with_field("data", json!({"nodes": []}));
        let created = server
            .create_flow(&FlowDraft::from_flow(&flow, Some("7".into())))
            .unwrap();
        assert_eq!(created.id, "42");
        assert_eq!(created.project_id.as_deref(), Some("7"));
        assert_eq!(created.data["data"], json!({"nodes": []}));

        let again = server
            .create_flow(&FlowDraft::from_flow(&flow, None))
            .unwrap();
        assert_ne!(again.id, "42");
    }

    #[test]
    fn test_update_flow_replaces_content() {
        let server = MemoryServer::new();
        server.insert_flow(Flow::new("1", "Old").with_project("a"));
        let update = FlowUpdate::from_flow(&Flow::new("1", "New"), Some("b".into()));
        let updated = server.update_flow(&update).unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.project_id.as_deref(), Some("b"));
        assert_eq!(server.flows().len(), 1);
    }

    #[test]
    fn test_list_flows_filters_by_project() {
        let server = MemoryServer::new();
        server.insert_flow(Flow::new("1", "a").with_project("p"));
        server.insert_flow(Flow::new("2", "b"));
        assert_eq!(server.list_flows(Some("p")).unwrap().len(), 1);
        assert_eq!(server.list_flows(None).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_flow() {
        let server = MemoryServer::new();
        server.insert_flow(Flow::new("1", "a"));
        server.insert_flow(Flow::new("2", "b"));

        server.delete_flow("1").unwrap();
        assert_eq!(server.flows().len(), 1);
        assert_eq!(server.mutations(), 1);
        assert!(matches!(server.delete_flow("1"), Err(Error::FlowNotFound { .. })));
    }

    #[test]
    fn test_delete_project() {
        let server = MemoryServer::new();
        server.insert_project(Project::new("7", "Sales"));

        server.delete_project("7").unwrap();
        assert!(server.projects().is_empty());
        assert!(matches!(
            server.delete_project("7"),
            Err(Error::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn test_server_config() {
        let server = MemoryServer::new().with_config(json!({"auto_saving": true}));
        assert_eq!(server.server_config().unwrap()["auto_saving"], true);
        server.fail_on(Op::Config);
        assert!(server.server_config().is_err());
    }

    #[test]
    fn test_fail_on() {
        let server = MemoryServer::new();
        server.fail_on(Op::GetFlow);
        assert!(server.get_flow("1").is_err());
        assert!(server.get_project("1").is_ok());
    }
}
