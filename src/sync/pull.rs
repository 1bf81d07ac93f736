//! Pull engine: remote store → server records.
//!
//! A pull decides, per flow document, between create, update and skip:
//!
//! 1. The target project is resolved (explicit id, explicit name, the
//!    path's folder segment, then the id embedded in the document).
//! 2. A resolved project missing on the server is recreated from the
//!    folder's `project.json`; if that fails the flow is pulled unassociated.
//! 3. The version gate runs before any server mutation.
//! 4. The flow is updated in place when its id exists, created otherwise.
//!
//! Whole-project pulls run every flow in silent mode so they never block
//! on input.

use std::cell::OnceCell;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::paths::{PROJECT_FILE, PROJECTS_ROOT, folder_segment, is_flow_document};
use super::sanitize::sanitize;
use super::types::{
    BatchResult, Confirm, ItemKind, ItemReport, Prompt, SyncOutcome, VersionMode,
};
use super::version::{GateDecision, VersionGate};
use crate::api::{FlowServer, project_id_by_name};
use crate::error::{Error, Result};
use crate::model::project::PROJECT_ID_KEYS;
use crate::model::{Flow, FlowDraft, FlowUpdate, Project, ProjectDraft, record_id};
use crate::remote::RemoteStore;

/// How the target project of a single-flow pull was settled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectResolution {
    /// Project the flow will be associated with.
    pub project_id: Option<String>,
    /// Project created on the server from the remote `project.json`.
    pub provisioned: Option<Project>,
    /// Why the association was dropped, when it was.
    pub warnings: Vec<String>,
}

/// Result of pulling one flow by path.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPull {
    pub report: ItemReport,
    pub resolution: ProjectResolution,
}

/// Pulls flows and projects from one branch of a remote store.
pub struct Puller<'a> {
    server: &'a dyn FlowServer,
    store: &'a dyn RemoteStore,
    branch: &'a str,
    confirm: &'a dyn Confirm,
    gate: VersionGate,
    live_version: OnceCell<Option<String>>,
}

impl<'a> Puller<'a> {
    /// Create a puller reading from `branch`; prompts go to `confirm`.
    pub fn new(
        server: &'a dyn FlowServer,
        store: &'a dyn RemoteStore,
        branch: &'a str,
        confirm: &'a dyn Confirm,
    ) -> Self {
        Self {
            server,
            store,
            branch,
            confirm,
            gate: VersionGate::default(),
            live_version: OnceCell::new(),
        }
    }

    /// Skip the version comparison entirely.
    #[must_use]
    pub fn ignore_version_check(mut self, ignore: bool) -> Self {
        self.gate = VersionGate::new(ignore);
        self
    }

    /// Read and parse the flow document at `path`.
    ///
    /// # Errors
    ///
    /// `FileNotFound` if there is no such file, `MalformedContent` if it is
    /// not a flow record.
    pub fn read_flow(&self, path: &str) -> Result<Flow> {
        let value = self.read_json(path)?;
        Flow::from_value(value).map_err(|e| Error::MalformedContent {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Pull the flow document at `path`, asking before risky changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a full path, the document cannot
    /// be read, an explicit project name does not match, or the server
    /// cannot be queried while resolving the project. Create/update
    /// failures are reported as the item's outcome.
    pub fn pull_path(
        &self,
        path: &str,
        project_id: Option<&str>,
        project_name: Option<&str>,
    ) -> Result<FlowPull> {
        if !path.contains('/') {
            return Err(Error::InvalidArgument(format!(
                "flow path must be a full path such as 'projects/<Project>/<Flow>_<id>.json', got '{path}'"
            )));
        }
        let flow = self.read_flow(path)?;
        let target = self.resolve_target_project(project_id, project_name, path, &flow)?;
        let resolution = self.ensure_project(target, path)?;

        let mut report = self.pull_flow(
            path,
            &flow,
            resolution.project_id.as_deref(),
            VersionMode::Interactive,
        );
        let mut warnings = resolution.warnings.clone();
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        Ok(FlowPull { report, resolution })
    }

    /// Decide which project a pulled flow belongs to.
    ///
    /// The first step that yields an id wins: explicit id, explicit name
    /// (must match), sanitized-name match on the path's folder segment,
    /// then the association recorded in the document.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` when `explicit_name` matches no server project,
    /// or any error listing projects.
    pub fn resolve_target_project(
        &self,
        explicit_id: Option<&str>,
        explicit_name: Option<&str>,
        path: &str,
        flow: &Flow,
    ) -> Result<Option<String>> {
        if let Some(id) = explicit_id {
            return Ok(Some(id.to_string()));
        }
        if let Some(name) = explicit_name {
            return project_id_by_name(self.server, name).map(Some);
        }
        if let Some(segment) = folder_segment(path) {
            let matched = self
                .server
                .list_projects()?
                .into_iter()
                .find(|p| sanitize(&p.name) == segment);
            if let Some(project) = matched {
                debug!(%segment, project = %project.id, "project inferred from path");
                return Ok(Some(project.id));
            }
        }
        Ok(flow.project_id.clone())
    }

    /// Make sure `project_id` exists on the server, recreating it from the
    /// remote `project.json` next to `path` when it does not.
    ///
    /// Provisioning failures drop the association instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error only if the existence check itself fails.
    pub fn ensure_project(&self, project_id: Option<String>, path: &str) -> Result<ProjectResolution> {
        let Some(project_id) = project_id else {
            return Ok(ProjectResolution::default());
        };
        if self.server.get_project(&project_id)?.is_some() {
            return Ok(ProjectResolution {
                project_id: Some(project_id),
                ..ProjectResolution::default()
            });
        }

        info!(project = %project_id, "project missing on server, provisioning");
        match self.provision(path) {
            Ok(project) => {
                info!(project = %project.name, id = %project.id, "project provisioned");
                Ok(ProjectResolution {
                    project_id: Some(project.id.clone()),
                    provisioned: Some(project),
                    warnings: Vec::new(),
                })
            }
            Err(e) => {
                warn!(project = %project_id, error = %e, "provisioning failed");
                Ok(ProjectResolution {
                    project_id: None,
                    provisioned: None,
                    warnings: vec![format!(
                        "project {project_id} not found and could not be created ({e}); \
                         flow pulled without project association"
                    )],
                })
            }
        }
    }

    fn provision(&self, path: &str) -> Result<Project> {
        let segment = folder_segment(path).ok_or_else(|| {
            Error::InvalidArgument(format!("cannot determine project folder from '{path}'"))
        })?;
        let project_path = format!("{PROJECTS_ROOT}/{segment}/{PROJECT_FILE}");
        let document = self.read_json(&project_path)?;
        let draft =
            ProjectDraft::provisioning_payload(document).ok_or_else(|| Error::MalformedContent {
                path: project_path,
                message: "project name not found".to_string(),
            })?;
        self.server.create_project(&draft)
    }

    /// Upsert one flow document into `project_id`.
    ///
    /// Never fails: every problem becomes the report's outcome.
    pub fn pull_flow(
        &self,
        path: &str,
        flow: &Flow,
        project_id: Option<&str>,
        mode: VersionMode,
    ) -> ItemReport {
        let mut report = ItemReport::new(ItemKind::Flow, &flow.name, path, SyncOutcome::Created)
            .with_id(&flow.id);
        report.project_id = project_id.map(str::to_string);

        let recorded = flow.last_tested_version.as_deref();
        let live = if self.gate.needs_live_version(recorded) {
            match self.live_version() {
                Ok(live) => live,
                Err(e) => {
                    report.outcome = SyncOutcome::Error(format!("cannot read server version: {e}"));
                    return report;
                }
            }
        } else {
            None
        };
        if let GateDecision::Skip(outcome) =
            self.gate
                .check(&flow.name, recorded, live.as_deref(), mode, self.confirm)
        {
            debug!(flow = %flow.name, ?outcome, "version gate skipped flow");
            report.outcome = outcome;
            return report;
        }

        let existing = self.server.get_flow(&flow.id).unwrap_or_else(|e| {
            debug!(flow = %flow.id, error = %e, "flow lookup failed, treating as absent");
            None
        });

        report.outcome = match existing {
            Some(existing) => {
                if existing.project_id.as_deref() != project_id {
                    report.warnings.push(format!(
                        "flow moved from project {} to {}",
                        existing.project_id.as_deref().unwrap_or("(none)"),
                        project_id.unwrap_or("(none)")
                    ));
                    let prompt = Prompt::Reassociate {
                        flow_name: flow.name.clone(),
                        from: existing.project_id.clone(),
                        to: project_id.map(str::to_string),
                    };
                    if mode == VersionMode::Interactive && !self.confirm.confirm(&prompt) {
                        report.outcome = SyncOutcome::SkippedUserDeclined;
                        return report;
                    }
                }
                let update = FlowUpdate::from_flow(flow, project_id.map(str::to_string));
                match self.server.update_flow(&update) {
                    Ok(_) => SyncOutcome::Updated,
                    Err(e) => SyncOutcome::Error(e.to_string()),
                }
            }
            None => {
                let draft = FlowDraft::from_flow(flow, project_id.map(str::to_string));
                match self.server.create_flow(&draft) {
                    Ok(created) => {
                        report.id = Some(created.id);
                        SyncOutcome::Created
                    }
                    Err(e) => SyncOutcome::Error(e.to_string()),
                }
            }
        };
        if report.outcome.is_written() {
            info!(flow = %flow.name, outcome = %report.outcome, "pulled");
        }
        report
    }

    /// Pull a whole project folder, located by recorded id or by name.
    ///
    /// The project itself is updated or created first; then every flow
    /// document in the folder is pulled in silent mode. One document's
    /// failure never stops the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if neither selector is given, the remote has no
    /// matching project folder, or the project upsert fails.
    pub fn pull_project(&self, project_id: Option<&str>, project_name: Option<&str>) -> Result<BatchResult> {
        let folders: Vec<_> = self
            .store
            .list_directory(PROJECTS_ROOT, self.branch)?
            .into_iter()
            .filter(|e| e.is_dir())
            .collect();
        if folders.is_empty() {
            return Err(Error::FileNotFound {
                path: format!("{PROJECTS_ROOT}/ (no projects in repository)"),
            });
        }

        let (folder, document) = match (project_id, project_name) {
            (Some(id), _) => folders
                .iter()
                .find_map(|f| {
                    let path = format!("{}/{PROJECT_FILE}", f.path);
                    let document = self
                        .read_json(&path)
                        .inspect_err(|e| debug!(%path, error = %e, "skipping folder"))
                        .ok()?;
                    let recorded = document.as_object().and_then(|d| record_id(d, PROJECT_ID_KEYS));
                    (recorded.as_deref() == Some(id)).then(|| (f.path.clone(), document))
                })
                .ok_or_else(|| Error::ProjectNotFound { id: id.to_string() })?,
            (None, Some(name)) => {
                let wanted = sanitize(name);
                let folder = folders
                    .iter()
                    .find(|f| f.name == wanted)
                    .ok_or_else(|| Error::ProjectNotFound {
                        id: name.to_string(),
                    })?;
                let document = self.read_json(&format!("{}/{PROJECT_FILE}", folder.path))?;
                (folder.path.clone(), document)
            }
            (None, None) => {
                return Err(Error::InvalidArgument(
                    "a project id or name is required".to_string(),
                ));
            }
        };

        let (project_report, target_id) = self.upsert_project(&folder, document)?;
        let mut batch = BatchResult {
            project: Some(project_report),
            items: Vec::new(),
        };

        for entry in self.store.list_directory(&folder, self.branch)? {
            if !entry.is_file() || !is_flow_document(&entry.name) {
                continue;
            }
            let report = match self.read_flow(&entry.path) {
                Ok(flow) => self.pull_flow(&entry.path, &flow, Some(&target_id), VersionMode::Silent),
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "unreadable flow document");
                    ItemReport::flow_error(&entry.name, &entry.path, e)
                }
            };
            batch.items.push(report);
        }
        Ok(batch)
    }

    /// Update the project recorded in `document` if the server has it,
    /// otherwise create it. Returns the report and the server-side id.
    fn upsert_project(&self, folder: &str, document: Value) -> Result<(ItemReport, String)> {
        let path = format!("{folder}/{PROJECT_FILE}");
        let recorded = document.as_object().and_then(|d| record_id(d, PROJECT_ID_KEYS));
        let fallback_name = folder.rsplit('/').next().unwrap_or(folder).to_string();
        let draft = ProjectDraft::provisioning_payload(document).unwrap_or(ProjectDraft {
            name: fallback_name,
            metadata: serde_json::Map::new(),
        });

        let existing = match &recorded {
            Some(id) => self.server.get_project(id).unwrap_or_else(|e| {
                debug!(project = %id, error = %e, "project lookup failed, treating as absent");
                None
            }),
            None => None,
        };

        let (project, outcome) = match existing {
            Some(existing) => (
                self.server.update_project(&existing.id, &draft)?,
                SyncOutcome::Updated,
            ),
            None => (self.server.create_project(&draft)?, SyncOutcome::Created),
        };
        info!(project = %project.name, id = %project.id, outcome = %outcome, "project upserted");

        let report = ItemReport::new(ItemKind::Project, &project.name, path, outcome).with_id(&project.id);
        Ok((report, project.id))
    }

    fn read_json(&self, path: &str) -> Result<Value> {
        let text = self.store.get_file(path, self.branch)?;
        serde_json::from_str(&text).map_err(|e| Error::MalformedContent {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Live server version, fetched at most once per puller.
    fn live_version(&self) -> Result<Option<String>> {
        if let Some(version) = self.live_version.get() {
            return Ok(version.clone());
        }
        let version = self.server.server_version()?;
        Ok(self.live_version.get_or_init(|| version).clone())
    }
}
