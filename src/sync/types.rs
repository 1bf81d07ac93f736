//! Sync outcome types.
//!
//! The push and pull engines never print. Every decision they make is
//! returned as one of these values and rendered by [`super::report`].

use std::fmt;

use serde::Serialize;

/// Result of pushing or pulling one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The target did not exist and was written.
    Created,
    /// The target existed and was overwritten.
    Updated,
    /// The target already matched; nothing was written.
    SkippedUnchanged,
    /// The recorded version differs from the live server and the gate said no.
    SkippedVersionMismatch,
    /// The operator declined a confirmation prompt.
    SkippedUserDeclined,
    /// This item failed; the batch carried on.
    Error(String),
}

impl SyncOutcome {
    /// True for `Created` and `Updated`.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Created | Self::Updated)
    }

    /// True for every `Skipped*` variant.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::SkippedUnchanged | Self::SkippedVersionMismatch | Self::SkippedUserDeclined
        )
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short label for text output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::SkippedUnchanged => "unchanged",
            Self::SkippedVersionMismatch => "version mismatch",
            Self::SkippedUserDeclined => "declined",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(reason) => write!(f, "error: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// What the push engine found at the target path before deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum RemoteState {
    /// No document at the path.
    Missing,
    /// A document whose canonical form equals the record.
    Matching,
    /// A document with different content.
    Differing,
    /// A document that could not be fetched or parsed; overwritten.
    Malformed(String),
}

/// Kind of record an [`ItemReport`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Project,
    Flow,
}

/// Outcome of one record, plus enough context to report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub kind: ItemKind,

    /// Server id, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name.
    pub name: String,

    /// Remote-store path involved.
    pub path: String,

    #[serde(flatten)]
    pub outcome: SyncOutcome,

    /// Remote state seen by a push before writing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteState>,

    /// Fingerprint of the canonical content written or compared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Server-side project the record ended up associated with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Non-fatal notices (reassociation, failed provisioning, ...).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ItemReport {
    pub fn new(kind: ItemKind, name: impl Into<String>, path: impl Into<String>, outcome: SyncOutcome) -> Self {
        Self {
            kind,
            id: None,
            name: name.into(),
            path: path.into(),
            outcome,
            remote: None,
            content_hash: None,
            project_id: None,
            warnings: Vec::new(),
        }
    }

    /// Report for a flow that failed before any decision could be made.
    pub fn flow_error(name: impl Into<String>, path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::new(ItemKind::Flow, name, path, SyncOutcome::Error(reason.to_string()))
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Aggregate result of a project-wide push or pull.
///
/// Per-item failures live in `items`; a batch never fails as a whole
/// because one member did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Project metadata outcome, when the batch handled it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ItemReport>,

    /// Per-flow outcomes in processing order.
    pub items: Vec<ItemReport>,
}

impl BatchResult {
    /// Number of flows created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Created))
    }

    /// Number of flows updated.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Updated))
    }

    /// Created plus updated.
    #[must_use]
    pub fn written(&self) -> usize {
        self.count(SyncOutcome::is_written)
    }

    /// Number of flows skipped for any reason.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(SyncOutcome::is_skipped)
    }

    /// Number of flows that failed.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.count(SyncOutcome::is_error)
    }

    /// Number of flows processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no flow failed (the project entry is not counted).
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors() == 0
    }

    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

/// Whether the pull engine may stop and ask the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionMode {
    /// Ask through [`Confirm`] at each decision point.
    #[default]
    Interactive,
    /// Never ask: version mismatches skip, reassociation proceeds.
    Silent,
}

/// A question that must be answered before mutating the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// The flow was last tested on a different server version.
    VersionMismatch {
        flow_name: String,
        recorded: String,
        live: String,
    },
    /// The flow exists on the server under a different project.
    Reassociate {
        flow_name: String,
        from: Option<String>,
        to: Option<String>,
    },
    /// A server record is about to be deleted.
    Delete { kind: ItemKind, id: String },
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch {
                flow_name,
                recorded,
                live,
            } => write!(
                f,
                "Flow '{flow_name}' was tested with version {recorded}, server is {live}. Continue with flow pull?"
            ),
            Self::Reassociate { flow_name, from, to } => write!(
                f,
                "Flow '{flow_name}' will move from project {} to {}. Continue with flow pull?",
                from.as_deref().unwrap_or("(none)"),
                to.as_deref().unwrap_or("(none)")
            ),
            Self::Delete { kind, id } => {
                let kind = match kind {
                    ItemKind::Project => "project",
                    ItemKind::Flow => "flow",
                };
                write!(f, "Delete {kind} '{id}' from the server? This cannot be undone.")
            }
        }
    }
}

/// Interactive confirmation callback.
pub trait Confirm {
    /// Return `true` to proceed.
    fn confirm(&self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&Prompt) -> bool,
{
    fn confirm(&self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

impl Confirm for Always {
    fn confirm(&self, _prompt: &Prompt) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(outcome: SyncOutcome) -> ItemReport {
        ItemReport::new(ItemKind::Flow, "f", "projects/p/f_1.json", outcome)
    }

    #[test]
    fn test_batch_counts() {
        let batch = BatchResult {
            project: Some(ItemReport::new(
                ItemKind::Project,
                "p",
                "projects/p/project.json",
                SyncOutcome::Error("boom".into()),
            )),
            items: vec![
                flow(SyncOutcome::Created),
                flow(SyncOutcome::Updated),
                flow(SyncOutcome::SkippedUnchanged),
                flow(SyncOutcome::SkippedVersionMismatch),
                flow(SyncOutcome::Error("x".into())),
            ],
        };

        assert_eq!(batch.created(), 1);
        assert_eq!(batch.updated(), 1);
        assert_eq!(batch.written(), 2);
        assert_eq!(batch.skipped(), 2);
        assert_eq!(batch.errors(), 1);
        assert_eq!(batch.total(), 5);
        assert!(!batch.is_clean());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(flow(SyncOutcome::Error("bad".into()))).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["reason"], "bad");

        let json = serde_json::to_value(flow(SyncOutcome::SkippedUnchanged)).unwrap();
        assert_eq!(json["status"], "skipped_unchanged");
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn test_closure_confirm() {
        let no = |_: &Prompt| false;
        let prompt = Prompt::Reassociate {
            flow_name: "f".into(),
            from: Some("1".into()),
            to: None,
        };
        assert!(!no.confirm(&prompt));
        assert!(Always(true).confirm(&prompt));
        assert!(prompt.to_string().contains("(none)"));
    }
}
