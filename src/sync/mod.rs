//! Flow/project sync between a flow server and a remote file tree.
//!
//! - **Push**: server records → pretty JSON documents, written only when
//!   their canonical form differs from what the remote holds
//! - **Pull**: remote documents → server records, with project
//!   auto-provisioning and a version gate
//! - **Paths**: deterministic `projects/<Project>/<Flow>_<id>.json` layout
//!
//! # Layout
//!
//! ```text
//! projects/
//!   Sales/
//!     project.json
//!     My_Flow_42.json
//!   _no_project/
//!     Orphan_43.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use flowsync::sync::{Pusher, Puller, report};
//!
//! let batch = Pusher::new(&server, &store, "main").push_project("7", false)?;
//! report::print_batch("Push", &batch);
//!
//! let pulled = Puller::new(&server, &store, "main", &confirm)
//!     .pull_path("projects/Sales/My_Flow_42.json", None, None)?;
//! ```

mod hash;
mod paths;
mod pull;
mod push;
pub mod report;
mod sanitize;
mod types;
mod version;

pub use hash::{canonical, content_hash, unchanged};
pub use paths::{
    NO_PROJECT, PROJECT_FILE, PROJECTS_ROOT, flow_file_path, folder_segment, is_flow_document,
    project_file_path, project_folder,
};
pub use pull::{FlowPull, ProjectResolution, Puller};
pub use push::Pusher;
pub use sanitize::{DEFAULT_MAX_LENGTH, sanitize, sanitize_with_limit};
pub use types::{
    Always, BatchResult, Confirm, ItemKind, ItemReport, Prompt, RemoteState, SyncOutcome,
    VersionMode,
};
pub use version::{GateDecision, VersionGate};
