//! Error types for flowsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 6=remote, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flowsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    ProfileNotFound,
    RemoteNotFound,
    ProjectNotFound,
    FlowNotFound,
    FileNotFound,
    BranchNotFound,

    // Validation (exit 4)
    InvalidArgument,
    InvalidRemoteUrl,
    NoProfileSelected,
    NoRemoteSelected,
    NoBranchSelected,

    // Conflict (exit 5)
    BranchExists,
    PullRequestExists,

    // Sync (exit 6)
    MalformedContent,
    SyncFailed,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Network / server (exit 9)
    ApiError,
    HttpError,

    // Internal (exit 1)
    Aborted,
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::RemoteNotFound => "REMOTE_NOT_FOUND",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::FlowNotFound => "FLOW_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::BranchNotFound => "BRANCH_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidRemoteUrl => "INVALID_REMOTE_URL",
            Self::NoProfileSelected => "NO_PROFILE_SELECTED",
            Self::NoRemoteSelected => "NO_REMOTE_SELECTED",
            Self::NoBranchSelected => "NO_BRANCH_SELECTED",
            Self::BranchExists => "BRANCH_EXISTS",
            Self::PullRequestExists => "PULL_REQUEST_EXISTS",
            Self::MalformedContent => "MALFORMED_CONTENT",
            Self::SyncFailed => "SYNC_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ApiError => "API_ERROR",
            Self::HttpError => "HTTP_ERROR",
            Self::Aborted => "ABORTED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Aborted | Self::InternalError => 1,
            Self::ProfileNotFound
            | Self::RemoteNotFound
            | Self::ProjectNotFound
            | Self::FlowNotFound
            | Self::FileNotFound
            | Self::BranchNotFound => 3,
            Self::InvalidArgument
            | Self::InvalidRemoteUrl
            | Self::NoProfileSelected
            | Self::NoRemoteSelected
            | Self::NoBranchSelected => 4,
            Self::BranchExists | Self::PullRequestExists => 5,
            Self::MalformedContent | Self::SyncFailed => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::ApiError | Self::HttpError => 9,
        }
    }

    /// Whether re-running with corrected input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::InvalidRemoteUrl
                | Self::NoProfileSelected
                | Self::NoRemoteSelected
                | Self::NoBranchSelected
                | Self::HttpError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in flowsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Profile not found: {name}")]
    ProfileNotFound { name: String },

    #[error("Remote not found: {name}")]
    RemoteNotFound { name: String },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    #[error("Flow not found: {id}")]
    FlowNotFound { id: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Branch '{name}' not found")]
    BranchNotFound {
        name: String,
        /// Branches that do exist, for hint display.
        available: Vec<String>,
    },

    #[error("Branch '{name}' already exists")]
    BranchExists { name: String },

    #[error("Pull request from '{head}' to '{base}' already exists")]
    PullRequestExists { head: String, base: String },

    #[error("No profile selected")]
    NoProfileSelected,

    #[error("No remote selected for profile '{profile}'")]
    NoRemoteSelected { profile: String },

    #[error("No branch selected for profile '{profile}'")]
    NoBranchSelected { profile: String },

    #[error("Invalid remote URL: {0}")]
    InvalidRemoteUrl(String),

    #[error("Malformed content at {path}: {message}")]
    MalformedContent { path: String, message: String },

    #[error("Sync failed for {name}: {reason}")]
    SyncFailed { name: String, reason: String },

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file unreadable: {}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Aborted: {0}")]
    Aborted(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ProfileNotFound { .. } => ErrorCode::ProfileNotFound,
            Self::RemoteNotFound { .. } => ErrorCode::RemoteNotFound,
            Self::ProjectNotFound { .. } => ErrorCode::ProjectNotFound,
            Self::FlowNotFound { .. } => ErrorCode::FlowNotFound,
            Self::FileNotFound { .. } => ErrorCode::FileNotFound,
            Self::BranchNotFound { .. } => ErrorCode::BranchNotFound,
            Self::BranchExists { .. } => ErrorCode::BranchExists,
            Self::PullRequestExists { .. } => ErrorCode::PullRequestExists,
            Self::NoProfileSelected => ErrorCode::NoProfileSelected,
            Self::NoRemoteSelected { .. } => ErrorCode::NoRemoteSelected,
            Self::NoBranchSelected { .. } => ErrorCode::NoBranchSelected,
            Self::InvalidRemoteUrl(_) => ErrorCode::InvalidRemoteUrl,
            Self::MalformedContent { .. } => ErrorCode::MalformedContent,
            Self::SyncFailed { .. } => ErrorCode::SyncFailed,
            Self::Api { .. } => ErrorCode::ApiError,
            Self::Http(_) => ErrorCode::HttpError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) | Self::ConfigFile { .. } => ErrorCode::ConfigError,
            Self::Aborted(_) => ErrorCode::Aborted,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// True for the recoverable "does not exist" family.
    ///
    /// A 404 from either API counts, whether it was mapped to a typed
    /// variant or surfaced as a raw `Api` status.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. }
                | Self::FlowNotFound { .. }
                | Self::FileNotFound { .. }
                | Self::BranchNotFound { .. }
                | Self::Api { status: 404, .. }
        )
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NoProfileSelected => Some(
                "Register one with: flowsync env register <name> --url <url> --api-key <key>"
                    .to_string(),
            ),
            Self::ProfileNotFound { name } => Some(format!(
                "No profile named '{name}'. Use `flowsync env list` to see registered profiles."
            )),
            Self::NoRemoteSelected { .. } => {
                Some("Select one with: flowsync git remote select <name>".to_string())
            }
            Self::RemoteNotFound { name } => Some(format!(
                "No remote named '{name}'. Use `flowsync git remote list` to see registered remotes."
            )),
            Self::NoBranchSelected { .. } => {
                Some("Select one with: flowsync git checkout <branch>".to_string())
            }
            Self::BranchNotFound { available, .. } if !available.is_empty() => {
                Some(format!("Available branches: {}", available.join(", ")))
            }
            Self::BranchNotFound { .. } => None,
            Self::BranchExists { name } => Some(format!(
                "Switch to it instead: flowsync git checkout {name}"
            )),
            Self::FlowNotFound { id } => Some(format!(
                "No flow with ID '{id}'. Use `flowsync flows list` to see available flows."
            )),
            Self::ProjectNotFound { id } => Some(format!(
                "No project matching '{id}'. Use `flowsync projects list` to see available projects."
            )),
            Self::InvalidRemoteUrl(_) => Some(
                "Expected https://<host>/<owner>/<repo> or git@<host>:<owner>/<repo>.git"
                    .to_string(),
            ),
            Self::Api { status: 401 | 403, .. } => {
                Some("Check the API key or token stored for this profile/remote.".to_string())
            }
            Self::Aborted(_) => Some("Pass --yes to skip the confirmation.".to_string()),
            Self::ConfigFile { path, .. } => Some(format!(
                "Fix or remove {} and re-register.",
                path.display()
            )),
            Self::FileNotFound { .. }
            | Self::PullRequestExists { .. }
            | Self::MalformedContent { .. }
            | Self::SyncFailed { .. }
            | Self::Api { .. }
            | Self::Http(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert!(Error::FlowNotFound { id: "1".into() }.is_not_found());
        assert!(Error::FileNotFound { path: "a".into() }.is_not_found());
        assert!(
            Error::Api {
                status: 404,
                message: "gone".into()
            }
            .is_not_found()
        );
        assert!(
            !Error::Api {
                status: 500,
                message: "boom".into()
            }
            .is_not_found()
        );
        assert!(!Error::BranchExists { name: "x".into() }.is_not_found());
    }

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::NoProfileSelected.exit_code(), 4);
        assert_eq!(Error::ProjectNotFound { id: "7".into() }.exit_code(), 3);
        assert_eq!(Error::BranchExists { name: "dev".into() }.exit_code(), 5);
        assert_eq!(Error::Aborted("flow not deleted".into()).exit_code(), 1);
        assert_eq!(
            Error::Api {
                status: 500,
                message: String::new()
            }
            .exit_code(),
            9
        );
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::BranchNotFound {
            name: "feature".into(),
            available: vec!["main".into(), "dev".into()],
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "BRANCH_NOT_FOUND");
        assert_eq!(json["error"]["hint"], "Available branches: main, dev");
    }
}
