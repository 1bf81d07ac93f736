//! Configuration management.
//!
//! All state lives in one directory:
//! - `config.json`: profiles, remotes and the per-profile selection
//! - `credentials.json`: API keys and tokens (owner-only on unix)
//!
//! The directory is resolved once per invocation by [`resolve_config_dir`].

mod registry;

pub use registry::{ConnectionInfo, Registry, RemoteInfo, Selection};

use crate::error::{Error, Result};

use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration directory.
pub const HOME_ENV: &str = "FLOWSYNC_HOME";

/// Get the global configuration directory (`~/.flowsync`).
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".flowsync"))
}

/// Resolve the configuration directory.
///
/// Priority:
/// 1. `explicit` (the `--config-dir` flag)
/// 2. `FLOWSYNC_HOME` environment variable
/// 3. `~/.flowsync`
///
/// # Errors
///
/// Returns `Error::Config` if no home directory can be determined.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    global_config_dir()
        .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))
}

/// Open the registry in the resolved configuration directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be resolved or a file in it
/// is unreadable.
pub fn open_registry(explicit: Option<&Path>) -> Result<Registry> {
    Registry::open(resolve_config_dir(explicit)?)
}
