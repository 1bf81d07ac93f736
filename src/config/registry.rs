//! Profile and remote registry.
//!
//! Non-secret settings go to `config.json`; API keys and tokens go to
//! `credentials.json`, written with mode 0600 on unix. Every mutation is
//! persisted immediately with a write-to-temp-then-rename.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::remote::RemoteUrl;

const CONFIG_FILE: &str = "config.json";
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_profile: Option<String>,
    #[serde(default)]
    profiles: BTreeMap<String, UrlEntry>,
    #[serde(default)]
    remotes: BTreeMap<String, UrlEntry>,
    #[serde(default)]
    selection: BTreeMap<String, Selection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UrlEntry {
    url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Credentials {
    #[serde(default)]
    profiles: BTreeMap<String, String>,
    #[serde(default)]
    remotes: BTreeMap<String, String>,
}

/// A registered flow server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub name: String,
    pub url: String,
    #[serde(skip)]
    pub api_key: String,
}

/// A registered remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
    #[serde(skip)]
    pub token: String,
}

/// Remote and branch selected for a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Persistent registry of profiles, remotes and selections.
#[derive(Debug)]
pub struct Registry {
    dir: PathBuf,
    config: ConfigFile,
    credentials: Credentials,
}

impl Registry {
    /// Load the registry stored in `dir`. Missing files read as empty.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigFile` if a file exists but is not valid JSON.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let config = read_file(&dir.join(CONFIG_FILE))?;
        let credentials = read_file(&dir.join(CREDENTIALS_FILE))?;
        debug!(dir = %dir.display(), "registry loaded");
        Ok(Self {
            dir,
            config,
            credentials,
        })
    }

    /// Directory this registry is stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // ---- profiles ----

    /// Register or replace a profile. The first profile becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for a blank name or a non-http(s)
    /// URL, or an I/O error if the registry cannot be written.
    pub fn save_profile(&mut self, name: &str, url: &str, api_key: &str) -> Result<()> {
        validate_name("profile", name)?;
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidArgument(format!(
                "server URL must start with http:// or https://, got '{url}'"
            )));
        }

        self.config.profiles.insert(
            name.to_string(),
            UrlEntry {
                url: url.to_string(),
            },
        );
        if api_key.is_empty() {
            self.credentials.profiles.remove(name);
        } else {
            self.credentials
                .profiles
                .insert(name.to_string(), api_key.to_string());
        }
        if self.config.default_profile.is_none() {
            self.config.default_profile = Some(name.to_string());
        }
        self.save()
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileNotFound` if no such profile is registered.
    pub fn get_profile(&self, name: &str) -> Result<ConnectionInfo> {
        let entry = self
            .config
            .profiles
            .get(name)
            .ok_or_else(|| Error::ProfileNotFound {
                name: name.to_string(),
            })?;
        Ok(ConnectionInfo {
            name: name.to_string(),
            url: entry.url.clone(),
            api_key: self
                .credentials
                .profiles
                .get(name)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// All profiles, sorted by name.
    #[must_use]
    pub fn list_profiles(&self) -> Vec<ConnectionInfo> {
        self.config
            .profiles
            .keys()
            .filter_map(|name| self.get_profile(name).ok())
            .collect()
    }

    /// Remove a profile with its key and selection.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileNotFound` if no such profile is registered.
    pub fn delete_profile(&mut self, name: &str) -> Result<()> {
        if self.config.profiles.remove(name).is_none() {
            return Err(Error::ProfileNotFound {
                name: name.to_string(),
            });
        }
        self.credentials.profiles.remove(name);
        self.config.selection.remove(name);
        if self.config.default_profile.as_deref() == Some(name) {
            self.config.default_profile = None;
        }
        self.save()
    }

    #[must_use]
    pub fn default_profile(&self) -> Option<&str> {
        self.config.default_profile.as_deref()
    }

    /// Make `name` the default profile.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileNotFound` if no such profile is registered.
    pub fn set_default_profile(&mut self, name: &str) -> Result<()> {
        self.get_profile(name)?;
        self.config.default_profile = Some(name.to_string());
        self.save()
    }

    /// The explicitly named profile, or the default one.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoProfileSelected` when neither exists, or
    /// `Error::ProfileNotFound` for an unknown name.
    pub fn resolve_profile(&self, explicit: Option<&str>) -> Result<ConnectionInfo> {
        let name = explicit
            .or(self.default_profile())
            .ok_or(Error::NoProfileSelected)?;
        self.get_profile(name)
    }

    // ---- remotes ----

    /// Register or replace a remote repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRemoteUrl` for an unrecognized URL and
    /// `Error::InvalidArgument` for a blank name or token.
    pub fn add_remote(&mut self, name: &str, url: &str, token: &str) -> Result<()> {
        validate_name("remote", name)?;
        RemoteUrl::parse(url)?;
        if token.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "an access token is required for a remote".to_string(),
            ));
        }
        self.config.remotes.insert(
            name.to_string(),
            UrlEntry {
                url: url.trim().to_string(),
            },
        );
        self.credentials
            .remotes
            .insert(name.to_string(), token.trim().to_string());
        self.save()
    }

    /// Look up a remote by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteNotFound` if no such remote is registered.
    pub fn get_remote(&self, name: &str) -> Result<RemoteInfo> {
        let entry = self
            .config
            .remotes
            .get(name)
            .ok_or_else(|| Error::RemoteNotFound {
                name: name.to_string(),
            })?;
        Ok(RemoteInfo {
            name: name.to_string(),
            url: entry.url.clone(),
            token: self
                .credentials
                .remotes
                .get(name)
                .cloned()
                .unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn list_remotes(&self) -> Vec<RemoteInfo> {
        self.config
            .remotes
            .keys()
            .filter_map(|name| self.get_remote(name).ok())
            .collect()
    }

    /// Remove a remote and unselect it everywhere.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteNotFound` if no such remote is registered.
    pub fn remove_remote(&mut self, name: &str) -> Result<()> {
        if self.config.remotes.remove(name).is_none() {
            return Err(Error::RemoteNotFound {
                name: name.to_string(),
            });
        }
        self.credentials.remotes.remove(name);
        for selection in self.config.selection.values_mut() {
            if selection.remote.as_deref() == Some(name) {
                *selection = Selection::default();
            }
        }
        self.save()
    }

    /// Replace the token stored for a remote.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteNotFound` for an unknown remote and
    /// `Error::InvalidArgument` for a blank token.
    pub fn set_remote_token(&mut self, name: &str, token: &str) -> Result<()> {
        self.get_remote(name)?;
        if token.trim().is_empty() {
            return Err(Error::InvalidArgument("token cannot be empty".to_string()));
        }
        self.credentials
            .remotes
            .insert(name.to_string(), token.trim().to_string());
        self.save()
    }

    // ---- selection ----

    /// Select `remote` for `profile`. Switching remotes clears the branch.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown profile or remote.
    pub fn set_current_remote(&mut self, profile: &str, remote: &str) -> Result<()> {
        self.get_profile(profile)?;
        self.get_remote(remote)?;
        let selection = self.config.selection.entry(profile.to_string()).or_default();
        if selection.remote.as_deref() != Some(remote) {
            selection.remote = Some(remote.to_string());
            selection.branch = None;
        }
        self.save()
    }

    /// Select `branch` for `profile`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileNotFound` for an unknown profile.
    pub fn set_current_branch(&mut self, profile: &str, branch: &str) -> Result<()> {
        self.get_profile(profile)?;
        self.config
            .selection
            .entry(profile.to_string())
            .or_default()
            .branch = Some(branch.to_string());
        self.save()
    }

    /// Set remote and branch together; `None` leaves a part unchanged.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown profile or remote.
    pub fn set_current(
        &mut self,
        profile: &str,
        remote: Option<&str>,
        branch: Option<&str>,
    ) -> Result<()> {
        if let Some(remote) = remote {
            self.set_current_remote(profile, remote)?;
        }
        if let Some(branch) = branch {
            self.set_current_branch(profile, branch)?;
        }
        Ok(())
    }

    /// Current selection for `profile` (empty when nothing is selected).
    #[must_use]
    pub fn current(&self, profile: &str) -> Selection {
        self.config
            .selection
            .get(profile)
            .cloned()
            .unwrap_or_default()
    }

    fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_file(
            &self.dir.join(CONFIG_FILE),
            &serde_json::to_string_pretty(&self.config)?,
            false,
        )?;
        write_file(
            &self.dir.join(CREDENTIALS_FILE),
            &serde_json::to_string_pretty(&self.credentials)?,
            true,
        )?;
        debug!(dir = %self.dir.display(), "registry saved");
        Ok(())
    }
}

fn validate_name(what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidArgument(format!(
            "{what} name must be non-empty and contain no whitespace, got '{name}'"
        )));
    }
    Ok(())
}

fn read_file<T: Default + DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&text).map_err(|source| Error::ConfigFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a temp file then rename over `path`.
fn write_file(path: &Path, contents: &str, private: bool) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    {
        let mut opts = fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        if private {
            opts.mode(0o600);
        }
        #[cfg(not(unix))]
        let _ = private;
        let mut file = opts.open(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
