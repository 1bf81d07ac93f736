//! Per-invocation state shared by command handlers.

use tracing::debug;

use crate::api::LangflowClient;
use crate::cli::Cli;
use crate::config::{self, ConnectionInfo, Registry, RemoteInfo};
use crate::error::{Error, Result};
use crate::remote::GitHubClient;

/// The registry plus the global flags that affect every command.
pub struct Context {
    pub registry: Registry,
    pub profile: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

/// A connected remote repository and the branch to work on.
pub struct Target {
    pub remote: RemoteInfo,
    pub client: GitHubClient,
    pub branch: String,
}

impl Context {
    /// Open the registry named by `--config-dir` or its defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be loaded.
    pub fn open(cli: &Cli, json: bool) -> Result<Self> {
        Ok(Self {
            registry: config::open_registry(cli.config_dir.as_deref())?,
            profile: cli.profile.clone(),
            json,
            quiet: cli.quiet,
        })
    }

    /// The active profile.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoProfileSelected` or `Error::ProfileNotFound`.
    pub fn connection(&self) -> Result<ConnectionInfo> {
        self.registry.resolve_profile(self.profile.as_deref())
    }

    /// Name of the active profile.
    ///
    /// # Errors
    ///
    /// Same as [`Context::connection`].
    pub fn profile_name(&self) -> Result<String> {
        self.connection().map(|c| c.name)
    }

    /// HTTP client for the active profile's server.
    ///
    /// # Errors
    ///
    /// Returns an error if no profile resolves or the URL is invalid.
    pub fn server(&self) -> Result<LangflowClient> {
        let connection = self.connection()?;
        debug!(profile = %connection.name, url = %connection.url, "connecting to server");
        LangflowClient::new(&connection.url, connection.api_key)
    }

    /// Registered remote named by `explicit`, or the profile's selection.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoRemoteSelected` when nothing is selected.
    pub fn remote(&self, explicit: Option<&str>) -> Result<(RemoteInfo, GitHubClient)> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => {
                let profile = self.profile_name()?;
                self.registry
                    .current(&profile)
                    .remote
                    .ok_or(Error::NoRemoteSelected { profile })?
            }
        };
        let remote = self.registry.get_remote(&name)?;
        let client = GitHubClient::new(&remote.url, remote.token.clone())?;
        Ok((remote, client))
    }

    /// Remote plus branch for a sync command.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoBranchSelected` when no branch is given or selected.
    pub fn target(&self, remote: Option<&str>, branch: Option<&str>) -> Result<Target> {
        let (remote, client) = self.remote(remote)?;
        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => {
                let profile = self.profile_name()?;
                self.registry
                    .current(&profile)
                    .branch
                    .ok_or(Error::NoBranchSelected { profile })?
            }
        };
        Ok(Target {
            remote,
            client,
            branch,
        })
    }

    /// Print a human line unless `--quiet` or `--json` is active.
    pub fn say(&self, line: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            println!("{line}");
        }
    }
}
