//! Repository URL parsing.

use std::fmt;

use crate::error::{Error, Result};

const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API: &str = "https://api.github.com";

/// A hosted repository, parsed from an HTTPS or SSH clone URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl RemoteUrl {
    /// Parse one of:
    ///
    /// - `https://<host>/<owner>/<repo>[.git][/]` (or `http://`)
    /// - `git@<host>:<owner>/<repo>[.git]`
    /// - `ssh://git@<host>/<owner>/<repo>[.git]`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRemoteUrl` for anything else.
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        let invalid = || Error::InvalidRemoteUrl(trimmed.to_string());

        let (host, path) = if let Some(rest) = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
        {
            rest.split_once('/').ok_or_else(invalid)?
        } else if let Some(rest) = trimmed.strip_prefix("ssh://git@") {
            rest.split_once(['/', ':']).ok_or_else(invalid)?
        } else if let Some(rest) = trimmed.strip_prefix("git@") {
            rest.split_once([':', '/']).ok_or_else(invalid)?
        } else {
            return Err(invalid());
        };

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repo) = path.split_once('/').ok_or_else(invalid)?;

        let valid = |s: &str| !s.is_empty() && !s.contains('/');
        if host.is_empty() || !valid(owner) || !valid(repo) {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Base URL of the REST API serving this repository.
    ///
    /// Enterprise hosts serve the API under `/api/v3`.
    #[must_use]
    pub fn api_base(&self) -> String {
        if self.host == PUBLIC_HOST {
            PUBLIC_API.to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }

    /// `owner/repo`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://{}/{}/{}", self.host, self.owner, self.repo)
    }
}
