//! Remote document store.
//!
//! The sync engines read and write the remote through [`RemoteStore`]:
//! branch-scoped, path-addressed files. Branch and pull-request plumbing
//! used by the `git` commands lives on [`RemoteRepository`].
//!
//! - [`GitHubClient`]: GitHub REST API (github.com or Enterprise)
//! - `MemoryStore`: in-process store, compiled for unit tests only

mod github;
#[cfg(test)]
pub mod memory;
mod url;

pub use github::GitHubClient;
#[cfg(test)]
pub use memory::MemoryStore;
pub use url::RemoteUrl;

use serde::Serialize;

use crate::error::Result;

/// Directory entry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteEntry {
    /// Last path component.
    pub name: String,
    /// Full path from the repository root.
    pub path: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A commit on a branch, newest first in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Commit {
    /// First line of the message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// An open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

/// Parameters for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

impl PullRequestDraft {
    /// Title derived from a branch name: `feature/add-flows` → `Feature/Add Flows`.
    #[must_use]
    pub fn title_from_branch(branch: &str) -> String {
        branch
            .replace(['_', '-'], " ")
            .split(' ')
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Body listing the first line of each recent commit.
    #[must_use]
    pub fn body_from_commits(branch: &str, commits: &[Commit]) -> String {
        if commits.is_empty() {
            return format!("Pull request from branch `{branch}`");
        }
        let mut body = String::from("## Changes\n");
        for commit in commits {
            body.push_str("\n- ");
            body.push_str(commit.summary());
        }
        body
    }
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_start = true;
    for c in word.chars() {
        if at_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_start = !c.is_alphanumeric();
    }
    out
}

/// Branch-scoped file access.
///
/// "Not found" is recoverable: `file_exists` answers `false` and
/// `list_directory` answers an empty list. Everything else propagates.
pub trait RemoteStore {
    /// Whether a file exists at `path` on `branch`.
    fn file_exists(&self, path: &str, branch: &str) -> Result<bool>;

    /// File content as UTF-8 text.
    ///
    /// # Errors
    ///
    /// `Error::FileNotFound` when there is no file at `path`.
    fn get_file(&self, path: &str, branch: &str) -> Result<String>;

    /// Create or overwrite a file as one commit.
    fn put_file(&self, path: &str, content: &str, message: &str, branch: &str) -> Result<()>;

    /// Entries directly under `path`; empty if the directory does not exist.
    fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<RemoteEntry>>;
}

/// Repository-level operations on top of file access.
pub trait RemoteRepository: RemoteStore {
    /// Name of the repository's default branch.
    fn default_branch(&self) -> Result<String>;

    /// All branch names.
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Create `name` at the head of `source` (default branch when `None`).
    ///
    /// # Errors
    ///
    /// `Error::BranchExists` when `name` already exists.
    fn create_branch(&self, name: &str, source: Option<&str>) -> Result<()>;

    /// Delete a branch. The default branch is never deleted.
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Up to `count` most recent commits on `branch`.
    fn recent_commits(&self, branch: &str, count: usize) -> Result<Vec<Commit>>;

    /// The open pull request from `head` into `base`, if any.
    fn find_pull_request(&self, head: &str, base: &str) -> Result<Option<PullRequest>>;

    /// Open a pull request.
    ///
    /// # Errors
    ///
    /// `Error::PullRequestExists` when one is already open for the pair.
    fn create_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequest>;
}
