//! In-process remote store.
//!
//! Files are kept per branch in sorted maps; directories are implied by
//! paths. Every successful write is counted and recorded as a commit so
//! tests can assert idempotence.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::{
    Commit, EntryKind, PullRequest, PullRequestDraft, RemoteEntry, RemoteRepository, RemoteStore,
};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Branch {
    files: BTreeMap<String, String>,
    commits: Vec<Commit>,
}

/// A [`RemoteRepository`] held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    default_branch: String,
    branches: RefCell<BTreeMap<String, Branch>>,
    pulls: RefCell<Vec<PullRequest>>,
    failing_reads: RefCell<HashSet<String>>,
    failing_writes: RefCell<HashSet<String>>,
    writes: Cell<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("main")
    }
}

impl MemoryStore {
    /// Empty store with a single (default) branch.
    #[must_use]
    pub fn new(default_branch: &str) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert(default_branch.to_string(), Branch::default());
        Self {
            default_branch: default_branch.to_string(),
            branches: RefCell::new(branches),
            pulls: RefCell::new(Vec::new()),
            failing_reads: RefCell::new(HashSet::new()),
            failing_writes: RefCell::new(HashSet::new()),
            writes: Cell::new(0),
        }
    }

    /// Seed a file without counting a write. Creates the branch if needed.
    pub fn insert(&self, branch: &str, path: &str, content: &str) {
        self.branches
            .borrow_mut()
            .entry(branch.to_string())
            .or_default()
            .files
            .insert(normalize(path), content.to_string());
    }

    /// Current content of a file, if present.
    #[must_use]
    pub fn read(&self, branch: &str, path: &str) -> Option<String> {
        self.branches
            .borrow()
            .get(branch)
            .and_then(|b| b.files.get(&normalize(path)).cloned())
    }

    /// All file paths on a branch.
    #[must_use]
    pub fn paths(&self, branch: &str) -> Vec<String> {
        self.branches
            .borrow()
            .get(branch)
            .map(|b| b.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of successful `put_file` calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make `get_file` on `path` fail with a server error.
    pub fn fail_reads_of(&self, path: &str) {
        self.failing_reads.borrow_mut().insert(normalize(path));
    }

    /// Make `put_file` on `path` fail with a server error.
    pub fn fail_writes_to(&self, path: &str) {
        self.failing_writes.borrow_mut().insert(normalize(path));
    }

    fn with_branch<T>(&self, name: &str, f: impl FnOnce(&Branch) -> T) -> Result<T> {
        let branches = self.branches.borrow();
        let branch = branches.get(name).ok_or_else(|| Error::BranchNotFound {
            name: name.to_string(),
            available: branches.keys().cloned().collect(),
        })?;
        Ok(f(branch))
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

fn server_error(path: &str) -> Error {
    Error::Api {
        status: 500,
        message: format!("injected failure for {path}"),
    }
}

impl RemoteStore for MemoryStore {
    fn file_exists(&self, path: &str, branch: &str) -> Result<bool> {
        let path = normalize(path);
        self.with_branch(branch, |b| b.files.contains_key(&path))
    }

    fn get_file(&self, path: &str, branch: &str) -> Result<String> {
        let path = normalize(path);
        if self.failing_reads.borrow().contains(&path) {
            return Err(server_error(&path));
        }
        self.with_branch(branch, |b| b.files.get(&path).cloned())?
            .ok_or(Error::FileNotFound { path })
    }

    fn put_file(&self, path: &str, content: &str, message: &str, branch: &str) -> Result<()> {
        let path = normalize(path);
        if self.failing_writes.borrow().contains(&path) {
            return Err(server_error(&path));
        }
        let mut branches = self.branches.borrow_mut();
        let available: Vec<String> = branches.keys().cloned().collect();
        let target = branches
            .get_mut(branch)
            .ok_or_else(|| Error::BranchNotFound {
                name: branch.to_string(),
                available,
            })?;
        target.files.insert(path, content.to_string());
        let sha = format!("{:07x}", self.writes.get() + 1);
        target.commits.insert(
            0,
            Commit {
                sha,
                message: message.to_string(),
                author: None,
            },
        );
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<RemoteEntry>> {
        let dir = normalize(path);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        let branches = self.branches.borrow();
        let Some(b) = branches.get(branch) else {
            return Ok(Vec::new());
        };

        let mut dirs = BTreeSet::new();
        let mut entries = Vec::new();
        for key in b.files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((sub, _)) => {
                    dirs.insert(sub.to_string());
                }
                None => entries.push(RemoteEntry {
                    name: rest.to_string(),
                    path: key.clone(),
                    kind: EntryKind::File,
                }),
            }
        }
        entries.extend(dirs.into_iter().map(|name| RemoteEntry {
            path: format!("{prefix}{name}"),
            name,
            kind: EntryKind::Dir,
        }));
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl RemoteRepository for MemoryStore {
    fn default_branch(&self) -> Result<String> {
        Ok(self.default_branch.clone())
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.branches.borrow().keys().cloned().collect())
    }

    fn create_branch(&self, name: &str, source: Option<&str>) -> Result<()> {
        let source = source.unwrap_or(&self.default_branch);
        let mut branches = self.branches.borrow_mut();
        if branches.contains_key(name) {
            return Err(Error::BranchExists {
                name: name.to_string(),
            });
        }
        let from = branches.get(source).ok_or_else(|| Error::BranchNotFound {
            name: source.to_string(),
            available: branches.keys().cloned().collect(),
        })?;
        let copy = Branch {
            files: from.files.clone(),
            commits: from.commits.clone(),
        };
        branches.insert(name.to_string(), copy);
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        if name == self.default_branch {
            return Err(Error::InvalidArgument(format!(
                "cannot delete default branch '{name}'"
            )));
        }
        let mut branches = self.branches.borrow_mut();
        if branches.remove(name).is_none() {
            return Err(Error::BranchNotFound {
                name: name.to_string(),
                available: branches.keys().cloned().collect(),
            });
        }
        Ok(())
    }

    fn recent_commits(&self, branch: &str, count: usize) -> Result<Vec<Commit>> {
        self.with_branch(branch, |b| b.commits.iter().take(count).cloned().collect())
    }

    fn find_pull_request(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        Ok(self
            .pulls
            .borrow()
            .iter()
            .find(|p| p.head == head && p.base == base)
            .cloned())
    }

    fn create_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequest> {
        if self.find_pull_request(&draft.head, &draft.base)?.is_some() {
            return Err(Error::PullRequestExists {
                head: draft.head.clone(),
                base: draft.base.clone(),
            });
        }
        let mut pulls = self.pulls.borrow_mut();
        let number = pulls.len() as u64 + 1;
        let pr = PullRequest {
            number,
            title: draft.title.clone(),
            url: format!("memory://pulls/{number}"),
            head: draft.head.clone(),
            base: draft.base.clone(),
            draft: draft.draft,
        };
        pulls.push(pr.clone());
        Ok(pr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let store = MemoryStore::default();
        assert!(!store.file_exists("a/b.json", "main").unwrap());
        store.put_file("a/b.json", "{}", "add", "main").unwrap();
        assert!(store.file_exists("a/b.json", "main").unwrap());
        assert_eq!(store.get_file("a/b.json", "main").unwrap(), "{}");
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = MemoryStore::default();
        let err = store.get_file("nope.json", "main").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_list_directory() {
        let store = MemoryStore::default();
        store.insert("main", "projects/Sales/project.json", "{}");
        store.insert("main", "projects/Sales/f_1.json", "{}");
        store.insert("main", "projects/Ops/project.json", "{}");
        store.insert("main", "README.md", "");

        let top = store.list_directory("projects", "main").unwrap();
        let names: Vec<_> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Ops", "Sales"]);
        assert!(top.iter().all(RemoteEntry::is_dir));
        assert_eq!(top[1].path, "projects/Sales");

        let sales = store.list_directory("projects/Sales", "main").unwrap();
        assert_eq!(sales.len(), 2);
        assert!(sales.iter().all(RemoteEntry::is_file));

        assert!(store.list_directory("missing", "main").unwrap().is_empty());
    }

    #[test]
    fn test_branches() {
        let store = MemoryStore::default();
        store.insert("main", "a.json", "1");
        store.create_branch("dev", None).unwrap();
        assert_eq!(store.read("dev", "a.json").as_deref(), Some("1"));
        assert!(matches!(
            store.create_branch("dev", None),
            Err(Error::BranchExists { .. })
        ));
        assert!(store.delete_branch("main").is_err());
        store.delete_branch("dev").unwrap();
        assert_eq!(store.list_branches().unwrap(), ["main"]);
    }

    #[test]
    fn test_commits_newest_first() {
        let store = MemoryStore::default();
        store.put_file("a", "1", "first", "main").unwrap();
        store.put_file("a", "2", "second", "main").unwrap();
        let commits = store.recent_commits("main", 10).unwrap();
        assert_eq!(commits[0].message, "second");
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn test_pull_request_exists() {
        let store = MemoryStore::default();
        let draft = PullRequestDraft {
            title: "t".into(),
            body: String::new(),
            head: "dev".into(),
            base: "main".into(),
            draft: false,
        };
        let pr = store.create_pull_request(&draft).unwrap();
        assert_eq!(pr.number, 1);
        assert!(matches!(
            store.create_pull_request(&draft),
            Err(Error::PullRequestExists { .. })
        ));
    }
}
