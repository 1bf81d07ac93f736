//! GitHub REST API client.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::url::RemoteUrl;
use super::{
    Commit, EntryKind, PullRequest, PullRequestDraft, RemoteEntry, RemoteRepository, RemoteStore,
};
use crate::error::{Error, Result};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: usize = 100;
const TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for one repository, authenticated with a token.
pub struct GitHubClient {
    http: Client,
    api: Url,
    remote: RemoteUrl,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// The contents endpoint returns an array for directories, an object for files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Contents {
    Dir(Vec<ContentEntry>),
    File(ContentFile),
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct BranchInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    #[serde(default)]
    author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullInfo {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    draft: bool,
    head: PullRef,
    base: PullRef,
}

#[derive(Debug, Deserialize)]
struct PullRef {
    #[serde(rename = "ref")]
    name: String,
}

impl From<PullInfo> for PullRequest {
    fn from(p: PullInfo) -> Self {
        Self {
            number: p.number,
            title: p.title,
            url: p.html_url,
            head: p.head.name,
            base: p.base.name,
            draft: p.draft,
        }
    }
}

impl GitHubClient {
    /// Create a client for the repository at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a recognised repository URL or
    /// the HTTP client cannot be built.
    pub fn new(url: &str, token: impl Into<String>) -> Result<Self> {
        let remote = RemoteUrl::parse(url)?;
        let api = Url::parse(&remote.api_base())
            .map_err(|e| Error::InvalidRemoteUrl(format!("{url}: {e}")))?;
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Config(format!(
                "a token is required to access {}",
                remote.slug()
            )));
        }
        let http = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("flowsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api,
            remote,
            token,
        })
    }

    /// The repository this client talks to.
    #[must_use]
    pub fn remote(&self) -> &RemoteUrl {
        &self.remote
    }

    /// `<api>/repos/<owner>/<repo>/<segments...>`
    fn repo_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.api.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidRemoteUrl(self.api.to_string()))?
            .pop_if_empty()
            .extend(["repos", self.remote.owner.as_str(), self.remote.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url> {
        let parts = path.trim_matches('/').split('/').filter(|p| !p.is_empty());
        self.repo_url(std::iter::once("contents").chain(parts))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "github");
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Send and return the response when the status is a success.
    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        Ok(self.send(self.request(Method::GET, url))?.json()?)
    }

    /// Contents lookup that maps 404 to `None`.
    fn contents(&self, path: &str, branch: &str) -> Result<Option<Contents>> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", branch);
        match self.get_json(url) {
            Ok(contents) => Ok(Some(contents)),
            Err(Error::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn file_sha(&self, path: &str, branch: &str) -> Result<Option<String>> {
        match self.contents(path, branch)? {
            Some(Contents::File(file)) => Ok(Some(file.sha)),
            _ => Ok(None),
        }
    }

    fn branch_head(&self, branch: &str) -> Result<String> {
        let url = self.repo_url(["git", "ref", "heads"].into_iter().chain(branch.split('/')))?;
        match self.get_json::<GitRef>(url) {
            Ok(r) => Ok(r.object.sha),
            Err(Error::Api { status: 404, .. }) => Err(Error::BranchNotFound {
                name: branch.to_string(),
                available: Vec::new(),
            }),
            Err(e) => Err(e),
        }
    }
}

impl RemoteStore for GitHubClient {
    fn file_exists(&self, path: &str, branch: &str) -> Result<bool> {
        Ok(matches!(self.contents(path, branch)?, Some(Contents::File(_))))
    }

    fn get_file(&self, path: &str, branch: &str) -> Result<String> {
        let not_found = || Error::FileNotFound {
            path: path.to_string(),
        };
        let Some(Contents::File(file)) = self.contents(path, branch)? else {
            return Err(not_found());
        };
        decode_content(path, &file)
    }

    fn put_file(&self, path: &str, content: &str, message: &str, branch: &str) -> Result<()> {
        let sha = self.file_sha(path, branch)?;
        let mut body = json!({
            "message": message,
            "content": STANDARD.encode(content.as_bytes()),
            "branch": branch,
        });
        if let Some(sha) = &sha {
            body["sha"] = Value::String(sha.clone());
        }
        debug!(path, branch, update = sha.is_some(), "writing file");
        let url = self.contents_url(path)?;
        self.send(self.request(Method::PUT, url).json(&body))?;
        Ok(())
    }

    fn list_directory(&self, path: &str, branch: &str) -> Result<Vec<RemoteEntry>> {
        let entries = match self.contents(path, branch)? {
            Some(Contents::Dir(entries)) => entries,
            Some(Contents::File(_)) | None => return Ok(Vec::new()),
        };
        Ok(entries
            .into_iter()
            .filter_map(|e| {
                let kind = match e.kind.as_str() {
                    "file" => EntryKind::File,
                    "dir" => EntryKind::Dir,
                    _ => return None,
                };
                Some(RemoteEntry {
                    name: e.name,
                    path: e.path,
                    kind,
                })
            })
            .collect())
    }
}

impl RemoteRepository for GitHubClient {
    fn default_branch(&self) -> Result<String> {
        let url = self.repo_url(std::iter::empty())?;
        Ok(self.get_json::<RepoInfo>(url)?.default_branch)
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for page in 1.. {
            let mut url = self.repo_url(["branches"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());
            let batch: Vec<BranchInfo> = self.get_json(url)?;
            let done = batch.len() < PAGE_SIZE;
            names.extend(batch.into_iter().map(|b| b.name));
            if done {
                break;
            }
        }
        Ok(names)
    }

    fn create_branch(&self, name: &str, source: Option<&str>) -> Result<()> {
        let source = match source {
            Some(source) => source.to_string(),
            None => self.default_branch()?,
        };
        let sha = self.branch_head(&source)?;
        let url = self.repo_url(["git", "refs"])?;
        let body = json!({"ref": format!("refs/heads/{name}"), "sha": sha});
        match self.send(self.request(Method::POST, url).json(&body)) {
            Ok(_) => Ok(()),
            Err(Error::Api { status: 422, .. }) => Err(Error::BranchExists {
                name: name.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        if name == self.default_branch()? {
            return Err(Error::InvalidArgument(format!(
                "cannot delete default branch '{name}'"
            )));
        }
        let url = self.repo_url(["git", "refs", "heads"].into_iter().chain(name.split('/')))?;
        match self.send(self.request(Method::DELETE, url)) {
            Ok(_) => Ok(()),
            Err(Error::Api {
                status: 404 | 422, ..
            }) => Err(Error::BranchNotFound {
                name: name.to_string(),
                available: Vec::new(),
            }),
            Err(e) => Err(e),
        }
    }

    fn recent_commits(&self, branch: &str, count: usize) -> Result<Vec<Commit>> {
        let mut url = self.repo_url(["commits"])?;
        url.query_pairs_mut()
            .append_pair("sha", branch)
            .append_pair("per_page", &count.clamp(1, PAGE_SIZE).to_string());
        let commits: Vec<CommitInfo> = self.get_json(url)?;
        Ok(commits
            .into_iter()
            .take(count)
            .map(|c| Commit {
                sha: c.sha,
                message: c.commit.message,
                author: c.commit.author.map(|a| a.name),
            })
            .collect())
    }

    fn find_pull_request(&self, head: &str, base: &str) -> Result<Option<PullRequest>> {
        let mut url = self.repo_url(["pulls"])?;
        url.query_pairs_mut()
            .append_pair("state", "open")
            .append_pair("head", &format!("{}:{head}", self.remote.owner))
            .append_pair("base", base);
        let pulls: Vec<PullInfo> = self.get_json(url)?;
        Ok(pulls
            .into_iter()
            .find(|p| p.head.name == head && p.base.name == base)
            .map(PullRequest::from))
    }

    fn create_pull_request(&self, draft: &PullRequestDraft) -> Result<PullRequest> {
        let url = self.repo_url(["pulls"])?;
        let body = json!({
            "title": draft.title,
            "body": draft.body,
            "head": draft.head,
            "base": draft.base,
            "draft": draft.draft,
        });
        let response = match self.send(self.request(Method::POST, url).json(&body)) {
            Ok(response) => response,
            Err(Error::Api { status, message })
                if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16()
                    && message.to_lowercase().contains("already exists") =>
            {
                return Err(Error::PullRequestExists {
                    head: draft.head.clone(),
                    base: draft.base.clone(),
                });
            }
            Err(e) => return Err(e),
        };
        Ok(response.json::<PullInfo>()?.into())
    }
}

/// Decode a contents-API file payload to text.
fn decode_content(path: &str, file: &ContentFile) -> Result<String> {
    let malformed = |message: String| Error::MalformedContent {
        path: path.to_string(),
        message,
    };
    let raw = file.content.as_deref().unwrap_or_default();
    match file.encoding.as_deref() {
        Some("base64") => {
            let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact)
                .map_err(|e| malformed(format!("invalid base64: {e}")))?;
            String::from_utf8(bytes).map_err(|e| malformed(format!("not UTF-8: {e}")))
        }
        Some("none") => Err(malformed(
            "file too large for the contents API".to_string(),
        )),
        _ => Ok(raw.to_string()),
    }
}

/// Pull `message` (and any validation `errors[].message`) out of an error body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let mut parts: Vec<String> = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .into_iter()
        .collect();
    if let Some(errors) = value.get("errors").and_then(Value::as_array) {
        parts.extend(
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .map(str::to_string),
        );
    }
    if parts.is_empty() {
        body.trim().to_string()
    } else {
        parts.join(": ")
    }
}
