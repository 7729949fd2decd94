//! Platform adapters
//!
//! Provides:
//! - `RepoHost`, the fetch contract every platform implements
//! - GitHub adapter (typed REST responses)
//! - Gitee v5 adapter (raw JSON mapped field by field)
//! - `Adapter`, the closed set of adapters the dispatcher hands out
//!
//! Both adapters issue exactly one request per call and never paginate.

mod gitee;
mod github;

pub use gitee::GiteeClient;
pub use github::GithubClient;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::models::{CommitSummary, FileChange, RepoInfo};
use crate::platform::Platform;

/// Largest `per_page` either platform honours
pub const MAX_PAGE_SIZE: usize = 100;

/// Default number of commits fetched when the caller does not say
pub const DEFAULT_COMMIT_LIMIT: usize = 10;

/// Longest slice of an error body kept in error messages
const ERROR_BODY_LIMIT: usize = 200;

/// Read operations against one hosting platform
#[allow(async_fn_in_trait)]
pub trait RepoHost {
    fn platform(&self) -> Platform;

    /// Repository metadata; missing fields become `None`
    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo>;

    /// One page of at most `limit` commits, newest first
    async fn fetch_commits(&self, owner: &str, repo: &str, limit: usize) -> Result<Vec<CommitSummary>>;

    /// Files changed by commit `sha`
    async fn fetch_commit_files(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<FileChange>>;
}

/// An adapter for one of the supported platforms
#[derive(Debug, Clone)]
pub enum Adapter {
    Github(GithubClient),
    Gitee(GiteeClient),
}

impl Adapter {
    pub fn new(platform: Platform, http: reqwest::Client, api_url: String, token: Option<String>) -> Self {
        match platform {
            Platform::Github => Adapter::Github(GithubClient::new(http, api_url, token)),
            Platform::Gitee => Adapter::Gitee(GiteeClient::new(http, api_url, token)),
        }
    }
}

impl RepoHost for Adapter {
    fn platform(&self) -> Platform {
        match self {
            Adapter::Github(client) => client.platform(),
            Adapter::Gitee(client) => client.platform(),
        }
    }

    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        match self {
            Adapter::Github(client) => client.fetch_repo_info(owner, repo).await,
            Adapter::Gitee(client) => client.fetch_repo_info(owner, repo).await,
        }
    }

    async fn fetch_commits(&self, owner: &str, repo: &str, limit: usize) -> Result<Vec<CommitSummary>> {
        match self {
            Adapter::Github(client) => client.fetch_commits(owner, repo, limit).await,
            Adapter::Gitee(client) => client.fetch_commits(owner, repo, limit).await,
        }
    }

    async fn fetch_commit_files(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<FileChange>> {
        match self {
            Adapter::Github(client) => client.fetch_commit_files(owner, repo, sha).await,
            Adapter::Gitee(client) => client.fetch_commit_files(owner, repo, sha).await,
        }
    }
}

/// Build the HTTP client shared by every adapter
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Append `segments` to `base_api`, percent-encoding each one so a `/`, `?`
/// or `#` inside an owner, repo or sha stays part of that segment.
pub(crate) fn endpoint(base_api: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_api)
        .map_err(|e| Error::Config(format!("Invalid API root '{}': {}", base_api, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("API root '{}' cannot carry a path", base_api)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Issue one GET and decode the JSON body.
///
/// Non-2xx responses are classified by `Error::from_status`; the remote's
/// `message` field (or the start of the body) is kept for diagnosis.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    token: Option<&str>,
    accept: &str,
    query: &[(&str, String)],
) -> Result<T> {
    tracing::debug!(url, authenticated = token.is_some(), "GET");

    let mut request = http.get(url).header(ACCEPT, accept).query(query);
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("token {}", token));
    }

    let response = request.send().await.map_err(|source| Error::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|source| Error::Transport {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        tracing::debug!(url, %status, "request rejected");
        return Err(Error::from_status(status, url, remote_message(&body)));
    }

    serde_json::from_str(&body).map_err(|e| Error::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Pull a human-readable message out of an error body
fn remote_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    match from_json {
        Some(message) => message,
        None => body.trim().chars().take(ERROR_BODY_LIMIT).collect(),
    }
}

/// Clamp a requested commit count to what one page can return
pub(crate) fn page_size(limit: usize) -> usize {
    limit.min(MAX_PAGE_SIZE)
}
