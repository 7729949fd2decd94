//! Gitee v5 REST adapter
//!
//! Gitee's payloads drift between endpoints and API revisions, so responses
//! are read as raw JSON and mapped field by field.

use serde_json::Value;

use super::{endpoint, get_json, page_size, RepoHost};
use crate::error::{Error, Result};
use crate::models::{parse_timestamp, CommitSummary, FileChange, FileStatus, RepoInfo};
use crate::platform::Platform;

const GITEE_ACCEPT: &str = "application/json";

/// Client for `gitee.com/api/v5`
#[derive(Debug, Clone)]
pub struct GiteeClient {
    http: reqwest::Client,
    base_api: String,
    token: Option<String>,
}

impl GiteeClient {
    pub fn new(http: reqwest::Client, base_api: String, token: Option<String>) -> Self {
        Self {
            http,
            base_api: base_api.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &[&str]) -> Result<reqwest::Url> {
        let mut segments = vec!["repos", owner, repo];
        segments.extend_from_slice(rest);
        endpoint(&self.base_api, &segments)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn u64_field(value: &Value, key: &str) -> Option<u64> {
    value.get(key).and_then(Value::as_u64)
}

fn repo_info_from(data: &Value) -> RepoInfo {
    RepoInfo {
        name: str_field(data, "name"),
        full_name: str_field(data, "full_name"),
        description: str_field(data, "description"),
        language: str_field(data, "language"),
        stargazers_count: u64_field(data, "stargazers_count"),
        forks_count: u64_field(data, "forks_count"),
        open_issues_count: u64_field(data, "open_issues_count"),
        created_at: parse_timestamp(data.get("created_at").and_then(Value::as_str)),
        updated_at: parse_timestamp(data.get("updated_at").and_then(Value::as_str)),
    }
}

fn commit_from(entry: &Value, url: &str, index: usize) -> Result<CommitSummary> {
    let sha = str_field(entry, "sha").ok_or_else(|| Error::Decode {
        url: url.to_string(),
        reason: format!("commit entry {} has no sha", index),
    })?;

    let git = entry.get("commit");
    let message = git.and_then(|c| str_field(c, "message")).unwrap_or_default();
    let date = parse_timestamp(
        git.and_then(|c| c.get("author"))
            .and_then(|a| a.get("date"))
            .and_then(Value::as_str),
    );

    Ok(CommitSummary {
        sha,
        author: entry.get("author").and_then(|a| str_field(a, "login")),
        message,
        date,
    })
}

fn file_from(entry: &Value, url: &str) -> Result<FileChange> {
    let filename = str_field(entry, "filename").ok_or_else(|| Error::Decode {
        url: url.to_string(),
        reason: "file entry has no filename".to_string(),
    })?;

    Ok(FileChange {
        filename,
        status: entry
            .get("status")
            .and_then(Value::as_str)
            .map(FileStatus::parse)
            .unwrap_or(FileStatus::Unknown),
        additions: u64_field(entry, "additions").unwrap_or(0),
        deletions: u64_field(entry, "deletions").unwrap_or(0),
        changes: u64_field(entry, "changes").unwrap_or(0),
        patch: str_field(entry, "patch"),
    })
}

impl RepoHost for GiteeClient {
    fn platform(&self) -> Platform {
        Platform::Gitee
    }

    #[tracing::instrument(skip(self), fields(platform = "gitee"))]
    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        let url = self.repo_url(owner, repo, &[])?;
        let data: Value = get_json(&self.http, url.as_str(), self.token.as_deref(), GITEE_ACCEPT, &[]).await?;
        Ok(repo_info_from(&data))
    }

    #[tracing::instrument(skip(self), fields(platform = "gitee"))]
    async fn fetch_commits(&self, owner: &str, repo: &str, limit: usize) -> Result<Vec<CommitSummary>> {
        let per_page = page_size(limit);
        if per_page == 0 {
            return Ok(Vec::new());
        }

        let url = self.repo_url(owner, repo, &["commits"])?;
        let data: Value = get_json(
            &self.http,
            url.as_str(),
            self.token.as_deref(),
            GITEE_ACCEPT,
            &[("per_page", per_page.to_string())],
        )
        .await?;

        let entries = data.as_array().ok_or_else(|| Error::Decode {
            url: url.to_string(),
            reason: "expected a JSON array of commits".to_string(),
        })?;

        entries
            .iter()
            .take(per_page)
            .enumerate()
            .map(|(i, entry)| commit_from(entry, url.as_str(), i))
            .collect()
    }

    #[tracing::instrument(skip(self), fields(platform = "gitee"))]
    async fn fetch_commit_files(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<FileChange>> {
        let url = self.repo_url(owner, repo, &["commits", sha])?;
        let data: Value = get_json(&self.http, url.as_str(), self.token.as_deref(), GITEE_ACCEPT, &[]).await?;

        match data.get("files").and_then(Value::as_array) {
            Some(files) => files.iter().map(|entry| file_from(entry, url.as_str())).collect(),
            None => Ok(Vec::new()),
        }
    }
}
