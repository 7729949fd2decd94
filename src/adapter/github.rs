//! GitHub REST adapter

use serde::Deserialize;

use reqwest::StatusCode;

use super::{endpoint, get_json, page_size, RepoHost};
use crate::error::{Error, Result};
use crate::models::{parse_timestamp, CommitSummary, FileChange, FileStatus, RepoInfo};
use crate::platform::Platform;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Message prefix GitHub puts on the 422 it returns for an unknown sha
const UNKNOWN_COMMIT_MESSAGE: &str = "No commit found";

/// Client for `api.github.com` (or a compatible Enterprise endpoint)
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_api: String,
    token: Option<String>,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
struct GhRepo {
    name: Option<String>,
    full_name: Option<String>,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    open_issues_count: Option<u64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    /// Linked account; null when the commit email matches no user
    #[serde(default)]
    author: Option<GhUser>,
    #[serde(default)]
    commit: Option<GhGitCommit>,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhGitCommit {
    message: Option<String>,
    author: Option<GhGitActor>,
}

#[derive(Debug, Deserialize)]
struct GhGitActor {
    date: Option<String>,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`, only the part we read
#[derive(Debug, Deserialize)]
struct GhCommitFiles {
    #[serde(default)]
    files: Vec<GhFile>,
}

#[derive(Debug, Deserialize)]
struct GhFile {
    filename: String,
    status: Option<String>,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changes: u64,
    patch: Option<String>,
}

impl From<GhRepo> for RepoInfo {
    fn from(repo: GhRepo) -> Self {
        RepoInfo {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description,
            language: repo.language,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            open_issues_count: repo.open_issues_count,
            created_at: parse_timestamp(repo.created_at.as_deref()),
            updated_at: parse_timestamp(repo.updated_at.as_deref()),
        }
    }
}

impl From<GhCommit> for CommitSummary {
    fn from(commit: GhCommit) -> Self {
        let (message, date) = match commit.commit {
            Some(git) => (
                git.message.unwrap_or_default(),
                parse_timestamp(git.author.and_then(|a| a.date).as_deref()),
            ),
            None => (String::new(), None),
        };

        CommitSummary {
            sha: commit.sha,
            author: commit.author.and_then(|user| user.login),
            message,
            date,
        }
    }
}

impl From<GhFile> for FileChange {
    fn from(file: GhFile) -> Self {
        FileChange {
            filename: file.filename,
            status: file
                .status
                .as_deref()
                .map(FileStatus::parse)
                .unwrap_or(FileStatus::Unknown),
            additions: file.additions,
            deletions: file.deletions,
            changes: file.changes,
            patch: file.patch,
        }
    }
}

impl GithubClient {
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

/// GitHub answers an unknown sha with 422 rather than 404
fn unknown_commit_as_not_found(err: Error) -> Error {
    match err {
        Error::Status { status, url, message }
            if status == StatusCode::UNPROCESSABLE_ENTITY && message.starts_with(UNKNOWN_COMMIT_MESSAGE) =>
        {
            Error::NotFound { status, url, message }
        }
        other => other,
    }
}

impl RepoHost for GithubClient {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    #[tracing::instrument(skip(self), fields(platform = "github"))]
    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        let url = self.repo_url(owner, repo, &[])?;
        let repo: GhRepo = get_json(&self.http, url.as_str(), self.token.as_deref(), GITHUB_ACCEPT, &[]).await?;
        Ok(repo.into())
    }

    #[tracing::instrument(skip(self), fields(platform = "github"))]
    async fn fetch_commits(&self, owner: &str, repo: &str, limit: usize) -> Result<Vec<CommitSummary>> {
        let per_page = page_size(limit);
        if per_page == 0 {
            return Ok(Vec::new());
        }

        let url = self.repo_url(owner, repo, &["commits"])?;
        let commits: Vec<GhCommit> = get_json(
            &self.http,
            url.as_str(),
            self.token.as_deref(),
            GITHUB_ACCEPT,
            &[("per_page", per_page.to_string())],
        )
        .await?;

        Ok(commits.into_iter().take(per_page).map(CommitSummary::from).collect())
    }

    #[tracing::instrument(skip(self), fields(platform = "github"))]
    async fn fetch_commit_files(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<FileChange>> {
        let url = self.repo_url(owner, repo, &["commits", sha])?;
        let commit: GhCommitFiles = get_json(&self.http, url.as_str(), self.token.as_deref(), GITHUB_ACCEPT, &[])
            .await
            .map_err(unknown_commit_as_not_found)?;
        Ok(commit.files.into_iter().map(FileChange::from).collect())
    }
}
