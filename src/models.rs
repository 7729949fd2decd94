//! Platform-neutral shapes returned by every adapter.
//!
//! - `RepoInfo`: repository metadata snapshot
//! - `CommitSummary`: one entry of a commit listing
//! - `FileChange` / `FileStatus`: one file touched by a commit
//! - `CommitDetail`: a commit summary with its file changes
//! - `RepoCommitInfo`: repo metadata plus recent commits with their files
//!
//! Every optional remote field is an `Option` so missing data never fails a
//! fetch. All types serialize to the flat JSON shape printed by the CLI.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    /// Platform login of the author, `None` when the commit email is not
    /// linked to an account.
    pub author: Option<String>,
    pub message: String,
    pub date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl FileStatus {
    /// Map a status string as reported by either platform.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "added" => FileStatus::Added,
            "modified" => FileStatus::Modified,
            "removed" | "deleted" => FileStatus::Removed,
            "renamed" => FileStatus::Renamed,
            "copied" => FileStatus::Copied,
            "changed" => FileStatus::Changed,
            "unchanged" => FileStatus::Unchanged,
            _ => FileStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub status: FileStatus,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    /// Unified diff text, passed through untouched. Absent for binary files
    /// and very large diffs.
    pub patch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(flatten)]
    pub commit: CommitSummary,
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoCommitInfo {
    pub repo_info: RepoInfo,
    pub commits_count: usize,
    pub commits: Vec<CommitDetail>,
}

impl RepoCommitInfo {
    pub fn new(repo_info: RepoInfo, commits: Vec<CommitDetail>) -> Self {
        Self {
            repo_info,
            commits_count: commits.len(),
            commits,
        }
    }
}

/// Parse an RFC 3339 timestamp, keeping the remote's UTC offset.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}
