//! gitscope - repository metadata and commit history from GitHub and Gitee
//!
//! A library for reading hosted git repositories with:
//! - One adapter per platform behind the `RepoHost` trait
//! - Case-insensitive platform dispatch with configurable tokens
//! - Repository reports (metadata + recent commits + per-commit files)
//! - Local clone/pull through the `git` binary

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod models;
pub mod platform;
pub mod sync;

pub use adapter::{Adapter, GiteeClient, GithubClient, RepoHost, DEFAULT_COMMIT_LIMIT};
pub use aggregate::collect_repo_commit_info;
pub use config::{Config, TokenSource};
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use models::{CommitDetail, CommitSummary, FileChange, FileStatus, RepoCommitInfo, RepoInfo};
pub use platform::Platform;
pub use sync::{clone_repo, pull_repo, CliGitRunner, GitRunner};
