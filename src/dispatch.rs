//! Platform dispatch
//!
//! The one place a platform name is turned into an adapter. Every entry point
//! parses the name (case-insensitively), asks the token source for a token
//! once, and delegates to the matching adapter.

use crate::adapter::{build_http_client, Adapter, RepoHost};
use crate::aggregate::collect_repo_commit_info;
use crate::config::{Config, TokenSource};
use crate::error::Result;
use crate::models::{CommitSummary, FileChange, RepoCommitInfo, RepoInfo};
use crate::platform::Platform;

pub struct Dispatcher<T = Config> {
    config: Config,
    tokens: T,
    http: reqwest::Client,
}

impl Dispatcher<Config> {
    /// Dispatcher whose tokens come from `config` itself
    pub fn new(config: Config) -> Result<Self> {
        let tokens = config.clone();
        Self::with_tokens(config, tokens)
    }
}

impl<T: TokenSource> Dispatcher<T> {
    pub fn with_tokens(config: Config, tokens: T) -> Result<Self> {
        let http = build_http_client(&config.http)?;
        Ok(Self { config, tokens, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve `platform` to an adapter carrying that platform's token
    pub fn adapter(&self, platform: &str) -> Result<Adapter> {
        let platform: Platform = platform.parse()?;
        Ok(self.adapter_for(platform))
    }

    pub fn adapter_for(&self, platform: Platform) -> Adapter {
        let token = self.tokens.get_token(platform);
        tracing::debug!(%platform, authenticated = token.is_some(), "selected adapter");
        Adapter::new(platform, self.http.clone(), self.config.api_url(platform), token)
    }

    pub async fn get_repo_info(&self, owner: &str, repo: &str, platform: &str) -> Result<RepoInfo> {
        self.adapter(platform)?.fetch_repo_info(owner, repo).await
    }

    pub async fn get_commits(
        &self,
        owner: &str,
        repo: &str,
        limit: usize,
        platform: &str,
    ) -> Result<Vec<CommitSummary>> {
        self.adapter(platform)?.fetch_commits(owner, repo, limit).await
    }

    pub async fn get_commit_files(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        platform: &str,
    ) -> Result<Vec<FileChange>> {
        self.adapter(platform)?.fetch_commit_files(owner, repo, sha).await
    }

    /// Repo info, the `max_num` most recent commits, and each commit's files
    pub async fn get_repo_commit_info(
        &self,
        owner: &str,
        repo: &str,
        max_num: usize,
        platform: &str,
    ) -> Result<RepoCommitInfo> {
        let adapter = self.adapter(platform)?;
        collect_repo_commit_info(
            &adapter,
            owner,
            repo,
            max_num,
            self.config.http.max_concurrent_fetches,
        )
        .await
    }
}
