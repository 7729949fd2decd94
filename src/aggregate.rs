//! Repository report: metadata, recent commits and their file changes

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::adapter::RepoHost;
use crate::error::Result;
use crate::models::{CommitDetail, RepoCommitInfo};

/// Fetch repo info, up to `max_num` commits, then the files of each commit.
///
/// File fetches run with at most `concurrency` requests in flight and are
/// reassembled in commit-list order. The first failure aborts the whole
/// report.
#[tracing::instrument(skip(host), fields(platform = %host.platform()))]
pub async fn collect_repo_commit_info<H: RepoHost>(
    host: &H,
    owner: &str,
    repo: &str,
    max_num: usize,
    concurrency: usize,
) -> Result<RepoCommitInfo> {
    let repo_info = host.fetch_repo_info(owner, repo).await?;
    let commits = host.fetch_commits(owner, repo, max_num).await?;

    tracing::debug!(count = commits.len(), "fetching files per commit");

    let details: Vec<CommitDetail> = stream::iter(commits)
        .map(|commit| async move {
            let files = host.fetch_commit_files(owner, repo, &commit.sha).await?;
            Ok::<_, crate::error::Error>(CommitDetail { commit, files })
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(RepoCommitInfo::new(repo_info, details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{CommitSummary, FileChange, FileStatus, RepoInfo};
    use crate::platform::Platform;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory host; later commits answer faster so completion order
    /// differs from list order.
    struct FakeHost {
        shas: Vec<&'static str>,
        failing_sha: Option<&'static str>,
        file_calls: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn new(shas: Vec<&'static str>) -> Self {
            Self {
                shas,
                failing_sha: None,
                file_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RepoHost for FakeHost {
        fn platform(&self) -> Platform {
            Platform::Github
        }

        async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
            Ok(RepoInfo {
                full_name: Some(format!("{}/{}", owner, repo)),
                ..RepoInfo::default()
            })
        }

        async fn fetch_commits(&self, _owner: &str, _repo: &str, limit: usize) -> Result<Vec<CommitSummary>> {
            Ok(self
                .shas
                .iter()
                .take(limit)
                .map(|sha| CommitSummary {
                    sha: sha.to_string(),
                    author: None,
                    message: format!("commit {}", sha),
                    date: None,
                })
                .collect())
        }

        async fn fetch_commit_files(&self, _owner: &str, _repo: &str, sha: &str) -> Result<Vec<FileChange>> {
            self.file_calls.lock().unwrap().push(sha.to_string());

            let position = self.shas.iter().position(|s| *s == sha).unwrap_or(0);
            let delay = (self.shas.len() - position) as u64 * 10;
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if self.failing_sha == Some(sha) {
                return Err(Error::from_status(StatusCode::NOT_FOUND, sha, "No commit found"));
            }

            Ok(vec![FileChange {
                filename: format!("{}.txt", sha),
                status: FileStatus::Modified,
                additions: 1,
                deletions: 0,
                changes: 1,
                patch: None,
            }])
        }
    }

    #[tokio::test]
    async fn test_report_preserves_commit_order() {
        let host = FakeHost::new(vec!["c5", "c4", "c3", "c2", "c1"]);

        let info = collect_repo_commit_info(&host, "octo", "hello", 3, 3).await.unwrap();

        assert_eq!(info.repo_info.full_name.as_deref(), Some("octo/hello"));
        assert_eq!(info.commits_count, 3);
        let shas: Vec<_> = info.commits.iter().map(|c| c.commit.sha.as_str()).collect();
        assert_eq!(shas, vec!["c5", "c4", "c3"]);
        assert_eq!(info.commits[1].files[0].filename, "c4.txt");
    }

    #[tokio::test]
    async fn test_report_matches_direct_commit_listing() {
        let host = FakeHost::new(vec!["a", "b", "c", "d"]);

        let direct = host.fetch_commits("o", "r", 3).await.unwrap();
        let info = collect_repo_commit_info(&host, "o", "r", 3, 2).await.unwrap();

        assert_eq!(info.commits_count, direct.len());
        for (detail, summary) in info.commits.iter().zip(&direct) {
            assert_eq!(detail.commit, *summary);
        }
    }

    #[tokio::test]
    async fn test_report_with_fewer_commits_than_requested() {
        let host = FakeHost::new(vec!["only"]);
        let info = collect_repo_commit_info(&host, "o", "r", 10, 4).await.unwrap();
        assert_eq!(info.commits_count, 1);
    }

    #[tokio::test]
    async fn test_sequential_fetching_with_concurrency_one() {
        let host = FakeHost::new(vec!["x", "y", "z"]);
        collect_repo_commit_info(&host, "o", "r", 3, 1).await.unwrap();
        assert_eq!(*host.file_calls.lock().unwrap(), vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_report_fails_when_any_commit_fails() {
        let mut host = FakeHost::new(vec!["ok1", "bad", "ok2"]);
        host.failing_sha = Some("bad");

        let err = collect_repo_commit_info(&host, "o", "r", 3, 3).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
