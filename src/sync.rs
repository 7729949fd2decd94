//! Local repository sync
//!
//! Clones and pulls by shelling out to the `git` binary. The subprocess sits
//! behind `GitRunner` so callers and tests can substitute it.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Runs one git invocation to completion
pub trait GitRunner {
    /// Run `git <args>` in `cwd`, or in the current directory when `None`.
    /// Arguments are passed through unchanged, so non-UTF-8 paths survive.
    fn run(&self, args: &[&OsStr], cwd: Option<&Path>) -> Result<ExitStatus>;
}

/// Invokes the `git` found on `PATH`, inheriting stdout/stderr so progress
/// stays visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliGitRunner;

impl GitRunner for CliGitRunner {
    fn run(&self, args: &[&OsStr], cwd: Option<&Path>) -> Result<ExitStatus> {
        let mut command = Command::new("git");
        command.args(args).stdin(Stdio::null());
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        Ok(command.status()?)
    }
}

fn run_checked(runner: &dyn GitRunner, args: &[&OsStr], cwd: Option<&Path>) -> Result<()> {
    let status = runner.run(args, cwd)?;
    if status.success() {
        return Ok(());
    }

    let mut command = format!(
        "git {}",
        args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
    );
    if let Some(cwd) = cwd {
        command.push_str(&format!(" (in {})", cwd.display()));
    }

    Err(Error::Tool {
        command,
        exit_code: status.code(),
    })
}

/// Clone `owner/repo` into `dest`.
///
/// Returns `false` without running git when `dest` already exists; this is
/// an idempotency guard, not an up-to-date check.
pub fn clone_repo(
    runner: &dyn GitRunner,
    platform: &str,
    owner: &str,
    repo: &str,
    dest: &Path,
) -> Result<bool> {
    let platform: Platform = platform.parse()?;
    let url = platform.clone_url(owner, repo);

    if dest.exists() {
        tracing::warn!(dest = %dest.display(), "destination exists, skipping clone");
        return Ok(false);
    }

    tracing::info!(%url, dest = %dest.display(), "cloning");
    run_checked(runner, &[OsStr::new("clone"), OsStr::new(&url), dest.as_os_str()], None)?;
    Ok(true)
}

/// Pull the default branch of an existing clone at `dest`
pub fn pull_repo(
    runner: &dyn GitRunner,
    platform: &str,
    owner: &str,
    repo: &str,
    dest: &Path,
) -> Result<bool> {
    let platform: Platform = platform.parse()?;

    if !dest.exists() {
        return Err(Error::NotLocalCopy {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: dest.to_path_buf(),
        });
    }

    tracing::info!(%platform, owner, repo, dest = %dest.display(), "pulling");
    run_checked(runner, &[OsStr::new("pull")], Some(dest))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }

    #[derive(Debug, Clone)]
    struct Call {
        args: Vec<OsString>,
        cwd: Option<PathBuf>,
    }

    /// Records every invocation; `clone` creates the destination like git would
    struct RecordingRunner {
        calls: RefCell<Vec<Call>>,
        exit_code: i32,
    }

    impl RecordingRunner {
        fn new(exit_code: i32) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                exit_code,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    impl GitRunner for RecordingRunner {
        fn run(&self, args: &[&OsStr], cwd: Option<&Path>) -> Result<ExitStatus> {
            self.calls.borrow_mut().push(Call {
                args: args.iter().map(|a| a.to_os_string()).collect(),
                cwd: cwd.map(Path::to_path_buf),
            });
            if self.exit_code == 0 && args.first() == Some(&OsStr::new("clone")) {
                if let Some(dest) = args.last() {
                    fs::create_dir_all(dest)?;
                }
            }
            Ok(exit_status(self.exit_code))
        }
    }

    #[test]
    fn test_clone_twice_is_idempotent() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("hello");
        let runner = RecordingRunner::new(0);

        assert!(clone_repo(&runner, "GitHub", "octo", "hello", &dest).unwrap());
        assert!(!clone_repo(&runner, "github", "octo", "hello", &dest).unwrap());

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            vec![
                OsString::from("clone"),
                OsString::from("https://github.com/octo/hello.git"),
                dest.clone().into_os_string(),
            ]
        );
        assert_eq!(calls[0].cwd, None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_clone_passes_non_utf8_dest_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let dest = dir.path().join(OsStr::from_bytes(b"repo-\xff"));
        let runner = RecordingRunner::new(0);

        assert!(clone_repo(&runner, "github", "o", "r", &dest).unwrap());
        assert_eq!(runner.calls()[0].args[2], dest.as_os_str());

        // The directory git created is the one the guard checks
        assert!(!clone_repo(&runner, "github", "o", "r", &dest).unwrap());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_clone_uses_gitee_url() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("demo");
        let runner = RecordingRunner::new(0);

        clone_repo(&runner, "gitee", "oschina", "demo", &dest).unwrap();
        assert_eq!(runner.calls()[0].args[1], "https://gitee.com/oschina/demo.git");
    }

    #[test]
    fn test_clone_rejects_unknown_platform() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new(0);

        let err = clone_repo(&runner, "gitlab", "o", "r", &dir.path().join("r")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_clone_rejects_padded_platform_before_dest_check() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new(0);

        let err = clone_repo(&runner, "github\n", "o", "r", dir.path()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_clone_failure_is_tool_error() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new(128);

        let err = clone_repo(&runner, "github", "o", "r", &dir.path().join("r")).unwrap_err();
        match err {
            Error::Tool { command, exit_code } => {
                assert!(command.starts_with("git clone https://github.com/o/r.git"));
                assert_eq!(exit_code, Some(128));
            }
            other => panic!("expected Tool error, got {:?}", other),
        }
    }

    #[test]
    fn test_pull_missing_dest_skips_git() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new(0);

        let err = pull_repo(&runner, "gitee", "o", "r", &dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, Error::NotLocalCopy { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_pull_runs_in_dest() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new(0);

        assert!(pull_repo(&runner, "github", "o", "r", dir.path()).unwrap());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec![OsString::from("pull")]);
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_pull_rejects_unknown_platform_first() {
        let runner = RecordingRunner::new(0);
        let err = pull_repo(&runner, "svn", "o", "r", Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }

    #[test]
    fn test_pull_failure_is_tool_error() {
        let dir = tempdir().unwrap();
        let runner = RecordingRunner::new(1);

        let err = pull_repo(&runner, "github", "o", "r", dir.path()).unwrap_err();
        match err {
            Error::Tool { command, exit_code } => {
                assert!(command.starts_with("git pull (in "));
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected Tool error, got {:?}", other),
        }
    }
}
