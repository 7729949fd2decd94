//! Error types shared by every operation in the crate.
//!
//! Remote failures are classified the same way for both platforms:
//! - 404 → `NotFound`
//! - 401, 403 → `Auth`
//! - any other non-2xx → `Status`
//!
//! Each variant carries enough context (URL, owner/repo, path, command line)
//! to diagnose the failure without re-running it.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported platform '{0}'. Use 'github' or 'gitee'")]
    UnsupportedPlatform(String),

    #[error("Not found ({status}): {url}: {message}")]
    NotFound {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error("Credentials rejected ({status}): {url}: {message}")]
    Auth {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error("Request failed ({status}): {url}: {message}")]
    Status {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error("Network error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("The repository {owner}/{repo} does not exist locally at {}", path.display())]
    NotLocalCopy {
        owner: String,
        repo: String,
        path: PathBuf,
    },

    #[error("`{command}` exited with {}", describe_exit(*exit_code))]
    Tool {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Classify a non-success HTTP status into the matching variant.
    pub fn from_status(status: StatusCode, url: impl Into<String>, message: impl Into<String>) -> Self {
        let url = url.into();
        let message = message.into();
        match status {
            StatusCode::NOT_FOUND => Error::NotFound { status, url, message },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth { status, url, message },
            _ => Error::Status { status, url, message },
        }
    }

    /// HTTP status of a remote failure, if the error came from one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::NotFound { status, .. } | Error::Auth { status, .. } | Error::Status { status, .. } => {
                Some(*status)
            }
            Error::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
