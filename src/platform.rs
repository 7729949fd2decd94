//! Supported hosting platforms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Hosting platforms with a REST adapter and a clone URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Github,
    Gitee,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Github, Platform::Gitee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Github => "github",
            Platform::Gitee => "gitee",
        }
    }

    /// HTTPS clone URL for `owner/repo`
    pub fn clone_url(&self, owner: &str, repo: &str) -> String {
        match self {
            Platform::Github => format!("https://github.com/{}/{}.git", owner, repo),
            Platform::Gitee => format!("https://gitee.com/{}/{}.git", owner, repo),
        }
    }

    /// Default REST API root, without a trailing slash
    pub fn default_api_url(&self) -> &'static str {
        match self {
            Platform::Github => "https://api.github.com",
            Platform::Gitee => "https://gitee.com/api/v5",
        }
    }

    /// Environment variable consulted when no token is configured
    pub fn token_env_var(&self) -> &'static str {
        match self {
            Platform::Github => "GITHUB_TOKEN",
            Platform::Gitee => "GITEE_TOKEN",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Platform::Github),
            "gitee" => Ok(Platform::Gitee),
            _ => Err(Error::UnsupportedPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
