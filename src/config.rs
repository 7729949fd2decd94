//! Configuration loaded from `gitscope.toml`
//!
//! Provides:
//! - Per-platform tokens and API roots
//! - HTTP client settings shared by both adapters
//! - `TokenSource`, the lookup the dispatcher consults once per call

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::platform::Platform;

pub const CONFIG_FILE: &str = "gitscope.toml";

/// Something that can hand out an access token for a platform
pub trait TokenSource {
    fn get_token(&self, platform: Platform) -> Option<String>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: PlatformConfig,
    #[serde(default)]
    pub gitee: PlatformConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformConfig {
    /// Access token; `${VAR}` references are expanded from the environment
    #[serde(default)]
    pub token: Option<String>,
    /// REST API root override (GitHub Enterprise, mirrors, tests)
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds; requests never time out when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// How many per-commit file fetches the aggregator keeps in flight
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_user_agent() -> String {
    format!("gitscope/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_concurrent_fetches() -> usize {
    4
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.http.max_concurrent_fetches == 0 {
            return Err(Error::Config(
                "http.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }

        for platform in Platform::ALL {
            if let Some(ref raw) = self.platform(platform).api_url {
                let url = reqwest::Url::parse(raw).map_err(|e| {
                    Error::Config(format!("{}.api_url '{}' is not a valid URL: {}", platform, raw, e))
                })?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(Error::Config(format!(
                        "{}.api_url '{}' must use http or https",
                        platform, raw
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn platform(&self, platform: Platform) -> &PlatformConfig {
        match platform {
            Platform::Github => &self.github,
            Platform::Gitee => &self.gitee,
        }
    }

    /// API root for `platform`, without a trailing slash
    pub fn api_url(&self, platform: Platform) -> String {
        self.platform(platform)
            .api_url
            .as_deref()
            .unwrap_or_else(|| platform.default_api_url())
            .trim_end_matches('/')
            .to_string()
    }
}

impl TokenSource for Config {
    fn get_token(&self, platform: Platform) -> Option<String> {
        let configured = self.platform(platform).token.as_deref().and_then(|raw| {
            match shellexpand::env(raw) {
                Ok(expanded) => Some(expanded.into_owned()),
                Err(e) => {
                    tracing::debug!(%platform, "could not expand configured token: {}", e);
                    None
                }
            }
        });

        configured
            .filter(|token| !token.trim().is_empty())
            .or_else(|| std::env::var(platform.token_env_var()).ok())
            .filter(|token| !token.trim().is_empty())
    }
}

/// Fixed tokens, for embedding callers that manage credentials themselves
impl TokenSource for HashMap<Platform, String> {
    fn get_token(&self, platform: Platform) -> Option<String> {
        self.get(&platform).cloned()
    }
}
