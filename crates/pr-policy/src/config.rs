//! Runtime configuration shared by the sync and validate passes.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default web host, used to build pull request URLs
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Login GitHub Actions uses when a workflow writes with `GITHUB_TOKEN`
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

/// `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoSlug {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(PolicyError::Config(format!(
                "invalid repository '{s}' (expected owner/repo)"
            ))),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub repository: RepoSlug,
    pub api_url: String,
    pub server_url: String,
    /// Identity the automation writes as; events from it are ignored
    pub bot_login: String,
}

impl Config {
    pub fn new(repository: RepoSlug) -> Self {
        Self {
            repository,
            api_url: DEFAULT_API_URL.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Web URL prefix of this repository's pull requests
    #[must_use]
    pub fn pull_request_url_prefix(&self) -> String {
        format!("{}/{}/pull/", self.server_url, self.repository)
    }

    #[must_use]
    pub fn with_bot_login(mut self, bot_login: impl Into<String>) -> Self {
        self.bot_login = bot_login.into();
        self
    }

    /// Whether `actor` is the automation itself
    #[must_use]
    pub fn is_bot(&self, actor: &str) -> bool {
        actor == self.bot_login
    }
}
