//! # Pull Request Store
//!
//! The remote state this tool reads and writes: the comments and labels of one
//! pull request. [`PrStore`] is the seam between the policy logic and GitHub;
//! [`crate::github::GitHubClient`] implements it over REST and
//! [`DryRunStore`] wraps any store to log writes instead of performing them.

mod dry_run;
#[cfg(test)]
pub(crate) mod memory;

pub use dry_run::DryRunStore;

use crate::config::RepoSlug;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRef {
    pub repository: RepoSlug,
    pub number: u64,
}

impl PrRef {
    pub fn new(repository: RepoSlug, number: u64) -> Self {
        Self { repository, number }
    }
}

impl fmt::Display for PrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repository, self.number)
    }
}

/// An issue comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: String,
    pub body: String,
}

impl Comment {
    /// Whether this comment was written by `login` and starts with `marker`
    #[must_use]
    pub fn is_marked(&self, login: &str, marker: &str) -> bool {
        self.author == login && self.body.starts_with(marker)
    }
}

/// Comments of `comments` written by `login` that start with `marker`, in
/// their original order
#[must_use]
pub fn marked_comments<'a>(comments: &'a [Comment], login: &str, marker: &str) -> Vec<&'a Comment> {
    comments
        .iter()
        .filter(|comment| comment.is_marked(login, marker))
        .collect()
}

/// Comment and label operations on a pull request.
///
/// Writes are expected to be idempotent: removing a label that is not present
/// succeeds.
#[async_trait]
pub trait PrStore: Send + Sync {
    /// All issue comments on the pull request, oldest first
    async fn list_comments(&self, pr: &PrRef) -> Result<Vec<Comment>>;

    async fn create_comment(&self, pr: &PrRef, body: &str) -> Result<()>;

    async fn update_comment(&self, pr: &PrRef, comment_id: u64, body: &str) -> Result<()>;

    async fn delete_comment(&self, pr: &PrRef, comment_id: u64) -> Result<()>;

    async fn add_labels(&self, pr: &PrRef, labels: &[String]) -> Result<()>;

    async fn remove_label(&self, pr: &PrRef, label: &str) -> Result<()>;
}
