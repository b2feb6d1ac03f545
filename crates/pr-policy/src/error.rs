use thiserror::Error;

/// Errors raised by the GitHub REST client
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that abort a sync or validation pass.
///
/// Policy violations are not errors; they are reported as remediations.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The triggering event does not reference a pull request
    #[error("no pull request found in the event payload")]
    MissingPullRequest,

    /// The event payload could not be read or decoded
    #[error("invalid event payload: {0}")]
    Event(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] GitHubError),
}

pub type Result<T, E = PolicyError> = std::result::Result<T, E>;

impl PolicyError {
    /// Whether the pass failed before any remote state was read
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingPullRequest | Self::Event(_) | Self::Config(_)
        )
    }
}
