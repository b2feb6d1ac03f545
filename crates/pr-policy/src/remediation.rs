//! # Remediations Comment
//!
//! Publishes the validator's findings as a single comment on the pull request.
//! Old remediation comments are always removed first, so a compliant PR ends
//! up with no remediation comment at all.

use crate::config::Config;
use crate::error::Result;
use crate::store::{marked_comments, PrRef, PrStore};
use crate::validate::Remediation;
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// First line of every remediations comment
pub const REMEDIATION_MARKER: &str = "#### Remediations needed";

/// Result of a validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    Passed,
    Failed { remediations: usize },
}

impl PublishOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Render the remediations comment body
#[must_use]
pub fn render(remediations: &[Remediation]) -> String {
    let bullets: Vec<String> = remediations
        .iter()
        .map(|remediation| format!("* {remediation}"))
        .collect();
    format!("{REMEDIATION_MARKER}\n{}", bullets.join("\n"))
}

pub struct RemediationPublisher {
    store: Arc<dyn PrStore>,
    bot_login: String,
}

impl RemediationPublisher {
    pub fn new(store: Arc<dyn PrStore>, config: &Config) -> Self {
        Self {
            store,
            bot_login: config.bot_login.clone(),
        }
    }

    /// Replace any previous remediations comment with one for `remediations`
    pub async fn publish(&self, pr: &PrRef, remediations: &[Remediation]) -> Result<PublishOutcome> {
        let comments = self.store.list_comments(pr).await?;
        let previous = marked_comments(&comments, &self.bot_login, REMEDIATION_MARKER);

        if !previous.is_empty() {
            info!(pr = %pr, count = previous.len(), "Removing previous remediation comments");
            try_join_all(
                previous
                    .iter()
                    .map(|comment| self.store.delete_comment(pr, comment.id)),
            )
            .await?;
        }

        if remediations.is_empty() {
            info!(pr = %pr, "PR metadata satisfies policy");
            return Ok(PublishOutcome::Passed);
        }

        for remediation in remediations {
            warn!(pr = %pr, "{remediation}");
        }
        self.store.create_comment(pr, &render(remediations)).await?;

        Ok(PublishOutcome::Failed {
            remediations: remediations.len(),
        })
    }
}
