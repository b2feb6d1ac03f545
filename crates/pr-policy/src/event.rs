//! # Trigger Payload
//!
//! Reads the GitHub Actions event that started the workflow and reduces it to
//! a [`Trigger`]: who acted, on which pull request, with which labels and body.
//!
//! Supported payloads are `pull_request`/`pull_request_target` (the PR is
//! `pull_request`) and `issue_comment` (the PR is `issue`, which must carry a
//! `pull_request` link).

use crate::config::RepoSlug;
use crate::error::{PolicyError, Result};
use crate::labels::LabelSet;
use crate::store::PrRef;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Event name GitHub uses for comment activity on issues and pull requests
pub const ISSUE_COMMENT_EVENT: &str = "issue_comment";

#[derive(Debug, Deserialize)]
struct EventPayload {
    action: Option<String>,
    sender: Option<UserPayload>,
    pull_request: Option<PullRequestPayload>,
    issue: Option<IssuePayload>,
    comment: Option<CommentPayload>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<LabelPayload>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<LabelPayload>,
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    id: u64,
}

/// Everything one sync or validation pass needs to know about its trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub event_name: String,
    pub action: Option<String>,
    pub actor: String,
    pub pr: PrRef,
    pub labels: LabelSet,
    pub body: String,
    /// Comment the event is about, for `issue_comment` events
    pub comment_id: Option<u64>,
}

impl Trigger {
    /// Build a trigger from a raw event payload.
    ///
    /// `fallback_actor` is used when the payload has no `sender`.
    pub fn from_json(
        event_name: &str,
        repository: &RepoSlug,
        payload: &str,
        fallback_actor: Option<&str>,
    ) -> Result<Self> {
        let payload: EventPayload = serde_json::from_str(payload)
            .map_err(|e| PolicyError::Event(format!("failed to parse event payload: {e}")))?;

        let actor = payload
            .sender
            .map(|sender| sender.login)
            .or_else(|| fallback_actor.map(ToString::to_string))
            .ok_or_else(|| PolicyError::Event("event has no sender".to_string()))?;

        let (number, body, labels) = match (payload.pull_request, payload.issue) {
            (Some(pr), _) => (pr.number, pr.body, pr.labels),
            (None, Some(issue)) if issue.pull_request.is_some() => {
                (issue.number, issue.body, issue.labels)
            }
            _ => return Err(PolicyError::MissingPullRequest),
        };

        let trigger = Self {
            event_name: event_name.to_string(),
            action: payload.action,
            actor,
            pr: PrRef::new(repository.clone(), number),
            labels: labels.into_iter().map(|label| label.name).collect(),
            body: body.unwrap_or_default(),
            comment_id: payload.comment.map(|comment| comment.id),
        };

        debug!(
            event = %trigger.event_name,
            action = ?trigger.action,
            actor = %trigger.actor,
            pr = %trigger.pr,
            labels = trigger.labels.len(),
            "Parsed trigger"
        );

        Ok(trigger)
    }

    /// Build a trigger from an event payload file
    pub fn from_file(
        event_name: &str,
        repository: &RepoSlug,
        path: &Path,
        fallback_actor: Option<&str>,
    ) -> Result<Self> {
        let payload = std::fs::read_to_string(path).map_err(|e| {
            PolicyError::Event(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(event_name, repository, &payload, fallback_actor)
    }

    /// Whether this is an edit of the comment with id `comment_id`
    #[must_use]
    pub fn is_edit_of(&self, comment_id: u64) -> bool {
        self.event_name == ISSUE_COMMENT_EVENT
            && self.action.as_deref() == Some("edited")
            && self.comment_id == Some(comment_id)
    }
}
