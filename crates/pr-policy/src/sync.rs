//! # Checklist Synchronization
//!
//! Keeps the checklist comment and the PR labels in agreement. Each trigger is
//! handled in one direction only:
//!
//! - **labels follow comment**: a human edited the checklist comment, so the
//!   ticked boxes decide the labels
//! - **comment follows labels**: anything else (labels changed, PR opened,
//!   checklist missing), so the labels are rendered into the comment
//!
//! Writes made by the automation re-trigger the workflow; those events are
//! recognized by their actor and dropped before anything is read.

use crate::checklist::{self, CHECKLIST_MARKER};
use crate::config::Config;
use crate::error::Result;
use crate::event::Trigger;
use crate::labels::LabelDelta;
use crate::store::{marked_comments, Comment, PrStore};
use futures::future::{try_join, try_join_all};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a sync pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The event was caused by the automation itself; nothing was done
    SelfTriggered,
    /// Labels were reconciled with the edited checklist (possibly a no-op)
    LabelsUpdated { delta: LabelDelta },
    CommentCreated,
    CommentUpdated,
    /// The checklist already matched the labels
    Unchanged,
}

/// Bidirectional label/checklist reconciliation
pub struct ChecklistSync {
    store: Arc<dyn PrStore>,
    config: Config,
}

impl ChecklistSync {
    pub fn new(store: Arc<dyn PrStore>, config: &Config) -> Self {
        Self {
            store,
            config: config.clone(),
        }
    }

    /// Run one sync pass for `trigger`
    pub async fn run(&self, trigger: &Trigger) -> Result<SyncOutcome> {
        if self.config.is_bot(&trigger.actor) {
            info!(actor = %trigger.actor, pr = %trigger.pr, "Ignoring event caused by the automation");
            return Ok(SyncOutcome::SelfTriggered);
        }

        let comments = self.store.list_comments(&trigger.pr).await?;
        let mut existing = marked_comments(&comments, &self.config.bot_login, CHECKLIST_MARKER);

        if existing.len() > 1 {
            warn!(
                pr = %trigger.pr,
                count = existing.len(),
                "Found duplicate checklist comments, recreating"
            );
            try_join_all(
                existing
                    .iter()
                    .map(|comment| self.store.delete_comment(&trigger.pr, comment.id)),
            )
            .await?;
            existing.clear();
        }

        match existing.first() {
            Some(comment) if trigger.is_edit_of(comment.id) => {
                self.labels_follow_comment(trigger, comment).await
            }
            current => self.comment_follows_labels(trigger, current.copied()).await,
        }
    }

    async fn labels_follow_comment(&self, trigger: &Trigger, comment: &Comment) -> Result<SyncOutcome> {
        let flags = checklist::parse(&comment.body);
        let delta = LabelDelta::between(&trigger.labels, &flags.winning_labels());

        if delta.is_empty() {
            debug!(pr = %trigger.pr, "Labels already match the checklist");
            return Ok(SyncOutcome::LabelsUpdated { delta });
        }

        info!(
            pr = %trigger.pr,
            add = ?delta.add,
            remove = ?delta.remove,
            "Applying checklist to labels"
        );

        let additions: Vec<String> = delta.add.iter().map(ToString::to_string).collect();
        let removals = try_join_all(
            delta
                .remove
                .iter()
                .map(|label| self.store.remove_label(&trigger.pr, label.as_str())),
        );
        let add = async {
            if additions.is_empty() {
                Ok(())
            } else {
                self.store.add_labels(&trigger.pr, &additions).await
            }
        };
        try_join(removals, add).await?;

        Ok(SyncOutcome::LabelsUpdated { delta })
    }

    async fn comment_follows_labels(
        &self,
        trigger: &Trigger,
        existing: Option<&Comment>,
    ) -> Result<SyncOutcome> {
        let body = checklist::render(&trigger.labels);

        match existing {
            Some(comment) if comment.body == body => {
                debug!(pr = %trigger.pr, comment_id = comment.id, "Checklist up to date");
                Ok(SyncOutcome::Unchanged)
            }
            Some(comment) => {
                info!(pr = %trigger.pr, comment_id = comment.id, "Updating checklist comment");
                self.store
                    .update_comment(&trigger.pr, comment.id, &body)
                    .await?;
                Ok(SyncOutcome::CommentUpdated)
            }
            None => {
                info!(pr = %trigger.pr, "Creating checklist comment");
                self.store.create_comment(&trigger.pr, &body).await?;
                Ok(SyncOutcome::CommentCreated)
            }
        }
    }
}
