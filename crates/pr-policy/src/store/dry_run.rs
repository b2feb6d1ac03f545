use super::{Comment, PrRef, PrStore};
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Store wrapper that reads through to `inner` and only logs writes
pub struct DryRunStore<S> {
    inner: S,
}

impl<S: PrStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: PrStore> PrStore for DryRunStore<S> {
    async fn list_comments(&self, pr: &PrRef) -> Result<Vec<Comment>> {
        self.inner.list_comments(pr).await
    }

    async fn create_comment(&self, pr: &PrRef, body: &str) -> Result<()> {
        info!(pr = %pr, body_len = body.len(), "[dry-run] would create comment");
        Ok(())
    }

    async fn update_comment(&self, pr: &PrRef, comment_id: u64, body: &str) -> Result<()> {
        info!(pr = %pr, comment_id, body_len = body.len(), "[dry-run] would update comment");
        Ok(())
    }

    async fn delete_comment(&self, pr: &PrRef, comment_id: u64) -> Result<()> {
        info!(pr = %pr, comment_id, "[dry-run] would delete comment");
        Ok(())
    }

    async fn add_labels(&self, pr: &PrRef, labels: &[String]) -> Result<()> {
        info!(pr = %pr, labels = ?labels, "[dry-run] would add labels");
        Ok(())
    }

    async fn remove_label(&self, pr: &PrRef, label: &str) -> Result<()> {
        info!(pr = %pr, label, "[dry-run] would remove label");
        Ok(())
    }
}
