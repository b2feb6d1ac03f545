//! In-memory [`PrStore`] that records every write, for tests.

use super::{Comment, PrRef, PrStore};
use crate::config::DEFAULT_BOT_LOGIN;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// A write issued against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    CreateComment(String),
    UpdateComment(u64, String),
    DeleteComment(u64),
    AddLabels(Vec<String>),
    RemoveLabel(String),
}

#[derive(Debug, Default)]
struct State {
    comments: Vec<Comment>,
    labels: BTreeSet<String>,
    next_id: u64,
    writes: Vec<Write>,
}

/// Cloning shares the underlying state
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(self, author: &str, body: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = state.next_id;
            state.comments.push(Comment {
                id,
                author: author.to_string(),
                body: body.to_string(),
            });
        }
        self
    }

    pub fn with_labels(self, labels: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .labels
            .extend(labels.iter().map(ToString::to_string));
        self
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn labels(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().labels.clone()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }
}

#[async_trait]
impl PrStore for MemoryStore {
    async fn list_comments(&self, _pr: &PrRef) -> Result<Vec<Comment>> {
        Ok(self.comments())
    }

    async fn create_comment(&self, _pr: &PrRef, body: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.comments.push(Comment {
            id,
            author: DEFAULT_BOT_LOGIN.to_string(),
            body: body.to_string(),
        });
        state.writes.push(Write::CreateComment(body.to_string()));
        Ok(())
    }

    async fn update_comment(&self, _pr: &PrRef, comment_id: u64, body: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(comment) = state.comments.iter_mut().find(|c| c.id == comment_id) {
            comment.body = body.to_string();
        }
        state
            .writes
            .push(Write::UpdateComment(comment_id, body.to_string()));
        Ok(())
    }

    async fn delete_comment(&self, _pr: &PrRef, comment_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.comments.retain(|c| c.id != comment_id);
        state.writes.push(Write::DeleteComment(comment_id));
        Ok(())
    }

    async fn add_labels(&self, _pr: &PrRef, labels: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.labels.extend(labels.iter().cloned());
        state.writes.push(Write::AddLabels(labels.to_vec()));
        Ok(())
    }

    async fn remove_label(&self, _pr: &PrRef, label: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.labels.remove(label);
        state.writes.push(Write::RemoveLabel(label.to_string()));
        Ok(())
    }
}
