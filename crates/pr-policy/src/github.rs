//! # GitHub REST Store
//!
//! [`PrStore`] implementation backed by the GitHub REST API. Pull request
//! comments and labels live on the issue endpoints:
//!
//! - `GET    /repos/{owner}/{repo}/issues/{number}/comments`
//! - `POST   /repos/{owner}/{repo}/issues/{number}/comments`
//! - `PATCH  /repos/{owner}/{repo}/issues/comments/{id}`
//! - `DELETE /repos/{owner}/{repo}/issues/comments/{id}`
//! - `POST   /repos/{owner}/{repo}/issues/{number}/labels`
//! - `DELETE /repos/{owner}/{repo}/issues/{number}/labels/{name}`

use crate::error::{GitHubError, Result};
use crate::store::{Comment, PrRef, PrStore};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Page size for comment listing (GitHub maximum)
const PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
struct GitHubApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubComment {
    id: u64,
    body: Option<String>,
    user: Option<GitHubUser>,
}

impl From<GitHubComment> for Comment {
    fn from(comment: GitHubComment) -> Self {
        Self {
            id: comment.id,
            author: comment.user.map(|user| user.login).unwrap_or_default(),
            body: comment.body.unwrap_or_default(),
        }
    }
}

/// GitHub API client for PR comments and labels
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: HttpClient,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for `base_url` (normally `https://api.github.com`)
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("pr-policy/1.0"));

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(GitHubError::from)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn issue_url(&self, pr: &PrRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}{suffix}",
            self.base_url, pr.repository.owner, pr.repository.repo, pr.number
        )
    }

    fn comment_url(&self, pr: &PrRef, comment_id: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/comments/{comment_id}",
            self.base_url, pr.repository.owner, pr.repository.repo
        )
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, GitHubError> {
        let mut request = self
            .http_client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));

        if let Some(body) = body {
            request = request.json(&body);
        }

        Ok(request.send().await?)
    }

    /// Turn a non-success response into an API error
    async fn check(response: Response) -> Result<Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GitHubApiError>(&text)
            .map(|e| e.message)
            .unwrap_or(text);

        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PrStore for GitHubClient {
    #[instrument(skip(self), fields(pr = %pr))]
    async fn list_comments(&self, pr: &PrRef) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();

        for page in 1.. {
            let url = self.issue_url(pr, &format!("/comments?per_page={PER_PAGE}&page={page}"));
            let response = Self::check(self.send(Method::GET, &url, None).await?).await?;
            let batch: Vec<GitHubComment> = response.json().await.map_err(GitHubError::from)?;
            let fetched = batch.len();

            comments.extend(batch.into_iter().map(Comment::from));
            if fetched < PER_PAGE {
                break;
            }
        }

        debug!(count = comments.len(), "Listed PR comments");
        Ok(comments)
    }

    #[instrument(skip(self, body), fields(pr = %pr, body_len = body.len()))]
    async fn create_comment(&self, pr: &PrRef, body: &str) -> Result<()> {
        let url = self.issue_url(pr, "/comments");
        let payload = serde_json::json!({ "body": body });
        Self::check(self.send(Method::POST, &url, Some(payload)).await?).await?;

        info!("Created comment");
        Ok(())
    }

    #[instrument(skip(self, body), fields(pr = %pr, body_len = body.len()))]
    async fn update_comment(&self, pr: &PrRef, comment_id: u64, body: &str) -> Result<()> {
        let url = self.comment_url(pr, comment_id);
        let payload = serde_json::json!({ "body": body });
        Self::check(self.send(Method::PATCH, &url, Some(payload)).await?).await?;

        info!("Updated comment");
        Ok(())
    }

    #[instrument(skip(self), fields(pr = %pr))]
    async fn delete_comment(&self, pr: &PrRef, comment_id: u64) -> Result<()> {
        let url = self.comment_url(pr, comment_id);
        let response = self.send(Method::DELETE, &url, None).await?;

        if response.status().as_u16() == 404 {
            debug!("Comment already deleted");
            return Ok(());
        }
        Self::check(response).await?;

        info!("Deleted comment");
        Ok(())
    }

    #[instrument(skip(self), fields(pr = %pr, labels = ?labels))]
    async fn add_labels(&self, pr: &PrRef, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }

        let url = self.issue_url(pr, "/labels");
        let payload = serde_json::json!({ "labels": labels });
        Self::check(self.send(Method::POST, &url, Some(payload)).await?).await?;

        info!(count = labels.len(), "Added labels");
        Ok(())
    }

    #[instrument(skip(self), fields(pr = %pr, label = %label))]
    async fn remove_label(&self, pr: &PrRef, label: &str) -> Result<()> {
        let url = self.issue_url(pr, &format!("/labels/{}", urlencoding::encode(label)));
        let response = self.send(Method::DELETE, &url, None).await?;

        if response.status().as_u16() == 404 {
            // Label not on the PR, which is fine for removal
            debug!("Label already absent");
            return Ok(());
        }
        Self::check(response).await?;

        info!("Removed label");
        Ok(())
    }
}
