//! Queue senders.

use async_trait::async_trait;

use crate::error::{QueueError, Result};
use crate::message::{SendMessageRequest, FORM_CONTENT_TYPE};

/// What the queue did with a message it accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    /// Same content already queued inside the deduplication window.
    Deduplicated,
}

#[async_trait]
pub trait QueueSender: Send + Sync {
    async fn send(&self, request: &SendMessageRequest) -> Result<SendOutcome>;
}

/// Posts the form-encoded `SendMessage` call to a queue endpoint.
///
/// Requests are sent unsigned; point `endpoint` at a gateway or local
/// queue that accepts them.
#[derive(Debug, Clone)]
pub struct HttpQueueSender {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpQueueSender {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueueSender for HttpQueueSender {
    async fn send(&self, request: &SendMessageRequest) -> Result<SendOutcome> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(request.to_form())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::Status {
                status: status.as_u16(),
                body: body.chars().take(512).collect(),
            });
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            group = %request.message_group_id,
            "message sent"
        );
        Ok(SendOutcome::Queued)
    }
}
