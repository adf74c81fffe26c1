//! Queue error types.

use thiserror::Error;

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
pub type Result<T> = std::result::Result<T, QueueError>;

/// Rejections produced while rewriting an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("malformed body: {0}")]
    MalformedBody(String),
}

impl BridgeError {
    /// HTTP status the gateway answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            BridgeError::UnsupportedMediaType(_) => 415,
            BridgeError::MethodNotAllowed(_) => 405,
            BridgeError::MalformedBody(_) => 400,
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("queue returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unknown message group: {0}")]
    UnknownGroup(String),
}
