//! API error types.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sightline_core::CoreError;
use sightline_storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request has no peer address")]
    MissingPeerAddress,

    #[error("failed to serialize event: {0}")]
    Serialization(#[from] CoreError),

    #[error("storage write failed: {0}")]
    Storage(#[from] StorageError),

    #[error("invocation exceeded its {0:?} budget")]
    Timeout(Duration),
}

/// Ingestion failures answer `500` with an empty body. The cause only
/// goes to the log.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "event ingestion failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
