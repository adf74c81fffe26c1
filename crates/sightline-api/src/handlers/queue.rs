//! Queue bridge endpoint

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use sightline_queue::{SendOutcome, SYNTHETIC_RESPONSE_BODY};

use crate::AppState;

/// `POST /queue` with a JSON body.
///
/// The body is forwarded verbatim as one FIFO message. Once the rewrite
/// succeeds the answer is always `200 {}`; queue-side failures are only
/// logged.
pub async fn send_message(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let request = match state.bridge.translate(method.as_str(), content_type, &body) {
        Ok(request) => request,
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            tracing::warn!(status = status.as_u16(), error = %e, "queue request rejected");
            return (status, Json(json!({ "message": e.to_string() }))).into_response();
        }
    };

    match state.queue.send(&request).await {
        Ok(SendOutcome::Queued) => {
            tracing::debug!(group = %request.message_group_id, "message queued");
        }
        Ok(SendOutcome::Deduplicated) => {
            tracing::debug!(group = %request.message_group_id, "duplicate message dropped by queue");
        }
        Err(e) => {
            tracing::error!(group = %request.message_group_id, error = %e, "queue send failed");
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        SYNTHETIC_RESPONSE_BODY,
    )
        .into_response()
}
