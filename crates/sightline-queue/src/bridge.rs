//! Declarative request rewrite.
//!
//! A [`BridgeRule`] maps an inbound `POST` with a JSON body onto a
//! [`SendMessageRequest`]. Nothing else passes through: other methods and
//! content types are rejected, never forwarded.

use crate::error::{BridgeError, BridgeResult};
use crate::message::SendMessageRequest;

pub const DEFAULT_MESSAGE_GROUP_ID: &str = "analytics";

/// Body of the fixed response returned once a message was handed off.
pub const SYNTHETIC_RESPONSE_BODY: &str = "{}";

const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeRule {
    message_group_id: String,
}

impl Default for BridgeRule {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_GROUP_ID)
    }
}

impl BridgeRule {
    /// Every message produced by this rule lands in `message_group_id`,
    /// so the queue delivers all of them in one global order.
    pub fn new(message_group_id: impl Into<String>) -> Self {
        Self {
            message_group_id: message_group_id.into(),
        }
    }

    pub fn message_group_id(&self) -> &str {
        &self.message_group_id
    }

    pub fn translate(
        &self,
        method: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> BridgeResult<SendMessageRequest> {
        if !method.eq_ignore_ascii_case("POST") {
            return Err(BridgeError::MethodNotAllowed(method.to_string()));
        }

        let content_type = content_type.unwrap_or_default();
        if !is_json(content_type) {
            return Err(BridgeError::UnsupportedMediaType(content_type.to_string()));
        }

        let text = std::str::from_utf8(body)
            .map_err(|e| BridgeError::MalformedBody(e.to_string()))?;
        serde_json::from_str::<serde_json::Value>(text)
            .map_err(|e| BridgeError::MalformedBody(e.to_string()))?;

        Ok(SendMessageRequest::new(self.message_group_id.clone(), text))
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media| media.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}
