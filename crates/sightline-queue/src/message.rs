//! `SendMessage` request encoding.

use std::borrow::Cow;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const SEND_MESSAGE_ACTION: &str = "SendMessage";

/// A message bound for one FIFO ordering group. The body is the inbound
/// request body, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub message_group_id: String,
    pub message_body: String,
}

impl SendMessageRequest {
    pub fn new(message_group_id: impl Into<String>, message_body: impl Into<String>) -> Self {
        Self {
            message_group_id: message_group_id.into(),
            message_body: message_body.into(),
        }
    }

    /// Render as `Action=SendMessage&MessageGroupId=..&MessageBody=..`.
    pub fn to_form(&self) -> String {
        let pairs: [(&str, Cow<'_, str>); 3] = [
            ("Action", Cow::Borrowed(SEND_MESSAGE_ACTION)),
            ("MessageGroupId", urlencoding::encode(&self.message_group_id)),
            ("MessageBody", urlencoding::encode(&self.message_body)),
        ];
        pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}
