//! Sightline Queue
//!
//! Bridges JSON `POST` bodies onto a FIFO queue's form-encoded
//! `SendMessage` protocol.
//!
//! ```text
//! POST /queue  {"x":1}
//!     -> Action=SendMessage&MessageGroupId=analytics&MessageBody=%7B%22x%22%3A1%7D
//!     <- 200 {}
//! ```
//!
//! Translation is a pure rule ([`BridgeRule`]); delivery goes through a
//! [`QueueSender`]. The caller always answers with the synthetic `{}` once
//! translation succeeded.

pub mod bridge;
pub mod error;
pub mod fifo;
pub mod message;
pub mod sender;

pub use bridge::{BridgeRule, DEFAULT_MESSAGE_GROUP_ID, SYNTHETIC_RESPONSE_BODY};
pub use error::{BridgeError, BridgeResult, QueueError, Result};
pub use fifo::{InMemoryFifoQueue, QueueMessage, DEFAULT_DEDUP_WINDOW, DEFAULT_MAX_DEPTH};
pub use message::{SendMessageRequest, FORM_CONTENT_TYPE, SEND_MESSAGE_ACTION};
pub use sender::{HttpQueueSender, QueueSender, SendOutcome};
