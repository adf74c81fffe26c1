//! Sightline Storage
//!
//! Persists events as one immutable object per event.
//!
//! ## Layout
//!
//! ```text
//! s3://<bucket>/[<prefix>/]2024/01/02/03:04:05.000006   {"foo":"bar","user_agent":...}
//! ```
//!
//! The writer performs a single `put` per event and does not retry. A
//! failed write fails the request that produced the event.

pub mod config;
pub mod error;
pub mod writer;

pub use config::{build_object_store, StorageBackend, StorageConfig};
pub use error::{Result, StorageError};
pub use writer::{EventWriter, JSON_CONTENT_TYPE};
