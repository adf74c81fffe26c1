//! Error types for sightline-core.
//!
//! Normalization and key generation are total, so the only failures here
//! come from decoding keys, parsing configuration values and serializing
//! records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid key layout: '{0}'")]
    InvalidLayout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
