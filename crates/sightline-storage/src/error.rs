//! Storage error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_display() {
        let err = StorageError::Config("missing bucket".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing bucket");
    }

    #[test]
    fn test_from_object_store_error() {
        let err: StorageError = object_store::Error::NotFound {
            path: "2024/01/02/03:04:05.000006".to_string(),
            source: "gone".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Object store error"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
