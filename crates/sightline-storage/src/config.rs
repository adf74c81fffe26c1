//! Storage Configuration
//!
//! ## StorageConfig
//!
//! - **backend**: `s3` (default), `local` or `memory`
//! - **bucket**: destination bucket, required for S3
//! - **region**: AWS region or MinIO region (default: us-east-1)
//! - **endpoint**: optional custom S3 endpoint (MinIO/localstack); enables plain HTTP
//! - **local_path**: root directory for the local backend (default: ./data/events)
//! - **prefix**: optional key prefix, e.g. `events`
//!
//! Credentials for S3 come from the standard `AWS_*` environment variables.
//!
//! ## Usage
//!
//! ```ignore
//! use sightline_storage::{build_object_store, StorageConfig};
//!
//! let config = StorageConfig {
//!     bucket: "123456789012-analytics".to_string(),
//!     ..Default::default()
//! };
//! let store = build_object_store(&config)?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Local,
    Memory,
}

impl StorageBackend {
    /// Parse from a string (case-insensitive).
    pub fn from_str_config(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(StorageError::Config(format!(
                "unknown storage backend: '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    pub endpoint: Option<String>,

    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    pub prefix: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            local_path: default_local_path(),
            prefix: None,
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./data/events")
}

/// Build the object store selected by `config`.
pub fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::S3 => {
            if config.bucket.is_empty() {
                return Err(StorageError::Config(
                    "an S3 bucket is required".to_string(),
                ));
            }
            let mut builder = AmazonS3Builder::from_env()
                .with_bucket_name(&config.bucket)
                .with_region(&config.region);
            if let Some(endpoint) = &config.endpoint {
                builder = builder.with_endpoint(endpoint).with_allow_http(true);
            }
            Ok(Arc::new(builder.build()?))
        }
        StorageBackend::Local => {
            std::fs::create_dir_all(&config.local_path)?;
            Ok(Arc::new(LocalFileSystem::new_with_prefix(&config.local_path)?))
        }
        StorageBackend::Memory => Ok(Arc::new(InMemory::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::S3);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.local_path, PathBuf::from("./data/events"));
        assert!(config.prefix.is_none());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!(StorageBackend::from_str_config("S3").unwrap(), StorageBackend::S3);
        assert_eq!(StorageBackend::from_str_config("local").unwrap(), StorageBackend::Local);
        assert_eq!(StorageBackend::from_str_config("Memory").unwrap(), StorageBackend::Memory);
        assert!(StorageBackend::from_str_config("gcs").is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: StorageConfig =
            serde_json::from_str(r#"{"backend": "s3", "bucket": "events"}"#).unwrap();
        assert_eq!(config.bucket, "events");
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_s3_requires_bucket() {
        let config = StorageConfig::default();
        assert!(matches!(
            build_object_store(&config),
            Err(StorageError::Config(_))
        ));
    }

    #[test]
    fn test_build_s3_with_endpoint() {
        let config = StorageConfig {
            bucket: "events".to_string(),
            endpoint: Some("http://localhost:9000".to_string()),
            ..Default::default()
        };
        assert!(build_object_store(&config).is_ok());
    }

    #[test]
    fn test_build_local_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("events");
        let config = StorageConfig {
            backend: StorageBackend::Local,
            local_path: root.clone(),
            ..Default::default()
        };
        build_object_store(&config).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_build_memory() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        assert!(build_object_store(&config).is_ok());
    }
}
