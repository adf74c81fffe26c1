//! Server configuration.
//!
//! # Environment Variables
//!
//! - `BUCKET`: destination bucket (required unless local storage is used)
//! - `SECRET`: identifier of the geolocation secret (`env:NAME`,
//!   `file:/path`, or a bare env var name); required when enrichment is on
//! - `API_PORT`: HTTP port (default: 3000)
//! - `AWS_REGION`: AWS region (default: us-east-1)
//! - `S3_ENDPOINT`: MinIO/localstack endpoint (optional)
//! - `USE_LOCAL_STORAGE`: write to the local filesystem instead of S3
//! - `LOCAL_STORAGE_PATH`: local storage root (default: ./data/events)
//! - `STORAGE_PREFIX`: key prefix (optional)
//! - `KEY_LAYOUT`: `clock` or `nested` (default: clock)
//! - `ENRICHMENT_ENABLED`: geolocation enrichment (default: true)
//! - `INVOCATION_TIMEOUT_SECS`: per-request budget (default: 15)
//! - `TRUST_FORWARDED_FOR`: take the client address from `X-Forwarded-For`
//!   (default: false)
//! - `QUEUE_URL`: queue endpoint for `/queue` (default: in-process queue)
//! - `QUEUE_MESSAGE_GROUP_ID`: FIFO ordering group (default: analytics)
//! - `QUEUE_MAX_DEPTH`: messages kept per group by the in-process queue;
//!   the oldest is dropped when full (default: 1000)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sightline_core::KeyLayout;
use sightline_queue::{DEFAULT_MAX_DEPTH, DEFAULT_MESSAGE_GROUP_ID};
use sightline_storage::{StorageBackend, StorageConfig};

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub key_layout: KeyLayout,

    #[serde(default = "default_true")]
    pub enrichment_enabled: bool,

    pub secret_id: Option<String>,

    #[serde(default = "default_invocation_timeout_secs")]
    pub invocation_timeout_secs: u64,

    #[serde(default)]
    pub trust_forwarded_for: bool,

    pub queue_url: Option<String>,

    #[serde(default = "default_message_group_id")]
    pub message_group_id: String,

    #[serde(default = "default_queue_max_depth")]
    pub queue_max_depth: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            storage: StorageConfig::default(),
            key_layout: KeyLayout::default(),
            enrichment_enabled: true,
            secret_id: None,
            invocation_timeout_secs: default_invocation_timeout_secs(),
            trust_forwarded_for: false,
            queue_url: None,
            message_group_id: default_message_group_id(),
            queue_max_depth: default_queue_max_depth(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_invocation_timeout_secs() -> u64 {
    15
}

fn default_message_group_id() -> String {
    DEFAULT_MESSAGE_GROUP_ID.to_string()
}

fn default_queue_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn flag(value: &str) -> bool {
    value == "true" || value == "1"
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();

        if let Some(port) = var("API_PORT").and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        let storage = &mut config.storage;
        if var("USE_LOCAL_STORAGE").is_some_and(|v| flag(&v)) {
            storage.backend = StorageBackend::Local;
        }
        if let Some(bucket) = var("BUCKET") {
            storage.bucket = bucket;
        }
        if let Some(region) = var("AWS_REGION") {
            storage.region = region;
        }
        storage.endpoint = var("S3_ENDPOINT");
        if let Some(path) = var("LOCAL_STORAGE_PATH") {
            storage.local_path = path.into();
        }
        storage.prefix = var("STORAGE_PREFIX").filter(|p| !p.is_empty());

        if let Some(layout) = var("KEY_LAYOUT") {
            config.key_layout = KeyLayout::from_str_config(&layout)
                .map_err(|e| ApiError::Config(e.to_string()))?;
        }
        if let Some(enabled) = var("ENRICHMENT_ENABLED") {
            config.enrichment_enabled = flag(&enabled);
        }
        config.secret_id = var("SECRET").filter(|s| !s.is_empty());
        if let Some(secs) = var("INVOCATION_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            config.invocation_timeout_secs = secs;
        }
        config.trust_forwarded_for = var("TRUST_FORWARDED_FOR").is_some_and(|v| flag(&v));
        config.queue_url = var("QUEUE_URL").filter(|u| !u.is_empty());
        if let Some(group) = var("QUEUE_MESSAGE_GROUP_ID").filter(|g| !g.is_empty()) {
            config.message_group_id = group;
        }
        if let Some(depth) = var("QUEUE_MAX_DEPTH").and_then(|d| d.parse::<usize>().ok()) {
            config.queue_max_depth = depth;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(ApiError::Config(
                "BUCKET is required unless USE_LOCAL_STORAGE is set".to_string(),
            ));
        }
        if self.enrichment_enabled && self.secret_id.is_none() {
            return Err(ApiError::Config(
                "SECRET is required when enrichment is enabled".to_string(),
            ));
        }
        if self.invocation_timeout_secs == 0 {
            return Err(ApiError::Config(
                "INVOCATION_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        if self.queue_max_depth == 0 {
            return Err(ApiError::Config("QUEUE_MAX_DEPTH must be positive".to_string()));
        }
        Ok(())
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_minimal_s3_config() {
        let config = from_pairs(&[("BUCKET", "123456789012-analytics"), ("SECRET", "GEO_KEY")])
            .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "123456789012-analytics");
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.key_layout, KeyLayout::Clock);
        assert!(config.enrichment_enabled);
        assert_eq!(config.secret_id.as_deref(), Some("GEO_KEY"));
        assert_eq!(config.invocation_timeout(), Duration::from_secs(15));
        assert!(!config.trust_forwarded_for);
        assert!(config.queue_url.is_none());
        assert_eq!(config.message_group_id, "analytics");
        assert_eq!(config.queue_max_depth, 1000);
    }

    #[test]
    fn test_local_config_without_enrichment() {
        let config = from_pairs(&[
            ("USE_LOCAL_STORAGE", "true"),
            ("LOCAL_STORAGE_PATH", "/tmp/events"),
            ("STORAGE_PREFIX", "events"),
            ("ENRICHMENT_ENABLED", "false"),
            ("KEY_LAYOUT", "nested"),
            ("API_PORT", "8080"),
            ("INVOCATION_TIMEOUT_SECS", "3"),
            ("TRUST_FORWARDED_FOR", "1"),
            ("QUEUE_URL", "http://localhost:4566/000000000000/analytics.fifo"),
            ("QUEUE_MESSAGE_GROUP_ID", "web"),
            ("QUEUE_MAX_DEPTH", "50"),
        ])
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.local_path, std::path::PathBuf::from("/tmp/events"));
        assert_eq!(config.storage.prefix.as_deref(), Some("events"));
        assert!(!config.enrichment_enabled);
        assert_eq!(config.key_layout, KeyLayout::Nested);
        assert_eq!(config.port, 8080);
        assert_eq!(config.invocation_timeout(), Duration::from_secs(3));
        assert!(config.trust_forwarded_for);
        assert!(config.queue_url.is_some());
        assert_eq!(config.message_group_id, "web");
        assert_eq!(config.queue_max_depth, 50);
    }

    #[test]
    fn test_zero_queue_depth_rejected() {
        let err = from_pairs(&[
            ("BUCKET", "events"),
            ("ENRICHMENT_ENABLED", "false"),
            ("QUEUE_MAX_DEPTH", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("QUEUE_MAX_DEPTH"));
    }

    #[test]
    fn test_bucket_required_for_s3() {
        let err = from_pairs(&[("SECRET", "GEO_KEY")]).unwrap_err();
        assert!(err.to_string().contains("BUCKET"));
    }

    #[test]
    fn test_secret_required_for_enrichment() {
        let err = from_pairs(&[("BUCKET", "events")]).unwrap_err();
        assert!(err.to_string().contains("SECRET"));

        let config = from_pairs(&[("BUCKET", "events"), ("ENRICHMENT_ENABLED", "false")]);
        assert!(config.is_ok());
    }

    #[test]
    fn test_invalid_layout() {
        let err = from_pairs(&[
            ("BUCKET", "events"),
            ("SECRET", "GEO_KEY"),
            ("KEY_LAYOUT", "flat"),
        ])
        .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = from_pairs(&[
            ("BUCKET", "events"),
            ("ENRICHMENT_ENABLED", "false"),
            ("INVOCATION_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("INVOCATION_TIMEOUT_SECS"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"storage": {"bucket": "events"}, "key_layout": "nested"}"#)
                .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.key_layout, KeyLayout::Nested);
        assert_eq!(config.message_group_id, "analytics");
        assert!(config.enrichment_enabled);
    }
}
