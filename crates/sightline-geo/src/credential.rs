//! Provider credentials.
//!
//! The geolocation API key is fetched from a secret store once, when the
//! process starts, and reused by every request. [`CredentialCache`] is the
//! only writer and it writes exactly once; afterwards the value is shared
//! read-only across tasks. A rotated secret is picked up on restart only.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::{GeoError, Result};

/// API key for a geolocation provider. Redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

/// Where a secret identifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable holding the secret value.
    Env(String),
    /// File holding the secret value (e.g. a mounted secret volume).
    File(PathBuf),
}

impl SecretSource {
    /// `env:NAME`, `file:/path`, or a bare environment variable name.
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        let source = if let Some(path) = identifier.strip_prefix("file:") {
            SecretSource::File(PathBuf::from(path))
        } else {
            SecretSource::Env(identifier.strip_prefix("env:").unwrap_or(identifier).to_string())
        };
        match &source {
            SecretSource::Env(name) if name.is_empty() => {
                Err(GeoError::Secret("empty secret identifier".to_string()))
            }
            SecretSource::File(path) if path.as_os_str().is_empty() => {
                Err(GeoError::Secret("empty secret path".to_string()))
            }
            _ => Ok(source),
        }
    }
}

/// Source of secret values, keyed by identifier.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<String>;
}

/// Reads secrets from the process environment or the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSecretStore;

#[async_trait]
impl SecretStore for LocalSecretStore {
    async fn fetch(&self, identifier: &str) -> Result<String> {
        let value = match SecretSource::parse(identifier)? {
            SecretSource::Env(name) => std::env::var(&name).map_err(|e| {
                GeoError::Secret(format!("reading environment variable '{}': {}", name, e))
            })?,
            SecretSource::File(path) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                GeoError::Secret(format!("reading secret file '{}': {}", path.display(), e))
            })?,
        };

        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(GeoError::Secret(format!("secret '{}' is empty", identifier)));
        }
        Ok(value)
    }
}

/// Process-wide, fetch-once cache for one secret.
pub struct CredentialCache {
    store: Arc<dyn SecretStore>,
    identifier: String,
    value: OnceCell<Arc<String>>,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn SecretStore>, identifier: impl Into<String>) -> Self {
        Self {
            store,
            identifier: identifier.into(),
            value: OnceCell::new(),
        }
    }

    /// Return the secret, fetching it on first use.
    ///
    /// Concurrent first callers wait on a single fetch. A failed fetch
    /// leaves the cache empty so the next call retries.
    pub async fn get(&self) -> Result<Arc<String>> {
        self.value
            .get_or_try_init(|| async {
                tracing::info!(secret = %self.identifier, "fetching geolocation credential");
                self.store.fetch(&self.identifier).await.map(Arc::new)
            })
            .await
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SecretStore for CountingStore {
        async fn fetch(&self, identifier: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeoError::Secret(format!("{} unavailable", identifier)));
            }
            Ok(format!("key-for-{}", identifier))
        }
    }

    #[test]
    fn test_debug_redacts_value() {
        let cred = ApiCredential::new("super-secret");
        assert_eq!(format!("{:?}", cred), "ApiCredential(***)");
        assert_eq!(cred.expose(), "super-secret");
    }

    #[test]
    fn test_secret_source_parse() {
        assert_eq!(
            SecretSource::parse("env:GEO_KEY").unwrap(),
            SecretSource::Env("GEO_KEY".to_string())
        );
        assert_eq!(
            SecretSource::parse("GEO_KEY").unwrap(),
            SecretSource::Env("GEO_KEY".to_string())
        );
        assert_eq!(
            SecretSource::parse("file:/run/secrets/geo").unwrap(),
            SecretSource::File(PathBuf::from("/run/secrets/geo"))
        );
        assert!(SecretSource::parse("").is_err());
        assert!(SecretSource::parse("env:").is_err());
        assert!(SecretSource::parse("file:").is_err());
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let cache = Arc::new(CredentialCache::new(store.clone(), "geo"));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get().await.unwrap() }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().as_str(), "key-for-geo");
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        cache.get().await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_retries_after_failure() {
        let store = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let cache = CredentialCache::new(store.clone(), "geo");
        assert!(cache.get().await.is_err());
        assert!(cache.get().await.is_err());
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_local_store_env() {
        std::env::set_var("SIGHTLINE_TEST_GEO_SECRET", "  abc123\n");
        let value = LocalSecretStore
            .fetch("env:SIGHTLINE_TEST_GEO_SECRET")
            .await
            .unwrap();
        assert_eq!(value, "abc123");
    }

    #[tokio::test]
    async fn test_local_store_missing_env() {
        let result = LocalSecretStore
            .fetch("SIGHTLINE_TEST_GEO_SECRET_DOES_NOT_EXIST")
            .await;
        assert!(matches!(result, Err(GeoError::Secret(_))));
    }

    #[tokio::test]
    async fn test_local_store_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();
        let id = format!("file:{}", file.path().display());
        assert_eq!(LocalSecretStore.fetch(&id).await.unwrap(), "from-file");
    }

    #[tokio::test]
    async fn test_local_store_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let id = format!("file:{}", file.path().display());
        assert!(LocalSecretStore.fetch(&id).await.is_err());
    }
}
