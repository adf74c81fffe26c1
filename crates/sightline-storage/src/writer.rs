//! Event writer.
//!
//! One `put` per event at `[prefix/]<key>`. Objects are never read back,
//! updated or deleted by the service.

use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload};
use sightline_core::StorageKey;

use crate::error::Result;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct EventWriter {
    store: Arc<dyn ObjectStore>,
    prefix: Option<String>,
    content_type: Option<String>,
}

impl EventWriter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            prefix: None,
            content_type: None,
        }
    }

    /// Prepend `prefix` to every key. Leading and trailing slashes are
    /// ignored; an empty prefix means none.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Attach a content type to written objects. Only set this for backends
    /// that store attributes (S3); the local filesystem store rejects them.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn object_path(&self, key: &StorageKey) -> ObjectPath {
        match &self.prefix {
            Some(prefix) => ObjectPath::from(format!("{}/{}", prefix, key)),
            None => ObjectPath::from(key.as_str()),
        }
    }

    /// Store `body` under `key`. A same-key object is replaced.
    pub async fn write(&self, key: &StorageKey, body: Bytes) -> Result<()> {
        let path = self.object_path(key);
        let size = body.len();

        let mut attributes = Attributes::new();
        if let Some(content_type) = &self.content_type {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.clone()),
            );
        }
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        if let Err(e) = self
            .store
            .put_opts(&path, PutPayload::from(body), opts)
            .await
        {
            tracing::error!(key = %path, error = %e, "failed to write event");
            return Err(e.into());
        }

        tracing::info!(key = %path, bytes = size, "wrote event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use object_store::memory::InMemory;

    fn key() -> StorageKey {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::microseconds(6);
        StorageKey::from_time(&time)
    }

    async fn read(store: &Arc<dyn ObjectStore>, path: &str) -> Bytes {
        store
            .get(&ObjectPath::from(path))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
    }

    // ---------------------------------------------------------------
    // Paths
    // ---------------------------------------------------------------

    #[test]
    fn test_object_path_without_prefix() {
        let writer = EventWriter::new(Arc::new(InMemory::new()));
        assert_eq!(
            writer.object_path(&key()).as_ref(),
            "2024/01/02/03:04:05.000006"
        );
    }

    #[test]
    fn test_object_path_with_prefix() {
        let writer = EventWriter::new(Arc::new(InMemory::new())).with_prefix("/events/");
        assert_eq!(
            writer.object_path(&key()).as_ref(),
            "events/2024/01/02/03:04:05.000006"
        );
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let writer = EventWriter::new(Arc::new(InMemory::new())).with_prefix("/");
        assert_eq!(
            writer.object_path(&key()).as_ref(),
            "2024/01/02/03:04:05.000006"
        );
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn test_write_stores_body() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let writer = EventWriter::new(store.clone());

        writer
            .write(&key(), Bytes::from_static(br#"{"foo":"bar"}"#))
            .await
            .unwrap();

        let body = read(&store, "2024/01/02/03:04:05.000006").await;
        assert_eq!(&body[..], br#"{"foo":"bar"}"#);
    }

    #[tokio::test]
    async fn test_same_key_last_write_wins() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let writer = EventWriter::new(store.clone());

        writer.write(&key(), Bytes::from_static(b"{\"n\":1}")).await.unwrap();
        writer.write(&key(), Bytes::from_static(b"{\"n\":2}")).await.unwrap();

        let body = read(&store, "2024/01/02/03:04:05.000006").await;
        assert_eq!(&body[..], b"{\"n\":2}");
    }

    #[tokio::test]
    async fn test_content_type_attribute() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let writer = EventWriter::new(store.clone()).with_content_type(JSON_CONTENT_TYPE);

        writer.write(&key(), Bytes::from_static(b"{}")).await.unwrap();

        let result = store
            .get(&ObjectPath::from("2024/01/02/03:04:05.000006"))
            .await
            .unwrap();
        let content_type: Option<&str> = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref());
        assert_eq!(content_type, Some(JSON_CONTENT_TYPE));
    }
}
