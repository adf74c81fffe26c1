//! Sightline API Server Binary
//!
//! Configuration is read from the environment; see
//! [`sightline_api::config`] for the full list.
//!
//! # Example
//!
//! ```bash
//! export USE_LOCAL_STORAGE=true
//! export ENRICHMENT_ENABLED=false
//! export API_PORT=3000
//! cargo run --bin sightline-api
//! curl -X POST 'http://localhost:3000/events?page=home&ref=ad'
//! ```

use std::sync::Arc;

use anyhow::Context;
use sightline_api::{create_router, serve, AppState, ServerConfig};
use sightline_geo::{build_http_client, CredentialCache, GeoEnricher, LocalSecretStore};
use sightline_queue::{
    BridgeRule, HttpQueueSender, InMemoryFifoQueue, QueueSender, DEFAULT_DEDUP_WINDOW,
};
use sightline_storage::{build_object_store, EventWriter, StorageBackend, JSON_CONTENT_TYPE};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Sightline API starting...");

    let config = ServerConfig::from_env()?;

    info!("Configuration:");
    info!("  Storage backend: {:?}", config.storage.backend);
    info!("  Bucket: {}", config.storage.bucket);
    info!("  Key layout: {:?}", config.key_layout);
    info!("  Enrichment: {}", config.enrichment_enabled);
    info!("  Invocation timeout: {:?}", config.invocation_timeout());
    info!("  Trust X-Forwarded-For: {}", config.trust_forwarded_for);

    // Object store
    let store = build_object_store(&config.storage).context("failed to build object store")?;
    let mut writer = EventWriter::new(store);
    if let Some(prefix) = &config.storage.prefix {
        writer = writer.with_prefix(prefix.clone());
    }
    if config.storage.backend == StorageBackend::S3 {
        writer = writer.with_content_type(JSON_CONTENT_TYPE);
    }
    info!("✓ Object store ready");

    let mut state = AppState::new(writer);
    state.key_layout = config.key_layout;
    state.invocation_timeout = config.invocation_timeout();
    state.trust_forwarded_for = config.trust_forwarded_for;

    // Geolocation. The secret is fetched once and kept for the life of the
    // process; rotating it requires a restart.
    if config.enrichment_enabled {
        let secret_id = config
            .secret_id
            .clone()
            .context("SECRET is required when enrichment is enabled")?;
        let credentials = CredentialCache::new(Arc::new(LocalSecretStore), secret_id);
        let http = build_http_client(config.invocation_timeout())?;
        let enricher = GeoEnricher::from_credentials(&credentials, http)
            .await
            .context("failed to configure geolocation")?;
        info!("✓ Geolocation enabled ({})", enricher.locator_name());
        state = state.with_enricher(enricher);
    }

    // Queue bridge
    let queue: Arc<dyn QueueSender> = match &config.queue_url {
        Some(url) => {
            info!("✓ Queue bridge -> {}", url);
            let http = reqwest::Client::builder()
                .timeout(config.invocation_timeout())
                .build()?;
            Arc::new(HttpQueueSender::new(http, url.clone()))
        }
        None => {
            warn!(
                "QUEUE_URL not set; /queue goes to an in-process FIFO queue that keeps the newest {} messages per group",
                config.queue_max_depth
            );
            Arc::new(InMemoryFifoQueue::with_limits(
                DEFAULT_DEDUP_WINDOW,
                config.queue_max_depth,
            ))
        }
    };
    state = state.with_queue(BridgeRule::new(config.message_group_id.clone()), queue);

    serve(create_router(state), config.port).await
}
