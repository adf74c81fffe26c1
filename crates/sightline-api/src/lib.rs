//! Sightline Ingestion API
//!
//! HTTP front door for analytics events.
//!
//! - `POST /` and `POST /events`: normalize, optionally geo-enrich, and
//!   store one object per event. `200` with an empty body once written.
//! - `POST /queue`: rewrite a JSON body into a FIFO `SendMessage` call and
//!   answer `200 {}`.
//! - `GET /health`: liveness.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{any, get, post},
    Router,
};
use sightline_core::{Clock, KeyLayout, SystemClock};
use sightline_geo::GeoEnricher;
use sightline_queue::{BridgeRule, InMemoryFifoQueue, QueueSender};
use sightline_storage::EventWriter;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod pipeline;

pub use config::ServerConfig;
pub use error::{ApiError, Result};

pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Application state shared across handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub writer: EventWriter,
    /// `None` when enrichment is disabled for this deployment.
    pub enricher: Option<GeoEnricher>,
    pub clock: Arc<dyn Clock>,
    pub key_layout: KeyLayout,
    /// Shared by enrichment and the storage write.
    pub invocation_timeout: Duration,
    pub trust_forwarded_for: bool,
    pub bridge: BridgeRule,
    pub queue: Arc<dyn QueueSender>,
}

impl AppState {
    pub fn new(writer: EventWriter) -> Self {
        Self {
            writer,
            enricher: None,
            clock: Arc::new(SystemClock),
            key_layout: KeyLayout::default(),
            invocation_timeout: DEFAULT_INVOCATION_TIMEOUT,
            trust_forwarded_for: false,
            bridge: BridgeRule::default(),
            queue: Arc::new(InMemoryFifoQueue::new()),
        }
    }

    pub fn with_enricher(mut self, enricher: GeoEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_queue(mut self, bridge: BridgeRule, queue: Arc<dyn QueueSender>) -> Self {
        self.bridge = bridge;
        self.queue = queue;
        self
    }
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::ingest::ingest))
        .route("/events", post(handlers::ingest::ingest))
        // Every method reaches the bridge so it can answer 405 itself.
        .route("/queue", any(handlers::queue::send_message))
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the API server
pub async fn serve(router: Router, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Sightline API listening on {}", addr);
    tracing::info!("   Events: POST http://localhost:{}/events", port);
    tracing::info!("   Queue:  POST http://localhost:{}/queue", port);
    tracing::info!("   Health: http://localhost:{}/health", port);

    // The ingest handler needs the peer address.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;
    Ok(())
}
