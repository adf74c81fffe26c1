//! Ingestion pipeline.
//!
//! `Received -> Normalized -> (Enriched | EnrichmentSkippedOnFailure) ->
//! Written -> Responded`
//!
//! Enrichment and the storage write run inside one invocation budget. A
//! slow geolocation lookup eats into the time left for the write, and when
//! the budget runs out the whole invocation fails even though enrichment
//! itself is fail-open.

use sightline_core::{
    normalize, EnrichedEvent, Enrichment, ObservedContext, RawEvent, StorageKey, UnenrichedReason,
};

use crate::error::{ApiError, Result};
use crate::AppState;

/// Run one event through the pipeline and return the key it was stored at.
pub async fn ingest(state: &AppState, raw: RawEvent, observed: ObservedContext) -> Result<StorageKey> {
    let budget = state.invocation_timeout;
    tokio::time::timeout(budget, run(state, raw, observed))
        .await
        .map_err(|_| ApiError::Timeout(budget))?
}

async fn run(state: &AppState, raw: RawEvent, observed: ObservedContext) -> Result<StorageKey> {
    let event = normalize(raw, &observed);

    let enrichment = match &state.enricher {
        Some(enricher) => enricher.enrich(event.source_ip()).await,
        None => Enrichment::Unenriched(UnenrichedReason::Disabled),
    };

    let key = event.storage_key(state.key_layout);
    let body = EnrichedEvent::new(event, enrichment).to_json_bytes()?;
    state.writer.write(&key, body).await?;

    Ok(key)
}
