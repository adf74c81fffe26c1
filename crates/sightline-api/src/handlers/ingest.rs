//! Synchronous event ingestion endpoint

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
};
use sightline_core::RawEvent;

use crate::{extract::observe, pipeline, AppState, Result};

/// `POST /events?foo=bar`
///
/// Query parameters become the event. Responds `200` with an empty body
/// once the event is stored, `500` otherwise.
pub async fn ingest(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<StatusCode> {
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let observed = observe(
        &headers,
        peer,
        state.trust_forwarded_for,
        state.clock.as_ref(),
    )?;

    let key = pipeline::ingest(&state, RawEvent::from_pairs(params), observed).await?;
    tracing::debug!(key = %key, "event ingested");

    Ok(StatusCode::OK)
}
