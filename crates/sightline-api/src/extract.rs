//! Observed request context.
//!
//! The user agent, source address and capture time come from the
//! transport and the server clock, never from client parameters.

use std::net::{IpAddr, SocketAddr};

use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use sightline_core::{Clock, ObservedContext};

use crate::error::{ApiError, Result};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Build the [`ObservedContext`] for one request.
///
/// `X-Forwarded-For` is only consulted when `trust_forwarded_for` is set,
/// i.e. when a trusted proxy in front of the service owns that header. Its
/// first entry is the original client. An unparsable entry falls back to
/// the peer address.
pub fn observe(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
    clock: &dyn Clock,
) -> Result<ObservedContext> {
    let peer = peer.ok_or(ApiError::MissingPeerAddress)?;

    let mut source = peer.ip().to_canonical();
    if trust_forwarded_for {
        if let Some(forwarded) = forwarded_client(headers) {
            source = forwarded;
        }
    }

    let user_agent = headers
        .get(USER_AGENT)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();

    Ok(ObservedContext::new(user_agent, source.to_string(), clock.now()))
}

fn forwarded_client(headers: &HeaderMap) -> Option<IpAddr> {
    let raw = headers.get(FORWARDED_FOR)?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    match first.parse::<IpAddr>() {
        Ok(ip) => Some(ip.to_canonical()),
        Err(_) => {
            tracing::debug!(header = raw, "ignoring unparsable X-Forwarded-For");
            None
        }
    }
}
