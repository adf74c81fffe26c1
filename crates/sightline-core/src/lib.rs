//! Sightline Core
//!
//! Event model shared by every Sightline crate.
//!
//! ## Pipeline Types
//!
//! - [`RawEvent`]: untrusted query-string fields from one request
//! - [`ObservedContext`]: server-observed facts (user agent, source IP, time)
//! - [`NormalizedEvent`]: raw fields overlaid by the observed context
//! - [`EnrichedEvent`]: a normalized event plus the outcome of geolocation
//! - [`StorageKey`]: time-hierarchical object path for one event
//!
//! The only way to build a [`NormalizedEvent`] is [`normalize`], which
//! guarantees that `user_agent`, `source_ip` and `time` come from the
//! transport layer and never from the client.

pub mod clock;
pub mod error;
pub mod event;
pub mod geo;
pub mod key;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, Result};
pub use event::{normalize, NormalizedEvent, ObservedContext, RawEvent, OBSERVED_KEYS};
pub use geo::{EnrichedEvent, Enrichment, GeoRecord, UnenrichedReason};
pub use key::{KeyLayout, StorageKey};
