//! Raw, Observed and Normalized Events
//!
//! ## Trust Boundary
//!
//! Query-string parameters are entirely client controlled. Anything that
//! identifies the caller (`user_agent`, `source_ip`) or orders the event
//! (`time`) must come from the transport layer instead. [`normalize`] merges
//! the two sources with the observed values always winning:
//!
//! ```text
//! RawEvent        {foo: bar, source_ip: 9.9.9.9}
//! ObservedContext {user_agent: UA1, source_ip: 1.2.3.4, time: ...}
//! ---------------------------------------------------------------
//! NormalizedEvent {foo: bar, source_ip: 1.2.3.4, user_agent: UA1, time: ...}
//! ```
//!
//! Field order is preserved: client keys keep their first-seen position and
//! observed keys the client did not send are appended.

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};

use crate::key::{KeyLayout, StorageKey};

pub const USER_AGENT: &str = "user_agent";
pub const SOURCE_IP: &str = "source_ip";
pub const TIME: &str = "time";

/// Keys that are always sourced from the [`ObservedContext`].
pub const OBSERVED_KEYS: [&str; 3] = [USER_AGENT, SOURCE_IP, TIME];

/// Untrusted key/value fields received with one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEvent {
    fields: Map<String, Value>,
}

impl RawEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from query-string pairs.
    ///
    /// Repeated keys are joined with `,` in the order they were received,
    /// matching how HTTP gateways flatten multi-value query parameters.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut event = Self::new();
        for (key, value) in pairs {
            event.append(key, value);
        }
        event
    }

    /// Add a value, joining it onto any existing value for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.get_mut(&key) {
            Some(Value::String(existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            _ => {
                self.fields.insert(key, Value::String(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Server-observed facts about one request. Always authoritative.
///
/// Only constructible through [`ObservedContext::new`], so `time` is always
/// at microsecond resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedContext {
    user_agent: String,
    source_ip: String,
    time: DateTime<Utc>,
}

impl ObservedContext {
    /// `time` is truncated to microseconds so the stored `time` field and
    /// the storage key always agree.
    pub fn new(
        user_agent: impl Into<String>,
        source_ip: impl Into<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            source_ip: source_ip.into(),
            time: time.trunc_subsecs(6),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn source_ip(&self) -> &str {
        &self.source_ip
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

/// A raw event whose identity fields have been replaced by observed values.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    fields: Map<String, Value>,
    time: DateTime<Utc>,
}

impl NormalizedEvent {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Observed capture time.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn source_ip(&self) -> &str {
        self.get(SOURCE_IP).unwrap_or_default()
    }

    pub fn storage_key(&self, layout: KeyLayout) -> StorageKey {
        StorageKey::with_layout(&self.time, layout)
    }

    pub(crate) fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Overlay `observed` onto `raw`. Pure; never fails.
pub fn normalize(raw: RawEvent, observed: &ObservedContext) -> NormalizedEvent {
    let mut fields = raw.into_fields();

    for key in OBSERVED_KEYS {
        if let Some(spoofed) = fields.get(key) {
            tracing::debug!(
                field = key,
                client_value = %spoofed,
                "dropping client-supplied observed field"
            );
        }
    }

    fields.insert(
        USER_AGENT.to_string(),
        Value::String(observed.user_agent.clone()),
    );
    fields.insert(
        SOURCE_IP.to_string(),
        Value::String(observed.source_ip.clone()),
    );
    fields.insert(TIME.to_string(), Value::String(format_time(&observed.time)));

    NormalizedEvent {
        fields,
        time: observed.time,
    }
}

/// Naive UTC ISO-8601 with exactly six fractional digits.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
