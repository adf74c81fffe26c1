//! Geolocation records and the enrichment outcome.
//!
//! Enrichment is best effort. Its result is an explicit [`Enrichment`] value
//! instead of an error so that a failed lookup can never abort the write of
//! the underlying [`NormalizedEvent`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::Result;
use crate::event::NormalizedEvent;

/// Location of an IP address.
///
/// Every field is individually nullable. When serialized, all ten keys are
/// always present so downstream consumers see a stable schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub continent_code: Option<String>,
    pub continent_name: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_code: Option<String>,
    pub region_name: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoRecord {
    pub const FIELDS: [&'static str; 10] = [
        "continent_code",
        "continent_name",
        "country_code",
        "country_name",
        "region_code",
        "region_name",
        "city",
        "zip",
        "latitude",
        "longitude",
    ];

    /// Flatten into the ten record keys, `null` for missing values.
    pub fn into_fields(self) -> Map<String, Value> {
        let text = |v: Option<String>| v.map(Value::String).unwrap_or(Value::Null);
        let float = |v: Option<f64>| {
            v.and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        };

        let mut fields = Map::new();
        fields.insert("continent_code".into(), text(self.continent_code));
        fields.insert("continent_name".into(), text(self.continent_name));
        fields.insert("country_code".into(), text(self.country_code));
        fields.insert("country_name".into(), text(self.country_name));
        fields.insert("region_code".into(), text(self.region_code));
        fields.insert("region_name".into(), text(self.region_name));
        fields.insert("city".into(), text(self.city));
        fields.insert("zip".into(), text(self.zip));
        fields.insert("latitude".into(), float(self.latitude));
        fields.insert("longitude".into(), float(self.longitude));
        fields
    }
}

/// Why an event was stored without location data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnenrichedReason {
    /// The deployment runs without enrichment.
    Disabled,
    /// The lookup failed; carries the error description.
    Failed(String),
}

/// Outcome of a geolocation lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Enriched(GeoRecord),
    Unenriched(UnenrichedReason),
}

impl Enrichment {
    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }
}

/// A normalized event and the outcome of enriching it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub event: NormalizedEvent,
    pub enrichment: Enrichment,
}

impl EnrichedEvent {
    pub fn new(event: NormalizedEvent, enrichment: Enrichment) -> Self {
        Self { event, enrichment }
    }

    /// The flat record written to storage. Geo keys are only present when
    /// the event was enriched.
    pub fn into_record(self) -> Map<String, Value> {
        let mut record = self.event.into_fields();
        if let Enrichment::Enriched(geo) = self.enrichment {
            record.extend(geo.into_fields());
        }
        record
    }

    /// Serialize the flat record as JSON.
    pub fn to_json_bytes(&self) -> Result<Bytes> {
        let record = self.clone().into_record();
        Ok(Bytes::from(serde_json::to_vec(&record)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{normalize, ObservedContext, RawEvent};
    use chrono::{TimeZone, Utc};

    fn event() -> NormalizedEvent {
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        normalize(
            RawEvent::from_pairs([("foo", "bar")]),
            &ObservedContext::new("UA1", "1.2.3.4", time),
        )
    }

    #[test]
    fn test_partial_record_keeps_all_keys() {
        let geo = GeoRecord {
            country_code: Some("US".to_string()),
            latitude: Some(37.4224),
            ..Default::default()
        };
        let fields = geo.into_fields();
        assert_eq!(fields.len(), 10);
        for name in GeoRecord::FIELDS {
            assert!(fields.contains_key(name), "missing {}", name);
        }
        assert_eq!(fields["country_code"], "US");
        assert_eq!(fields["latitude"], 37.4224);
        assert!(fields["city"].is_null());
        assert!(fields["longitude"].is_null());
    }

    #[test]
    fn test_serde_keeps_null_fields() {
        let json = serde_json::to_value(GeoRecord::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 10);
        assert!(obj.values().all(Value::is_null));
    }

    #[test]
    fn test_enriched_record() {
        let geo = GeoRecord {
            city: Some("Mountain View".to_string()),
            ..Default::default()
        };
        let record = EnrichedEvent::new(event(), Enrichment::Enriched(geo)).into_record();
        assert_eq!(record["foo"], "bar");
        assert_eq!(record["source_ip"], "1.2.3.4");
        assert_eq!(record["city"], "Mountain View");
        assert_eq!(record.len(), 4 + GeoRecord::FIELDS.len());
    }

    #[test]
    fn test_unenriched_record_has_no_geo_keys() {
        for reason in [
            UnenrichedReason::Disabled,
            UnenrichedReason::Failed("HTTP 503".to_string()),
        ] {
            let enriched = EnrichedEvent::new(event(), Enrichment::Unenriched(reason));
            assert!(!enriched.enrichment.is_enriched());
            let record = enriched.into_record();
            assert_eq!(record.len(), 4);
            for name in GeoRecord::FIELDS {
                assert!(!record.contains_key(name));
            }
        }
    }

    #[test]
    fn test_to_json_bytes() {
        let enriched = EnrichedEvent::new(event(), Enrichment::Unenriched(UnenrichedReason::Disabled));
        let bytes = enriched.to_json_bytes().unwrap();
        let parsed: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["foo"], "bar");
        assert_eq!(parsed["user_agent"], "UA1");
        assert_eq!(parsed["time"], "2024-01-02T03:04:05.000000");
    }
}
