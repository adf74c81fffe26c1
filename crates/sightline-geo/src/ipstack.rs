//! ipstack.com locator
//!
//! `GET {base}/{ip}?access_key={key}`. Response fields already use the
//! record's names. ipstack reports some failures (bad key, exhausted quota)
//! with a 2xx status and a `{"success": false, "error": {...}}` body; those
//! are treated as errors too.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sightline_core::GeoRecord;

use crate::credential::ApiCredential;
use crate::error::{GeoError, Result};
use crate::locator::Locator;
use crate::lookup::{fetch_json, float_field, string_field};

pub const DEFAULT_BASE_URL: &str = "http://api.ipstack.com";

pub struct IpStackLocator {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiCredential,
    label: String,
}

impl IpStackLocator {
    pub fn new(http: reqwest::Client, api_key: ApiCredential) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            label: "ipstack.com".to_string(),
        }
    }

    /// Point at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn url(&self, addr: &str) -> String {
        format!(
            "{}/{}?access_key={}",
            self.base_url,
            urlencoding::encode(addr),
            urlencoding::encode(self.api_key.expose())
        )
    }
}

fn project(body: &Map<String, Value>) -> GeoRecord {
    GeoRecord {
        continent_code: string_field(body, "continent_code"),
        continent_name: string_field(body, "continent_name"),
        country_code: string_field(body, "country_code"),
        country_name: string_field(body, "country_name"),
        region_code: string_field(body, "region_code"),
        region_name: string_field(body, "region_name"),
        city: string_field(body, "city"),
        zip: string_field(body, "zip"),
        latitude: float_field(body, "latitude"),
        longitude: float_field(body, "longitude"),
    }
}

fn provider_error(body: &Map<String, Value>) -> Option<String> {
    if body.get("success") != Some(&Value::Bool(false)) {
        return None;
    }
    let error = body.get("error");
    let info = error
        .and_then(|e| e.get("info"))
        .and_then(Value::as_str)
        .unwrap_or("request unsuccessful");
    Some(match error.and_then(|e| e.get("code")) {
        Some(code) => format!("{} (code {})", info, code),
        None => info.to_string(),
    })
}

#[async_trait]
impl Locator for IpStackLocator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn locate(&self, addr: &str) -> Result<GeoRecord> {
        tracing::debug!(addr, locator = %self.label, "locating addr with ipstack.com");
        let body = fetch_json(&self.http, &self.url(addr)).await?;
        if let Some(message) = provider_error(&body) {
            return Err(GeoError::Provider(message));
        }
        Ok(project(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url() {
        let locator = IpStackLocator::new(reqwest::Client::new(), ApiCredential::new("k&y"))
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            locator.url("1.2.3.4"),
            "http://localhost:8080/1.2.3.4?access_key=k%26y"
        );
    }

    #[test]
    fn test_project_full_response() {
        let body = json!({
            "ip": "134.201.250.155",
            "type": "ipv4",
            "continent_code": "NA",
            "continent_name": "North America",
            "country_code": "US",
            "country_name": "United States",
            "region_code": "CA",
            "region_name": "California",
            "city": "Los Angeles",
            "zip": "90013",
            "latitude": 34.0453,
            "longitude": -118.2413
        });
        let geo = project(body.as_object().unwrap());
        assert_eq!(geo.continent_code.as_deref(), Some("NA"));
        assert_eq!(geo.region_name.as_deref(), Some("California"));
        assert_eq!(geo.zip.as_deref(), Some("90013"));
        assert_eq!(geo.latitude, Some(34.0453));
        assert_eq!(geo.longitude, Some(-118.2413));
    }

    #[test]
    fn test_project_partial_response() {
        let body = json!({"country_code": "DE", "zip": 10115});
        let geo = project(body.as_object().unwrap());
        assert_eq!(geo.country_code.as_deref(), Some("DE"));
        assert_eq!(geo.zip.as_deref(), Some("10115"));
        assert_eq!(geo.city, None);
        assert_eq!(geo.latitude, None);
    }

    #[test]
    fn test_provider_error() {
        let body = json!({
            "success": false,
            "error": {"code": 101, "type": "invalid_access_key", "info": "You have not supplied a valid API Access Key."}
        });
        let message = provider_error(body.as_object().unwrap()).unwrap();
        assert!(message.contains("valid API Access Key"));
        assert!(message.contains("101"));

        let ok = json!({"city": "Berlin"});
        assert!(provider_error(ok.as_object().unwrap()).is_none());
    }
}
