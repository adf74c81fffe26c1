//! ipgeolocation.io locator
//!
//! `GET {base}/ipgeo?apiKey={key}&ip={ip}`. Field mapping onto the record:
//!
//! | record          | ipgeolocation.io |
//! |-----------------|------------------|
//! | `country_code`  | `country_code2`  |
//! | `region_code`   | `state_code`     |
//! | `region_name`   | `state_prov`     |
//! | `zip`           | `zipcode`        |
//!
//! Latitude and longitude arrive as strings.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sightline_core::GeoRecord;

use crate::credential::ApiCredential;
use crate::error::Result;
use crate::locator::Locator;
use crate::lookup::{fetch_json, float_field, string_field};

pub const DEFAULT_BASE_URL: &str = "https://api.ipgeolocation.io";

pub struct IpGeolocationLocator {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiCredential,
    label: String,
}

impl IpGeolocationLocator {
    pub fn new(http: reqwest::Client, api_key: ApiCredential) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            label: "ipgeolocation.io".to_string(),
        }
    }

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
            "{}/ipgeo?apiKey={}&ip={}",
            self.base_url,
            urlencoding::encode(self.api_key.expose()),
            urlencoding::encode(addr)
        )
    }
}

fn project(body: &Map<String, Value>) -> GeoRecord {
    GeoRecord {
        continent_code: string_field(body, "continent_code"),
        continent_name: string_field(body, "continent_name"),
        country_code: string_field(body, "country_code2"),
        country_name: string_field(body, "country_name"),
        region_code: string_field(body, "state_code"),
        region_name: string_field(body, "state_prov"),
        city: string_field(body, "city"),
        zip: string_field(body, "zipcode"),
        latitude: float_field(body, "latitude"),
        longitude: float_field(body, "longitude"),
    }
}

#[async_trait]
impl Locator for IpGeolocationLocator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn locate(&self, addr: &str) -> Result<GeoRecord> {
        tracing::debug!(addr, locator = %self.label, "locating addr with ipgeolocation.io");
        let body = fetch_json(&self.http, &self.url(addr)).await?;
        Ok(project(&body))
    }
}
