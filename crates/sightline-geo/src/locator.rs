//! The `Locator` trait and locator configuration.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use sightline_core::GeoRecord;

use crate::credential::ApiCredential;
use crate::error::{GeoError, Result};
use crate::ipgeolocation::IpGeolocationLocator;
use crate::ipstack::IpStackLocator;
use crate::multi::MultiLocator;

/// Resolves IP addresses to locations.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Identifies the locator in log messages. Never contains credentials.
    fn name(&self) -> &str;

    async fn locate(&self, addr: &str) -> Result<GeoRecord>;
}

/// Supported geolocation services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LocatorKind {
    #[serde(rename = "ipstack.com")]
    IpStack,
    #[serde(rename = "ipgeolocation.io")]
    IpGeolocation,
}

impl LocatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorKind::IpStack => "ipstack.com",
            LocatorKind::IpGeolocation => "ipgeolocation.io",
        }
    }
}

/// One provider account, as described in the credential secret.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorSpec {
    #[serde(rename = "type")]
    pub kind: LocatorKind,

    /// Account owner; only used to identify the locator in logs.
    #[serde(default)]
    pub user: String,

    /// Identity provider of the account; only used in logs.
    #[serde(default)]
    pub identity_provider: String,

    pub api_key: ApiCredential,
}

impl LocatorSpec {
    /// A single ipstack.com account, the format of a plain-string secret.
    pub fn ipstack(api_key: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::IpStack,
            user: String::new(),
            identity_provider: String::new(),
            api_key: ApiCredential::new(api_key),
        }
    }

    /// Parse a credential secret: either one ipstack.com API key or a JSON
    /// array of locator specs.
    pub fn parse_secret(secret: &str) -> Result<Vec<LocatorSpec>> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(GeoError::Config("credential secret is empty".to_string()));
        }
        if !secret.starts_with('[') {
            return Ok(vec![LocatorSpec::ipstack(secret)]);
        }

        let specs: Vec<LocatorSpec> = serde_json::from_str(secret)
            .map_err(|e| GeoError::Config(format!("unmarshaling locators from secret: {}", e)))?;
        if specs.is_empty() {
            return Err(GeoError::Config("no locators found in secret".to_string()));
        }
        Ok(specs)
    }

    fn label(&self) -> String {
        match (self.user.is_empty(), self.identity_provider.is_empty()) {
            (true, _) => self.kind.as_str().to_string(),
            (false, true) => format!("{}:{}", self.kind.as_str(), self.user),
            (false, false) => format!(
                "{}:{}@{}",
                self.kind.as_str(),
                self.user,
                self.identity_provider
            ),
        }
    }

    pub fn build(&self, http: reqwest::Client) -> Arc<dyn Locator> {
        match self.kind {
            LocatorKind::IpStack => Arc::new(
                IpStackLocator::new(http, self.api_key.clone()).with_label(self.label()),
            ),
            LocatorKind::IpGeolocation => Arc::new(
                IpGeolocationLocator::new(http, self.api_key.clone()).with_label(self.label()),
            ),
        }
    }
}

/// Build the locator described by a credential secret. Several specs are
/// combined into a round-robin [`MultiLocator`].
pub fn locator_from_secret(secret: &str, http: reqwest::Client) -> Result<Arc<dyn Locator>> {
    let specs = LocatorSpec::parse_secret(secret)?;
    if specs.len() == 1 {
        return Ok(specs[0].build(http));
    }

    let locators = specs.iter().map(|spec| spec.build(http.clone())).collect();
    Ok(Arc::new(MultiLocator::new(locators)?))
}
