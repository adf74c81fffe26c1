//! Fail-open enrichment adapter.

use std::sync::Arc;

use sightline_core::{Enrichment, UnenrichedReason};

use crate::credential::CredentialCache;
use crate::error::Result;
use crate::locator::{locator_from_secret, Locator};

/// Turns locator results into an [`Enrichment`].
///
/// Every lookup error (transport failure, timeout, non-2xx status,
/// malformed body) is logged with the offending address and converted into
/// `Enrichment::Unenriched`. Callers never see an error and must never
/// skip the storage write because of one.
#[derive(Clone)]
pub struct GeoEnricher {
    locator: Arc<dyn Locator>,
}

impl GeoEnricher {
    pub fn new(locator: Arc<dyn Locator>) -> Self {
        Self { locator }
    }

    /// Build from the cached provider secret.
    ///
    /// The locators hold their API keys for as long as the enricher lives,
    /// so the cache is only consulted here.
    pub async fn from_credentials(
        credentials: &CredentialCache,
        http: reqwest::Client,
    ) -> Result<Self> {
        let secret = credentials.get().await?;
        Ok(Self::new(locator_from_secret(&secret, http)?))
    }

    pub fn locator_name(&self) -> &str {
        self.locator.name()
    }

    pub async fn enrich(&self, addr: &str) -> Enrichment {
        match self.locator.locate(addr).await {
            Ok(record) => Enrichment::Enriched(record),
            Err(e) => {
                tracing::error!(
                    ip = addr,
                    locator = self.locator.name(),
                    timeout = e.is_timeout(),
                    error = %e,
                    "geolookup failed"
                );
                Enrichment::Unenriched(UnenrichedReason::Failed(e.to_string()))
            }
        }
    }
}
