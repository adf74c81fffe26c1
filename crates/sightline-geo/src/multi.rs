//! Round-robin over several locators.
//!
//! Every call starts at the locator after the one the previous call started
//! at, so lookups (and provider quota) are spread evenly across accounts.
//! A call only fails when every locator failed; the error carries all of
//! their causes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sightline_core::GeoRecord;

use crate::error::{GeoError, Result};
use crate::locator::Locator;

pub struct MultiLocator {
    cursor: AtomicUsize,
    locators: Vec<Arc<dyn Locator>>,
}

impl MultiLocator {
    pub fn new(locators: Vec<Arc<dyn Locator>>) -> Result<Self> {
        if locators.is_empty() {
            return Err(GeoError::Config("no locators configured".to_string()));
        }
        Ok(Self {
            cursor: AtomicUsize::new(0),
            locators,
        })
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

#[async_trait]
impl Locator for MultiLocator {
    fn name(&self) -> &str {
        "multi"
    }

    async fn locate(&self, addr: &str) -> Result<GeoRecord> {
        let count = self.locators.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % count;

        let mut errors = Vec::with_capacity(count);
        for i in 0..count {
            let locator = &self.locators[(start + i) % count];
            match locator.locate(addr).await {
                Ok(record) => {
                    tracing::debug!(addr, locator = locator.name(), "multi-locator located addr");
                    return Ok(record);
                }
                Err(e) => {
                    tracing::info!(
                        addr,
                        locator = locator.name(),
                        error = %e,
                        "multi-locator: failed to locate addr"
                    );
                    errors.push(format!("{}: {}", locator.name(), e));
                }
            }
        }

        Err(GeoError::Exhausted {
            addr: addr.to_string(),
            count,
            errors: errors.join("; "),
        })
    }
}
