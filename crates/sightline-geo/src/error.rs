//! Geolocation error types.
//!
//! ## Error Categories
//!
//! ### Lookup Errors
//! - `Http`: transport failure or timeout talking to the provider
//! - `Status`: provider answered outside the 2xx range
//! - `MalformedBody`: response was not a JSON object
//! - `Provider`: provider answered 2xx but reported a failure in the body
//! - `Exhausted`: every locator of a `MultiLocator` failed
//!
//! ### Startup Errors
//! - `Secret`: the credential could not be fetched
//! - `Config`: the secret did not describe a usable locator set
//!
//! Lookup errors never leave this crate through `GeoEnricher`; they are
//! logged and turned into an unenriched event.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Expected HTTP 2XX; got {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Exhausted all {count} locators for '{addr}': {errors}")]
    Exhausted {
        addr: String,
        count: usize,
        errors: String,
    },

    #[error("Secret error: {0}")]
    Secret(String),

    #[error("Locator configuration error: {0}")]
    Config(String),
}

impl GeoError {
    /// True for failures caused by the request exceeding its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GeoError::Http(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
