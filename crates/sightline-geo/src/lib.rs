//! Sightline Geolocation
//!
//! Best-effort IP → location enrichment.
//!
//! ## Architecture
//!
//! - **Locators**: [`Locator`] implementations for ipstack.com and
//!   ipgeolocation.io, plus [`MultiLocator`] which rotates across several
//!   accounts so provider quota is consumed evenly.
//! - **Enricher**: [`GeoEnricher`] wraps a locator and converts every failure
//!   into [`Enrichment::Unenriched`](sightline_core::Enrichment). It never
//!   returns an error.
//! - **Credentials**: [`CredentialCache`] fetches the provider secret from a
//!   [`SecretStore`] exactly once per process. There is no refresh: rotating
//!   the secret requires a restart.
//!
//! ## Secret Format
//!
//! A plain string is a single ipstack.com API key. A JSON array configures
//! several locators:
//!
//! ```json
//! [
//!   {"type": "ipstack.com", "user": "ops@example.com", "identityProvider": "github", "apiKey": "..."},
//!   {"type": "ipgeolocation.io", "user": "ops@example.com", "identityProvider": "google", "apiKey": "..."}
//! ]
//! ```

pub mod credential;
pub mod enricher;
pub mod error;
pub mod ipgeolocation;
pub mod ipstack;
pub mod locator;
pub mod lookup;
pub mod multi;

pub use credential::{ApiCredential, CredentialCache, LocalSecretStore, SecretSource, SecretStore};
pub use enricher::GeoEnricher;
pub use error::{GeoError, Result};
pub use ipgeolocation::IpGeolocationLocator;
pub use ipstack::IpStackLocator;
pub use locator::{locator_from_secret, Locator, LocatorKind, LocatorSpec};
pub use lookup::build_http_client;
pub use multi::MultiLocator;
