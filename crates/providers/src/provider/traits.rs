//! Provider trait definitions.
//!
//! `country-cache-core` depends only on these traits, so tests can feed the
//! reconciliation engine from in-memory fixtures.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{CountryPayload, ExchangeRates};

/// Source of the full country list.
#[async_trait]
pub trait CountryDirectoryProvider: Send + Sync {
    /// Identifier used in logs and error messages.
    fn id(&self) -> &'static str;

    /// Fetch every country the directory knows about, in provider order.
    ///
    /// A `null` body is an error, an empty array is not.
    async fn fetch_countries(&self) -> Result<Vec<CountryPayload>, ProviderError>;
}

/// Source of the currency code -> rate map.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    fn id(&self) -> &'static str;

    /// Fetch the latest rates. Fails when the response carries no rate map.
    async fn fetch_rates(&self) -> Result<ExchangeRates, ProviderError>;
}
