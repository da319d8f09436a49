//! External data providers for the country cache.
//!
//! Two upstream sources feed a refresh cycle:
//! - a country directory returning an array of country records
//! - an exchange-rate endpoint returning USD-based rates keyed by currency code
//!
//! Both are plain HTTP + JSON without authentication. This crate owns the
//! wire payloads, the provider traits consumed by `country-cache-core`, and
//! the reqwest-backed implementations.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::ProviderError;
pub use models::{CountryPayload, CurrencyPayload, ExchangeRates};
pub use provider::{
    CountryDirectoryProvider, ExchangeRateProvider, HttpSettings, OpenExchangeRateProvider,
    RestCountriesProvider,
};
