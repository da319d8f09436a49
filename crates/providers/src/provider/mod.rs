//! Provider traits and their HTTP implementations.

mod http;
mod open_exchange;
mod rest_countries;
mod traits;

pub use http::HttpSettings;
pub use open_exchange::OpenExchangeRateProvider;
pub use rest_countries::RestCountriesProvider;
pub use traits::{CountryDirectoryProvider, ExchangeRateProvider};
