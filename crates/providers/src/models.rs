//! Wire payloads returned by the upstream providers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the country directory.
///
/// Only `name` is required; everything else may be absent or `null`
/// upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPayload {
    pub name: String,
    #[serde(default)]
    pub alpha2_code: Option<String>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Option<Vec<CurrencyPayload>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPayload {
    #[serde(default)]
    pub code: Option<String>,
}

/// Raw exchange-rate response. `rates` is optional on the wire so that a
/// missing map can be reported as an unusable payload instead of a decode
/// error.
#[derive(Debug, Deserialize)]
pub(crate) struct ExchangeRatesResponse {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub rates: Option<HashMap<String, f64>>,
}

/// A usable exchange-rate snapshot: every rate is quoted against `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub base: String,
    pub rates: HashMap<String, f64>,
}
