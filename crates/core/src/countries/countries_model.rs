//! Country domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::derivation::{round_estimated_gdp, round_exchange_rate};

/// A cached country record. `name` is the natural key; uniqueness is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub alpha2_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub estimated_gdp: Decimal,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

impl Country {
    /// Lookup key used to match provider entries against stored rows.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }
}

/// Case-insensitive key for a country name.
pub fn name_key(name: &str) -> String {
    name.to_uppercase()
}

/// Input model for a country created by a refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCountry {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub alpha2_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub estimated_gdp: Decimal,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Partial update of a stored country. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryUpdate {
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub estimated_gdp: Option<Decimal>,
    pub flag_url: Option<String>,
}

impl CountryUpdate {
    /// Overwrites every provided field and stamps `last_refreshed_at`,
    /// whether or not any value actually differed. Decimals are rounded to
    /// their stored scale.
    pub fn apply_to(self, country: &mut Country, now: DateTime<Utc>) {
        if let Some(capital) = self.capital {
            country.capital = Some(capital);
        }
        if let Some(region) = self.region {
            country.region = Some(region);
        }
        if let Some(population) = self.population {
            country.population = population;
        }
        if let Some(currency_code) = self.currency_code {
            country.currency_code = Some(currency_code);
        }
        if let Some(exchange_rate) = self.exchange_rate {
            country.exchange_rate = Some(round_exchange_rate(exchange_rate));
        }
        if let Some(estimated_gdp) = self.estimated_gdp {
            country.estimated_gdp = round_estimated_gdp(estimated_gdp);
        }
        if let Some(flag_url) = self.flag_url {
            country.flag_url = Some(flag_url);
        }
        country.last_refreshed_at = now;
    }
}

/// Row count plus the instant of the most recent successful refresh.
///
/// Returned by the refresh operation (where the count is the cycle's
/// affected rows) and by the status query (where it is the total row count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// Column a listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Population,
    EstimatedGdp,
    Region,
    CurrencyCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountrySort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Filter and sort criteria for the listing endpoint.
///
/// `region` and `currency` are case-insensitive substring filters; both
/// apply when both are set. No sort means store-natural order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<CountrySort>,
}
