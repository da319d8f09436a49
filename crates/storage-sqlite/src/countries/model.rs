//! Database models for countries.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use country_cache_core::countries::{name_key, Country, NewCountry};
use country_cache_core::errors::{DatabaseError, Error, Result};
use country_cache_core::utils::{from_naive_utc, to_naive_utc};

/// Decimals are stored as TEXT so their scale survives the round trip.
/// Scientific notation written by other tools is accepted too.
fn parse_stored_decimal(value: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| {
            log::error!("Stored {} '{}' is not a decimal: {}", field, value, e);
            Error::Database(DatabaseError::Internal(format!(
                "Stored {} '{}' is not a decimal",
                field, value
            )))
        })
}

/// Database model for countries
#[derive(Queryable, Identifiable, Selectable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct CountryDB {
    pub id: i64,
    pub name: String,
    pub name_key: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub alpha2_code: Option<String>,
    pub exchange_rate: Option<String>,
    pub estimated_gdp: String,
    pub flag_url: Option<String>,
    pub last_refreshed_at: NaiveDateTime,
}

#[derive(Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::countries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewCountryDB {
    pub name: String,
    pub name_key: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub alpha2_code: Option<String>,
    pub exchange_rate: Option<String>,
    pub estimated_gdp: String,
    pub flag_url: Option<String>,
    pub last_refreshed_at: NaiveDateTime,
}

impl TryFrom<CountryDB> for Country {
    type Error = Error;

    fn try_from(db: CountryDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            exchange_rate: db
                .exchange_rate
                .as_deref()
                .map(|v| parse_stored_decimal(v, "exchange_rate"))
                .transpose()?,
            estimated_gdp: parse_stored_decimal(&db.estimated_gdp, "estimated_gdp")?,
            name: db.name,
            capital: db.capital,
            region: db.region,
            population: db.population,
            currency_code: db.currency_code,
            alpha2_code: db.alpha2_code,
            flag_url: db.flag_url,
            last_refreshed_at: from_naive_utc(db.last_refreshed_at),
        })
    }
}

impl From<&Country> for CountryDB {
    fn from(domain: &Country) -> Self {
        Self {
            id: domain.id,
            name: domain.name.clone(),
            name_key: name_key(&domain.name),
            capital: domain.capital.clone(),
            region: domain.region.clone(),
            population: domain.population,
            currency_code: domain.currency_code.clone(),
            alpha2_code: domain.alpha2_code.clone(),
            exchange_rate: domain.exchange_rate.map(|d| d.to_string()),
            estimated_gdp: domain.estimated_gdp.to_string(),
            flag_url: domain.flag_url.clone(),
            last_refreshed_at: to_naive_utc(domain.last_refreshed_at),
        }
    }
}

impl From<NewCountry> for NewCountryDB {
    fn from(domain: NewCountry) -> Self {
        Self {
            name_key: name_key(&domain.name),
            name: domain.name,
            capital: domain.capital,
            region: domain.region,
            population: domain.population,
            currency_code: domain.currency_code,
            alpha2_code: domain.alpha2_code,
            exchange_rate: domain.exchange_rate.map(|d| d.to_string()),
            estimated_gdp: domain.estimated_gdp.to_string(),
            flag_url: domain.flag_url,
            last_refreshed_at: to_naive_utc(domain.last_refreshed_at),
        }
    }
}
