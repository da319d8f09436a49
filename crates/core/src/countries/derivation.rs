//! Derived fields computed from provider payloads.
//!
//! These are plain functions so the reconciliation engine and its tests can
//! call them directly.

use country_cache_providers::CountryPayload;
use rand::Rng;
use rust_decimal::prelude::*;
use std::collections::HashMap;

use crate::constants::{
    EXCHANGE_RATE_SCALE, GDP_ESTIMATE_SCALE, GDP_MULTIPLIER_MAX, GDP_MULTIPLIER_MIN,
    GDP_STORED_SCALE,
};
use crate::errors::{Error, Result};

/// Code of the first currency listed for the country, if any.
pub fn extract_currency_code(payload: &CountryPayload) -> Option<String> {
    payload.currencies.as_ref()?.first()?.code.clone()
}

/// Rate for `currency_code` in the provider map. Unknown codes and rates
/// that cannot be represented as a decimal (NaN, infinities) yield `None`.
pub fn lookup_exchange_rate(
    currency_code: Option<&str>,
    rates: &HashMap<String, f64>,
) -> Option<Decimal> {
    let rate = *rates.get(currency_code?)?;
    Decimal::from_f64(rate)
}

/// Uniform draw from `[1000, 2000)`.
pub fn draw_gdp_multiplier<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(GDP_MULTIPLIER_MIN..GDP_MULTIPLIER_MAX)
}

/// Synthetic GDP estimate: `population * multiplier / exchange_rate`,
/// rounded half-up to 4 fractional digits.
///
/// Zero when the population is missing or not positive, or when the rate is
/// missing or not positive.
pub fn estimate_gdp(
    population: Option<i64>,
    exchange_rate: Option<Decimal>,
    multiplier: f64,
) -> Result<Decimal> {
    let Some(population) = population.filter(|p| *p > 0) else {
        return Ok(Decimal::ZERO);
    };
    let Some(rate) = exchange_rate.filter(|r| r.is_sign_positive() && !r.is_zero()) else {
        return Ok(Decimal::ZERO);
    };
    let multiplier = Decimal::from_f64(multiplier)
        .ok_or_else(|| Error::Unexpected(format!("Invalid GDP multiplier {}", multiplier)))?;

    Decimal::from(population)
        .checked_mul(multiplier)
        .and_then(|v| v.checked_div(rate))
        .map(|v| v.round_dp_with_strategy(GDP_ESTIMATE_SCALE, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| {
            Error::Unexpected(format!(
                "GDP estimate overflowed for population {} and rate {}",
                population, rate
            ))
        })
}

/// Exchange rate as persisted: half-up to 4 fractional digits.
pub fn round_exchange_rate(rate: Decimal) -> Decimal {
    let mut rounded =
        rate.round_dp_with_strategy(EXCHANGE_RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(EXCHANGE_RATE_SCALE);
    rounded
}

/// GDP estimate as persisted: half-up to 2 fractional digits.
pub fn round_estimated_gdp(gdp: Decimal) -> Decimal {
    let mut rounded =
        gdp.round_dp_with_strategy(GDP_STORED_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(GDP_STORED_SCALE);
    rounded
}
