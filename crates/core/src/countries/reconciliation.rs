//! Merges one provider snapshot into the stored set of countries.
//!
//! The merge is pure: it receives the stored rows and the snapshot and
//! returns the rows to insert and the rows to rewrite. Persisting the plan
//! (and bounding memory with batched flushes) is the repository's job.

use chrono::{DateTime, Utc};
use country_cache_providers::{CountryPayload, ExchangeRates};
use log::{debug, warn};
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::countries_model::{name_key, Country, NewCountry};
use super::derivation::{
    draw_gdp_multiplier, estimate_gdp, extract_currency_code, lookup_exchange_rate,
    round_estimated_gdp, round_exchange_rate,
};
use crate::errors::Result;

/// Everything fetched from the providers for one cycle.
#[derive(Debug, Clone)]
pub struct ProviderSnapshot {
    pub countries: Vec<CountryPayload>,
    pub rates: ExchangeRates,
}

/// Writes a cycle needs to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationPlan {
    pub refreshed_at: DateTime<Utc>,
    pub inserts: Vec<NewCountry>,
    pub updates: Vec<Country>,
}

/// Outcome of a committed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub inserted: usize,
    pub updated: usize,
    pub refreshed_at: DateTime<Utc>,
}

impl ReconciliationSummary {
    /// Inserted plus updated rows; unchanged rows are not counted.
    pub fn affected(&self) -> usize {
        self.inserted + self.updated
    }
}

impl ReconciliationPlan {
    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary {
            inserted: self.inserts.len(),
            updated: self.updates.len(),
            refreshed_at: self.refreshed_at,
        }
    }
}

/// Values derived from a provider entry before it is matched.
struct DerivedFields {
    currency_code: Option<String>,
    exchange_rate: Option<Decimal>,
    estimated_gdp: Decimal,
}

/// Builds the write plan for one cycle.
///
/// Entries are processed in provider order and matched against `existing`
/// by uppercase name. A name repeated within the snapshot is merged into the
/// first occurrence, so the later entry's values win and the country is
/// counted once.
pub fn reconcile_snapshot<R: Rng + ?Sized>(
    existing: Vec<Country>,
    snapshot: &ProviderSnapshot,
    refreshed_at: DateTime<Utc>,
    rng: &mut R,
) -> Result<ReconciliationPlan> {
    let mut existing_by_key: HashMap<String, Country> =
        existing.into_iter().map(|c| (c.key(), c)).collect();

    let mut inserts: Vec<NewCountry> = Vec::new();
    let mut insert_index: HashMap<String, usize> = HashMap::new();
    let mut update_order: Vec<String> = Vec::new();
    let mut updated_keys: HashSet<String> = HashSet::new();

    for payload in &snapshot.countries {
        if payload.name.trim().is_empty() {
            warn!("Skipping provider entry without a country name");
            continue;
        }
        let derived = derive_fields(payload, &snapshot.rates, rng)?;
        let key = name_key(&payload.name);

        if let Some(&idx) = insert_index.get(&key) {
            inserts[idx] = new_country(payload, derived, refreshed_at);
            continue;
        }

        match existing_by_key.get_mut(&key) {
            None => {
                insert_index.insert(key, inserts.len());
                inserts.push(new_country(payload, derived, refreshed_at));
            }
            Some(country) => {
                if apply_payload(country, payload, derived, refreshed_at)
                    && updated_keys.insert(key.clone())
                {
                    update_order.push(key);
                }
            }
        }
    }

    let updates: Vec<Country> = update_order
        .into_iter()
        .filter_map(|key| existing_by_key.remove(&key))
        .collect();

    debug!(
        "Reconciliation plan: {} inserts, {} updates, {} unchanged",
        inserts.len(),
        updates.len(),
        existing_by_key.len()
    );

    Ok(ReconciliationPlan {
        refreshed_at,
        inserts,
        updates,
    })
}

fn derive_fields<R: Rng + ?Sized>(
    payload: &CountryPayload,
    rates: &ExchangeRates,
    rng: &mut R,
) -> Result<DerivedFields> {
    let currency_code = extract_currency_code(payload);
    let raw_rate = lookup_exchange_rate(currency_code.as_deref(), &rates.rates);
    let gdp = estimate_gdp(payload.population, raw_rate, draw_gdp_multiplier(rng))?;

    Ok(DerivedFields {
        currency_code,
        exchange_rate: raw_rate.map(round_exchange_rate),
        estimated_gdp: round_estimated_gdp(gdp),
    })
}

fn new_country(
    payload: &CountryPayload,
    derived: DerivedFields,
    refreshed_at: DateTime<Utc>,
) -> NewCountry {
    NewCountry {
        name: payload.name.clone(),
        capital: payload.capital.clone(),
        region: payload.region.clone(),
        population: payload.population.unwrap_or(0),
        currency_code: derived.currency_code,
        alpha2_code: payload.alpha2_code.clone(),
        exchange_rate: derived.exchange_rate,
        estimated_gdp: derived.estimated_gdp,
        flag_url: payload.flag.clone(),
        last_refreshed_at: refreshed_at,
    }
}

/// Applies every differing tracked field; returns whether anything changed.
///
/// The GDP estimate is re-randomised every cycle, so it only replaces the
/// stored value when one of its inputs (population, exchange rate) changed,
/// when it collapses to zero, or when the stored value is zero. Identical
/// payloads therefore leave the row untouched.
fn apply_payload(
    country: &mut Country,
    payload: &CountryPayload,
    derived: DerivedFields,
    refreshed_at: DateTime<Utc>,
) -> bool {
    let mut changed = false;
    changed |= replace_if_different(&mut country.alpha2_code, payload.alpha2_code.clone());
    changed |= replace_if_different(&mut country.capital, payload.capital.clone());
    changed |= replace_if_different(&mut country.region, payload.region.clone());
    changed |= replace_if_different(&mut country.flag_url, payload.flag.clone());
    changed |= replace_if_different(&mut country.currency_code, derived.currency_code);

    let mut inputs_changed = replace_if_different(
        &mut country.population,
        payload.population.unwrap_or(0),
    );
    let stored_rate = country.exchange_rate.map(round_exchange_rate);
    if stored_rate != derived.exchange_rate {
        country.exchange_rate = derived.exchange_rate;
        inputs_changed = true;
    }
    changed |= inputs_changed;

    let gdp_due = inputs_changed || derived.estimated_gdp.is_zero() || country.estimated_gdp.is_zero();
    if gdp_due {
        changed |= replace_if_different(&mut country.estimated_gdp, derived.estimated_gdp);
    }

    if changed {
        country.last_refreshed_at = refreshed_at.max(country.last_refreshed_at);
    }
    changed
}

fn replace_if_different<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
