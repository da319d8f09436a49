//! Countries module - domain models, reconciliation and query engines.

mod countries_model;
mod countries_service;
mod countries_traits;
pub mod derivation;
mod query;
mod reconciliation;

#[cfg(test)]
mod countries_service_tests;

pub use countries_model::{
    name_key, Country, CountryQuery, CountrySort, CountryUpdate, NewCountry, SortDirection,
    SortField, StatusResponse,
};
pub use countries_service::CountryService;
pub use countries_traits::{CountryRepositoryTrait, CountryServiceTrait, MergeFn};
pub use reconciliation::{
    reconcile_snapshot, ProviderSnapshot, ReconciliationPlan, ReconciliationSummary,
};
