use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::countries_model::{Country, CountryQuery, CountryUpdate, StatusResponse};
use super::reconciliation::{ReconciliationPlan, ReconciliationSummary};
use crate::errors::Result;

/// Merge step handed to [`CountryRepositoryTrait::reconcile`]. It receives
/// every stored country and returns the writes for the cycle.
pub type MergeFn = Box<dyn FnOnce(Vec<Country>) -> Result<ReconciliationPlan> + Send + 'static>;

/// Trait for country repository operations.
#[async_trait]
pub trait CountryRepositoryTrait: Send + Sync {
    /// Filtered, optionally sorted listing.
    fn list_countries(&self, query: &CountryQuery) -> Result<Vec<Country>>;

    /// Exact, case-insensitive region match.
    fn list_by_region(&self, region: &str) -> Result<Vec<Country>>;

    /// Exact, case-insensitive name match.
    fn get_by_name(&self, name: &str) -> Result<Option<Country>>;

    /// Countries ordered by estimated GDP, highest first.
    fn top_by_estimated_gdp(&self, limit: i64) -> Result<Vec<Country>>;

    fn count(&self) -> Result<i64>;

    /// Most recent `last_refreshed_at` across all rows.
    fn latest_refreshed_at(&self) -> Result<Option<DateTime<Utc>>>;

    /// Runs one refresh cycle inside a single transaction: loads every row,
    /// calls `merge`, bulk-inserts the new rows and writes the updates,
    /// flushing every `batch_size` rows. Nothing is committed if any step
    /// fails.
    async fn reconcile(&self, batch_size: usize, merge: MergeFn) -> Result<ReconciliationSummary>;

    /// Applies `changes` to the country named `name` (case-insensitive).
    /// Returns `None` when no such country exists.
    async fn update_country(&self, name: String, changes: CountryUpdate) -> Result<Option<Country>>;

    /// Deletes the country named `name` (case-insensitive) and returns the
    /// number of removed rows.
    async fn delete_by_name(&self, name: String) -> Result<usize>;
}

/// Trait for country service operations.
#[async_trait]
pub trait CountryServiceTrait: Send + Sync {
    /// Pulls both providers and merges the snapshot into the store.
    async fn refresh(&self) -> Result<StatusResponse>;

    fn list_countries(
        &self,
        region: Option<&str>,
        currency: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Vec<Country>>;

    fn list_by_region(&self, region: &str) -> Result<Vec<Country>>;

    fn get_by_name(&self, name: &str) -> Result<Country>;

    async fn update_country(&self, name: &str, changes: CountryUpdate) -> Result<Country>;

    async fn delete_by_name(&self, name: &str) -> Result<()>;

    fn get_status(&self) -> Result<StatusResponse>;

    /// Bytes of the last rendered summary image.
    async fn get_summary_image(&self) -> Result<Vec<u8>>;
}
