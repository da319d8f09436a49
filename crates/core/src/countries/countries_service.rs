use async_trait::async_trait;
use chrono::{DateTime, Utc};
use country_cache_providers::{CountryDirectoryProvider, ExchangeRateProvider};
use log::{debug, error, info};
use std::sync::{Arc, RwLock};
use tokio::task::JoinHandle;

use super::countries_model::{Country, CountryQuery, CountryUpdate, StatusResponse};
use super::countries_traits::{CountryRepositoryTrait, CountryServiceTrait};
use super::reconciliation::{reconcile_snapshot, ProviderSnapshot};
use crate::constants::{DEFAULT_REFRESH_BATCH_SIZE, SUMMARY_TOP_N};
use crate::errors::{Error, Result};
use crate::summary::{SummaryRendererTrait, SummarySnapshot};
use crate::utils::now_utc;

const SOURCE_UNAVAILABLE: &str = "External data source unavailable";
const REFRESH_FAILED: &str = "Internal server error during processing";

/// Service coordinating refresh cycles and read queries over the cache.
pub struct CountryService {
    repository: Arc<dyn CountryRepositoryTrait>,
    country_provider: Arc<dyn CountryDirectoryProvider>,
    rate_provider: Arc<dyn ExchangeRateProvider>,
    renderer: Arc<dyn SummaryRendererTrait>,
    batch_size: usize,
    // Process-local; re-derived from the store after a restart.
    last_refreshed_at: RwLock<Option<DateTime<Utc>>>,
}

impl CountryService {
    pub fn new(
        repository: Arc<dyn CountryRepositoryTrait>,
        country_provider: Arc<dyn CountryDirectoryProvider>,
        rate_provider: Arc<dyn ExchangeRateProvider>,
        renderer: Arc<dyn SummaryRendererTrait>,
    ) -> Self {
        Self {
            repository,
            country_provider,
            rate_provider,
            renderer,
            batch_size: DEFAULT_REFRESH_BATCH_SIZE,
            last_refreshed_at: RwLock::new(None),
        }
    }

    /// Sets the number of updates flushed together during a refresh.
    /// Values below 1 are clamped to 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn fetch_snapshot(&self) -> Result<ProviderSnapshot> {
        let (countries, rates) = futures::try_join!(
            self.country_provider.fetch_countries(),
            self.rate_provider.fetch_rates()
        )
        .map_err(|e| {
            error!("External API error during refresh: {}", e);
            Error::DataSourceUnavailable(SOURCE_UNAVAILABLE.to_string())
        })?;
        Ok(ProviderSnapshot { countries, rates })
    }

    fn cached_refresh(&self) -> Option<DateTime<Utc>> {
        match self.last_refreshed_at.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn remember_refresh(&self, refreshed_at: DateTime<Utc>) {
        let mut guard = match self.last_refreshed_at.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.map_or(true, |current| refreshed_at > current) {
            *guard = Some(refreshed_at);
        }
    }

    /// Renders the summary image in the background. Failures are logged
    /// and never reach the caller.
    pub fn spawn_summary_render(
        &self,
        total_countries: i64,
        refreshed_at: DateTime<Utc>,
    ) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let renderer = self.renderer.clone();
        tokio::task::spawn_blocking(move || {
            let result = repository
                .top_by_estimated_gdp(SUMMARY_TOP_N)
                .and_then(|top_countries| {
                    renderer.render(&SummarySnapshot {
                        total_countries,
                        refreshed_at,
                        top_countries,
                    })
                });
            match result {
                Ok(()) => info!(
                    "Asynchronous image generation completed for {} countries.",
                    total_countries
                ),
                Err(e) => error!("Failed to generate summary image: {}", e),
            }
        })
    }
}

#[async_trait]
impl CountryServiceTrait for CountryService {
    async fn refresh(&self) -> Result<StatusResponse> {
        info!("Starting country data refresh...");
        let snapshot = self.fetch_snapshot().await?;

        let summary = self
            .repository
            .reconcile(
                self.batch_size,
                Box::new(move |existing| {
                    reconcile_snapshot(existing, &snapshot, now_utc(), &mut rand::thread_rng())
                }),
            )
            .await
            .map_err(|e| {
                error!("Internal error during refresh process: {}", e);
                Error::Unexpected(REFRESH_FAILED.to_string())
            })?;

        let affected = summary.affected() as i64;
        info!(
            "Country data update completed. {} new entities inserted and {} existing entities updated. Total affected: {}",
            summary.inserted, summary.updated, affected
        );

        self.remember_refresh(summary.refreshed_at);
        self.spawn_summary_render(affected, summary.refreshed_at);

        Ok(StatusResponse {
            total_countries: affected,
            last_refreshed_at: Some(summary.refreshed_at),
        })
    }

    fn list_countries(
        &self,
        region: Option<&str>,
        currency: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Vec<Country>> {
        let query = CountryQuery::from_params(region, currency, sort)?;
        debug!("Listing countries with {:?}", query);
        self.repository.list_countries(&query)
    }

    fn list_by_region(&self, region: &str) -> Result<Vec<Country>> {
        if region.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Region must not be empty".to_string(),
            ));
        }
        let countries = self.repository.list_by_region(region.trim())?;
        if countries.is_empty() {
            return Err(Error::NotFound(format!(
                "No countries found for region: {}",
                region
            )));
        }
        Ok(countries)
    }

    fn get_by_name(&self, name: &str) -> Result<Country> {
        self.repository
            .get_by_name(name)?
            .ok_or_else(|| Error::NotFound(format!("Country not found: {}", name)))
    }

    async fn update_country(&self, name: &str, changes: CountryUpdate) -> Result<Country> {
        self.repository
            .update_country(name.to_string(), changes)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Country not found: {}", name)))
    }

    async fn delete_by_name(&self, name: &str) -> Result<()> {
        let deleted = self.repository.delete_by_name(name.to_string()).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Country not found: {}", name)));
        }
        Ok(())
    }

    fn get_status(&self) -> Result<StatusResponse> {
        let last_refreshed_at = match self.cached_refresh() {
            Some(ts) => Some(ts),
            None => {
                let derived = self.repository.latest_refreshed_at()?;
                if let Some(ts) = derived {
                    self.remember_refresh(ts);
                }
                derived
            }
        };
        Ok(StatusResponse {
            total_countries: self.repository.count()?,
            last_refreshed_at,
        })
    }

    async fn get_summary_image(&self) -> Result<Vec<u8>> {
        let path = self.renderer.output_path();
        tokio::fs::read(path).await.map_err(|e| {
            debug!("Summary image at {} unavailable: {}", path.display(), e);
            Error::NotFound("Summary image not found or not readable.".to_string())
        })
    }
}
