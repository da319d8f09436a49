//! Tests for CountryService orchestration.
//!
//! The repository, providers and renderer are replaced by in-memory mocks so
//! the refresh cycle and the query paths can be checked end to end.

#[cfg(test)]
mod tests {
    use crate::countries::{
        Country, CountryQuery, CountryRepositoryTrait, CountryService, CountryServiceTrait,
        CountryUpdate, MergeFn, ReconciliationSummary, SortDirection, SortField,
    };
    use crate::errors::{Error, Result};
    use crate::summary::{SummaryRendererTrait, SummarySnapshot};
    use crate::utils::now_utc;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use country_cache_providers::{
        CountryDirectoryProvider, CountryPayload, CurrencyPayload, ExchangeRateProvider,
        ExchangeRates, ProviderError,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::cmp::Ordering;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Mock repository
    // =========================================================================

    #[derive(Default)]
    struct MockRepository {
        rows: Mutex<Vec<Country>>,
        next_id: Mutex<i64>,
        flushes: Mutex<Vec<usize>>,
        fail_on_reconcile: Mutex<bool>,
        reconcile_calls: Mutex<usize>,
    }

    impl MockRepository {
        fn with_rows(rows: Vec<Country>) -> Self {
            let next_id = rows.iter().map(|c| c.id).max().unwrap_or(0);
            Self {
                rows: Mutex::new(rows),
                next_id: Mutex::new(next_id),
                ..Default::default()
            }
        }

        fn all(&self) -> Vec<Country> {
            self.rows.lock().unwrap().clone()
        }

        fn set_fail_on_reconcile(&self, fail: bool) {
            *self.fail_on_reconcile.lock().unwrap() = fail;
        }
    }

    fn contains_ci(value: &Option<String>, needle: &str) -> bool {
        value
            .as_deref()
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }

    fn compare(a: &Country, b: &Country, field: SortField) -> Ordering {
        match field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Population => a.population.cmp(&b.population),
            SortField::EstimatedGdp => a.estimated_gdp.cmp(&b.estimated_gdp),
            SortField::Region => a.region.cmp(&b.region),
            SortField::CurrencyCode => a.currency_code.cmp(&b.currency_code),
        }
    }

    #[async_trait]
    impl CountryRepositoryTrait for MockRepository {
        fn list_countries(&self, query: &CountryQuery) -> Result<Vec<Country>> {
            let mut rows: Vec<Country> = self
                .all()
                .into_iter()
                .filter(|c| query.region.as_deref().map_or(true, |r| contains_ci(&c.region, r)))
                .filter(|c| {
                    query
                        .currency
                        .as_deref()
                        .map_or(true, |cc| contains_ci(&c.currency_code, cc))
                })
                .collect();
            if let Some(sort) = query.sort {
                rows.sort_by(|a, b| {
                    let ord = compare(a, b, sort.field);
                    match sort.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                });
            }
            Ok(rows)
        }

        fn list_by_region(&self, region: &str) -> Result<Vec<Country>> {
            Ok(self
                .all()
                .into_iter()
                .filter(|c| {
                    c.region
                        .as_deref()
                        .map_or(false, |r| r.eq_ignore_ascii_case(region))
                })
                .collect())
        }

        fn get_by_name(&self, name: &str) -> Result<Option<Country>> {
            Ok(self
                .all()
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(name)))
        }

        fn top_by_estimated_gdp(&self, limit: i64) -> Result<Vec<Country>> {
            let mut rows = self.all();
            rows.sort_by(|a, b| b.estimated_gdp.cmp(&a.estimated_gdp));
            rows.truncate(limit as usize);
            Ok(rows)
        }

        fn count(&self) -> Result<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        fn latest_refreshed_at(&self) -> Result<Option<DateTime<Utc>>> {
            Ok(self.all().iter().map(|c| c.last_refreshed_at).max())
        }

        async fn reconcile(
            &self,
            batch_size: usize,
            merge: MergeFn,
        ) -> Result<ReconciliationSummary> {
            *self.reconcile_calls.lock().unwrap() += 1;
            if *self.fail_on_reconcile.lock().unwrap() {
                return Err(Error::Unexpected("Intentional reconcile failure".into()));
            }
            let plan = merge(self.all())?;
            let summary = plan.summary();

            let mut rows = self.rows.lock().unwrap();
            let mut next_id = self.next_id.lock().unwrap();
            for new in plan.inserts {
                *next_id += 1;
                rows.push(Country {
                    id: *next_id,
                    name: new.name,
                    capital: new.capital,
                    region: new.region,
                    population: new.population,
                    currency_code: new.currency_code,
                    alpha2_code: new.alpha2_code,
                    exchange_rate: new.exchange_rate,
                    estimated_gdp: new.estimated_gdp,
                    flag_url: new.flag_url,
                    last_refreshed_at: new.last_refreshed_at,
                });
            }
            for chunk in plan.updates.chunks(batch_size) {
                for updated in chunk {
                    if let Some(slot) = rows.iter_mut().find(|c| c.id == updated.id) {
                        *slot = updated.clone();
                    }
                }
                self.flushes.lock().unwrap().push(chunk.len());
            }
            Ok(summary)
        }

        async fn update_country(
            &self,
            name: String,
            changes: CountryUpdate,
        ) -> Result<Option<Country>> {
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|c| c.name.eq_ignore_ascii_case(&name)) {
                Some(country) => {
                    changes.apply_to(country, now_utc());
                    Ok(Some(country.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete_by_name(&self, name: String) -> Result<usize> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|c| !c.name.eq_ignore_ascii_case(&name));
            Ok(before - rows.len())
        }
    }

    // =========================================================================
    // Mock providers
    // =========================================================================

    #[derive(Default)]
    struct MockDirectory {
        countries: Mutex<Vec<CountryPayload>>,
        fail: Mutex<bool>,
    }

    impl MockDirectory {
        fn set(&self, countries: Vec<CountryPayload>) {
            *self.countries.lock().unwrap() = countries;
        }
    }

    #[async_trait]
    impl CountryDirectoryProvider for MockDirectory {
        fn id(&self) -> &'static str {
            "MOCK_DIRECTORY"
        }

        async fn fetch_countries(&self) -> std::result::Result<Vec<CountryPayload>, ProviderError> {
            if *self.fail.lock().unwrap() {
                return Err(ProviderError::BadStatus {
                    provider: self.id().to_string(),
                    status: 502,
                });
            }
            Ok(self.countries.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct MockRates {
        rates: Mutex<Vec<(String, f64)>>,
        fail: Mutex<bool>,
    }

    impl MockRates {
        fn set(&self, rates: &[(&str, f64)]) {
            *self.rates.lock().unwrap() = rates.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        }
    }

    #[async_trait]
    impl ExchangeRateProvider for MockRates {
        fn id(&self) -> &'static str {
            "MOCK_RATES"
        }

        async fn fetch_rates(&self) -> std::result::Result<ExchangeRates, ProviderError> {
            if *self.fail.lock().unwrap() {
                return Err(ProviderError::Timeout {
                    provider: self.id().to_string(),
                });
            }
            Ok(ExchangeRates {
                base: "USD".to_string(),
                rates: self.rates.lock().unwrap().iter().cloned().collect(),
            })
        }
    }

    // =========================================================================
    // Mock renderer
    // =========================================================================

    struct MockRenderer {
        path: PathBuf,
        rendered: Mutex<Vec<SummarySnapshot>>,
    }

    impl SummaryRendererTrait for MockRenderer {
        fn render(&self, snapshot: &SummarySnapshot) -> Result<()> {
            std::fs::write(&self.path, b"\x89PNG fake")?;
            self.rendered.lock().unwrap().push(snapshot.clone());
            Ok(())
        }

        fn output_path(&self) -> &Path {
            &self.path
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    struct Harness {
        service: CountryService,
        repository: Arc<MockRepository>,
        directory: Arc<MockDirectory>,
        rates: Arc<MockRates>,
        renderer: Arc<MockRenderer>,
        _dir: tempfile::TempDir,
    }

    fn harness_with(repository: MockRepository, batch_size: usize) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let repository = Arc::new(repository);
        let directory = Arc::new(MockDirectory::default());
        let rates = Arc::new(MockRates::default());
        let renderer = Arc::new(MockRenderer {
            path: dir.path().join("summary.png"),
            rendered: Mutex::new(Vec::new()),
        });
        let service = CountryService::new(
            repository.clone(),
            directory.clone(),
            rates.clone(),
            renderer.clone(),
        )
        .with_batch_size(batch_size);
        Harness {
            service,
            repository,
            directory,
            rates,
            renderer,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(MockRepository::default(), 50)
    }

    fn entry(name: &str, region: &str, population: i64, code: Option<&str>) -> CountryPayload {
        CountryPayload {
            name: name.to_string(),
            alpha2_code: None,
            capital: Some(format!("{} City", name)),
            region: Some(region.to_string()),
            population: Some(population),
            flag: None,
            currencies: code.map(|c| {
                vec![CurrencyPayload {
                    code: Some(c.to_string()),
                }]
            }),
        }
    }

    fn stored(id: i64, name: &str, region: Option<&str>, population: i64, code: Option<&str>, gdp: Decimal) -> Country {
        Country {
            id,
            name: name.to_string(),
            capital: None,
            region: region.map(str::to_string),
            population,
            currency_code: code.map(str::to_string),
            alpha2_code: None,
            exchange_rate: None,
            estimated_gdp: gdp,
            flag_url: None,
            last_refreshed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    async fn wait_for_render(renderer: &MockRenderer) -> Vec<SummarySnapshot> {
        for _ in 0..100 {
            let rendered = renderer.rendered.lock().unwrap().clone();
            if !rendered.is_empty() {
                return rendered;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        Vec::new()
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    #[tokio::test]
    async fn refresh_inserts_new_country_with_derived_fields() {
        let h = harness();
        h.directory.set(vec![entry("Testland", "Asia", 1000, Some("TST"))]);
        h.rates.set(&[("TST", 2.0)]);

        let before = now_utc();
        let status = h.service.refresh().await.unwrap();

        assert_eq!(status.total_countries, 1);
        let ts = status.last_refreshed_at.unwrap();
        assert!(ts >= before);

        let country = h.service.get_by_name("testland").unwrap();
        assert_eq!(country.currency_code.as_deref(), Some("TST"));
        assert_eq!(country.exchange_rate, Some(dec!(2.0000)));
        assert!(country.estimated_gdp >= dec!(500000) && country.estimated_gdp < dec!(1000000));
        assert_eq!(country.last_refreshed_at, ts);
    }

    #[tokio::test]
    async fn second_identical_refresh_affects_nothing() {
        let h = harness();
        h.directory.set(vec![
            entry("Testland", "Asia", 1000, Some("TST")),
            entry("Nocoin", "Europe", 50, None),
        ]);
        h.rates.set(&[("TST", 2.0)]);

        let first = h.service.refresh().await.unwrap();
        let rows_after_first = h.repository.all();
        let second = h.service.refresh().await.unwrap();

        assert_eq!(first.total_countries, 2);
        assert_eq!(second.total_countries, 0);
        assert_eq!(h.repository.all(), rows_after_first);
    }

    #[tokio::test]
    async fn refresh_outcome_is_independent_of_batch_size() {
        let rows: Vec<Country> = (1..=7)
            .map(|i| stored(i, &format!("Land{}", i), Some("Asia"), i * 10, Some("TST"), dec!(1)))
            .collect();
        let payload: Vec<CountryPayload> = (1..=7)
            .map(|i| entry(&format!("Land{}", i), "Africa", i * 10, Some("TST")))
            .collect();

        let mut outcomes = Vec::new();
        for batch_size in [1usize, 3, 50] {
            let h = harness_with(MockRepository::with_rows(rows.clone()), batch_size);
            h.directory.set(payload.clone());
            h.rates.set(&[("TST", 2.0)]);

            let status = h.service.refresh().await.unwrap();
            assert_eq!(status.total_countries, 7);

            let flushes = h.repository.flushes.lock().unwrap().clone();
            assert_eq!(flushes.iter().sum::<usize>(), 7);
            assert!(flushes.iter().all(|n| *n <= batch_size));

            let regions: Vec<Option<String>> =
                h.repository.all().into_iter().map(|c| c.region).collect();
            outcomes.push(regions);
        }
        assert!(outcomes.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn batch_size_is_clamped_to_one() {
        let h = harness_with(MockRepository::default(), 0);
        assert_eq!(h.service.batch_size(), 1);
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable_and_writes_nothing() {
        let h = harness();
        h.directory.set(vec![entry("Testland", "Asia", 1000, Some("TST"))]);
        *h.rates.fail.lock().unwrap() = true;

        let err = h.service.refresh().await.unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable(ref m) if m == "External data source unavailable"));
        assert_eq!(*h.repository.reconcile_calls.lock().unwrap(), 0);
        assert!(h.repository.all().is_empty());
        assert!(h.service.get_status().unwrap().last_refreshed_at.is_none());
    }

    #[tokio::test]
    async fn directory_failure_is_unavailable() {
        let h = harness();
        *h.directory.fail.lock().unwrap() = true;
        h.rates.set(&[("TST", 2.0)]);

        let err = h.service.refresh().await.unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable(_)));
    }

    #[tokio::test]
    async fn storage_failure_is_reported_as_internal() {
        let h = harness();
        h.directory.set(vec![entry("Testland", "Asia", 1000, Some("TST"))]);
        h.rates.set(&[("TST", 2.0)]);
        h.repository.set_fail_on_reconcile(true);

        let err = h.service.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Unexpected(ref m) if m == "Internal server error during processing"));
        assert!(h.service.get_status().unwrap().last_refreshed_at.is_none());
    }

    #[tokio::test]
    async fn refresh_renders_summary_in_background() {
        let h = harness();
        h.directory.set(
            (1..=7)
                .map(|i| entry(&format!("Land{}", i), "Asia", i * 1000, Some("TST")))
                .collect(),
        );
        h.rates.set(&[("TST", 1.0)]);

        let status = h.service.refresh().await.unwrap();
        let rendered = wait_for_render(&h.renderer).await;

        assert_eq!(rendered.len(), 1);
        let snapshot = &rendered[0];
        assert_eq!(snapshot.total_countries, 7);
        assert_eq!(Some(snapshot.refreshed_at), status.last_refreshed_at);
        assert_eq!(snapshot.top_countries.len(), 5);
        assert!(snapshot
            .top_countries
            .windows(2)
            .all(|w| w[0].estimated_gdp >= w[1].estimated_gdp));

        let bytes = h.service.get_summary_image().await.unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn missing_image_is_not_found() {
        let h = harness();
        let err = h.service.get_summary_image().await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "Summary image not found or not readable."));
    }

    // =========================================================================
    // Status
    // =========================================================================

    #[tokio::test]
    async fn status_is_empty_before_any_data() {
        let h = harness();
        let status = h.service.get_status().unwrap();
        assert_eq!(status.total_countries, 0);
        assert!(status.last_refreshed_at.is_none());
    }

    #[tokio::test]
    async fn status_falls_back_to_latest_stored_timestamp() {
        let mut newer = stored(2, "Beta", Some("Asia"), 1, None, dec!(0));
        newer.last_refreshed_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let rows = vec![stored(1, "Alpha", Some("Asia"), 1, None, dec!(0)), newer.clone()];
        let h = harness_with(MockRepository::with_rows(rows), 50);

        let status = h.service.get_status().unwrap();
        assert_eq!(status.total_countries, 2);
        assert_eq!(status.last_refreshed_at, Some(newer.last_refreshed_at));
    }

    #[tokio::test]
    async fn status_reports_total_rows_after_refresh() {
        let h = harness();
        h.directory.set(vec![
            entry("Testland", "Asia", 1000, Some("TST")),
            entry("Otherland", "Asia", 10, Some("TST")),
        ]);
        h.rates.set(&[("TST", 2.0)]);
        let refreshed = h.service.refresh().await.unwrap();
        h.service.refresh().await.unwrap();

        let status = h.service.get_status().unwrap();
        assert_eq!(status.total_countries, 2);
        assert!(status.last_refreshed_at >= refreshed.last_refreshed_at);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn query_fixture() -> Harness {
        harness_with(
            MockRepository::with_rows(vec![
                stored(1, "Alpha", Some("Asia"), 300, Some("USD"), dec!(30)),
                stored(2, "Beta", Some("Southeast Asia"), 100, Some("EUR"), dec!(10)),
                stored(3, "Gamma", Some("Europe"), 200, Some("USD"), dec!(20)),
                stored(4, "Delta", None, 400, None, dec!(0)),
            ]),
            50,
        )
    }

    #[tokio::test]
    async fn filters_are_case_insensitive_substrings_and_combine() {
        let h = query_fixture();

        let asia = h.service.list_countries(Some("ASIA"), None, None).unwrap();
        assert_eq!(asia.len(), 2);

        let both = h
            .service
            .list_countries(Some("asia"), Some("usd"), None)
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "Alpha");

        let none = h.service.list_countries(Some("mars"), None, None).unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn sort_orders_by_requested_field() {
        let h = query_fixture();

        let by_pop = h
            .service
            .list_countries(None, None, Some("population_desc"))
            .unwrap();
        let pops: Vec<i64> = by_pop.iter().map(|c| c.population).collect();
        assert_eq!(pops, vec![400, 300, 200, 100]);

        let by_gdp = h
            .service
            .list_countries(None, None, Some("estimatedGdp"))
            .unwrap();
        assert_eq!(by_gdp.first().unwrap().name, "Delta");
    }

    #[tokio::test]
    async fn invalid_sort_is_rejected() {
        let h = query_fixture();
        let err = h
            .service
            .list_countries(None, None, Some("flag_asc"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(ref m) if m == "Invalid sort field: flag_asc"));
    }

    #[tokio::test]
    async fn region_lookup_is_exact_and_not_found_when_empty() {
        let h = query_fixture();

        let asia = h.service.list_by_region("asia").unwrap();
        assert_eq!(asia.len(), 1);
        assert_eq!(asia[0].name, "Alpha");

        let err = h.service.list_by_region("Mars").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "No countries found for region: Mars"));

        let err = h.service.list_by_region("  ").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let h = query_fixture();
        let err = h.service.get_by_name("Atlantis").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "Country not found: Atlantis"));
    }

    // =========================================================================
    // Writes
    // =========================================================================

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let h = query_fixture();

        h.service.delete_by_name("gamma").await.unwrap();
        assert!(matches!(
            h.service.get_by_name("Gamma").unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            h.service.delete_by_name("Gamma").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert_eq!(h.service.get_status().unwrap().total_countries, 3);
    }

    #[tokio::test]
    async fn update_applies_changes_and_stamps_row() {
        let h = query_fixture();
        let before = h.service.get_by_name("Beta").unwrap();

        let updated = h
            .service
            .update_country(
                "BETA",
                CountryUpdate {
                    capital: Some("Capital".to_string()),
                    estimated_gdp: Some(dec!(99.50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.capital.as_deref(), Some("Capital"));
        assert_eq!(updated.estimated_gdp, dec!(99.50));
        assert_eq!(updated.population, before.population);
        assert!(updated.last_refreshed_at > before.last_refreshed_at);

        let err = h
            .service
            .update_country("Atlantis", CountryUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn refresh_after_manual_update_does_not_move_timestamp_back() {
        let h = harness();
        h.directory.set(vec![entry("Testland", "Asia", 1000, Some("TST"))]);
        h.rates.set(&[("TST", 2.0)]);
        h.service.refresh().await.unwrap();

        // A manual edit stamped in the future relative to the next cycle.
        let future = now_utc() + Duration::hours(1);
        {
            let mut rows = h.repository.rows.lock().unwrap();
            rows[0].last_refreshed_at = future;
            rows[0].capital = Some("Edited".to_string());
        }

        let status = h.service.refresh().await.unwrap();
        assert_eq!(status.total_countries, 1);
        let country = h.service.get_by_name("Testland").unwrap();
        assert_eq!(country.capital.as_deref(), Some("Testland City"));
        assert_eq!(country.last_refreshed_at, future);
    }
}
