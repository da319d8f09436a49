use std::sync::Arc;

use country_cache_core::{
    countries::{CountryService, CountryServiceTrait},
    summary::SummaryRendererTrait,
};
use country_cache_providers::{HttpSettings, OpenExchangeRateProvider, RestCountriesProvider};
use country_cache_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, CountryRepository,
};
use country_cache_summary::PngSummaryRenderer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub country_service: Arc<dyn CountryServiceTrait>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = match format {
        LogFormat::Json => fmt::layer().json().with_current_span(false).boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .boxed(),
    };
    // try_init: integration tests may build several apps in one process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer(pool.clone());
    let repository = Arc::new(CountryRepository::new(pool, writer));

    let http = HttpSettings {
        connect_timeout: config.provider_connect_timeout,
        read_timeout: config.provider_read_timeout,
    };
    let country_provider = Arc::new(RestCountriesProvider::new(
        config.countries_api_url.clone(),
        &http,
    ));
    let rate_provider = Arc::new(OpenExchangeRateProvider::new(
        config.exchange_rate_api_url.clone(),
        &http,
    ));

    let renderer: Arc<dyn SummaryRendererTrait> = Arc::new(
        PngSummaryRenderer::new(config.summary_image_path.clone())
            .with_font_path(config.summary_font_path.clone()),
    );

    let country_service = CountryService::new(repository, country_provider, rate_provider, renderer)
        .with_batch_size(config.refresh_batch_size);
    tracing::info!(
        "Country service ready (batch size {}, image at {})",
        country_service.batch_size(),
        config.summary_image_path.display()
    );

    Ok(Arc::new(AppState {
        country_service: Arc::new(country_service),
    }))
}
