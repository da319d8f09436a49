//! Exchange rates backed by an open.er-api.com compatible endpoint.

use async_trait::async_trait;
use log::info;
use reqwest::Client;

use super::http::{get_json, HttpSettings};
use super::traits::ExchangeRateProvider;
use crate::errors::ProviderError;
use crate::models::{ExchangeRates, ExchangeRatesResponse};

const PROVIDER_ID: &str = "OPEN_EXCHANGE_RATES";

/// Base assumed when the response omits it; the default endpoint is USD-based.
const DEFAULT_BASE: &str = "USD";

pub struct OpenExchangeRateProvider {
    client: Client,
    url: String,
}

impl OpenExchangeRateProvider {
    pub fn new(url: impl Into<String>, settings: &HttpSettings) -> Self {
        Self {
            client: settings.build_client(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ExchangeRateProvider for OpenExchangeRateProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rates(&self) -> Result<ExchangeRates, ProviderError> {
        let response = get_json::<ExchangeRatesResponse>(&self.client, PROVIDER_ID, &self.url)
            .await?
            .ok_or_else(|| invalid("Exchange Rate API returned null data."))?;

        let rates = response
            .rates
            .ok_or_else(|| invalid("Exchange Rate API returned no rates."))?;
        let base = response.base.unwrap_or_else(|| DEFAULT_BASE.to_string());
        info!("{} returned {} rates (base {})", PROVIDER_ID, rates.len(), base);

        Ok(ExchangeRates { base, rates })
    }
}

fn invalid(message: &str) -> ProviderError {
    ProviderError::InvalidPayload {
        provider: PROVIDER_ID.to_string(),
        message: message.to_string(),
    }
}
