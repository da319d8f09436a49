//! Country directory backed by a restcountries-compatible endpoint.

use async_trait::async_trait;
use log::info;
use reqwest::Client;

use super::http::{get_json, HttpSettings};
use super::traits::CountryDirectoryProvider;
use crate::errors::ProviderError;
use crate::models::CountryPayload;

const PROVIDER_ID: &str = "REST_COUNTRIES";

pub struct RestCountriesProvider {
    client: Client,
    url: String,
}

impl RestCountriesProvider {
    pub fn new(url: impl Into<String>, settings: &HttpSettings) -> Self {
        Self {
            client: settings.build_client(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CountryDirectoryProvider for RestCountriesProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_countries(&self) -> Result<Vec<CountryPayload>, ProviderError> {
        let countries = get_json::<Vec<CountryPayload>>(&self.client, PROVIDER_ID, &self.url)
            .await?
            .ok_or_else(|| ProviderError::InvalidPayload {
                provider: PROVIDER_ID.to_string(),
                message: "Country API returned null data.".to_string(),
            })?;
        info!("{} returned {} countries", PROVIDER_ID, countries.len());
        Ok(countries)
    }
}
