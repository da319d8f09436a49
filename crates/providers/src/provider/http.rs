use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::errors::ProviderError;

/// Connection settings shared by the HTTP providers.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl HttpSettings {
    pub(crate) fn build_client(&self) -> Client {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.read_timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}

/// GET `url` and decode the JSON body. `None` means the body was `null`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: &str,
) -> Result<Option<T>, ProviderError> {
    debug!("{}: GET {}", provider, url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?
        .error_for_status()
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;

    serde_json::from_slice::<Option<T>>(&bytes).map_err(|e| ProviderError::InvalidPayload {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}
