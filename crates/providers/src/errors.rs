//! Error types for provider calls.

use thiserror::Error;

/// Errors raised while talking to an external provider.
///
/// Every variant means the provider could not supply a usable snapshot;
/// callers are expected to abort the refresh cycle rather than retry
/// individual entries.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The HTTP request could not be completed (DNS, connect, TLS, reset).
    #[error("Request to {provider} failed: {message}")]
    RequestFailed { provider: String, message: String },

    /// The request did not complete within the configured timeout.
    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} responded with HTTP {status}")]
    BadStatus { provider: String, status: u16 },

    /// The body was null, missing required fields, or not valid JSON.
    #[error("{provider} returned an unusable payload: {message}")]
    InvalidPayload { provider: String, message: String },
}

impl ProviderError {
    pub(crate) fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ProviderError::Timeout {
                provider: provider.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return ProviderError::BadStatus {
                provider: provider.to_string(),
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return ProviderError::InvalidPayload {
                provider: provider.to_string(),
                message: err.to_string(),
            };
        }
        ProviderError::RequestFailed {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }

    /// Name of the provider that produced the error.
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::RequestFailed { provider, .. }
            | ProviderError::Timeout { provider }
            | ProviderError::BadStatus { provider, .. }
            | ProviderError::InvalidPayload { provider, .. } => provider,
        }
    }
}
