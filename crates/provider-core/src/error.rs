//! Error types for provider calls.

use thiserror::Error;

/// Errors that can occur when calling an external AI provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be configured (missing key, bad URL, etc.).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never completed (connection refused, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The provider returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider replied with a body we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call timed out.
    #[error("provider call timed out")]
    Timeout,
}

impl ProviderError {
    /// Whether this error came from the provider itself rather than our setup.
    pub fn is_provider_side(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_)
                | ProviderError::Api { .. }
                | ProviderError::MalformedResponse(_)
                | ProviderError::Timeout
        )
    }
}
