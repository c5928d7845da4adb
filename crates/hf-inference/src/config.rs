//! Configuration for the Hugging Face provider.

use std::env;
use std::time::Duration;

/// Configuration for [`crate::HfTextProvider`].
#[derive(Debug, Clone)]
pub struct HfConfig {
    /// Inference API base URL.
    pub api_url: String,

    /// Optional API token. The public endpoint accepts anonymous requests
    /// at heavily throttled rates.
    pub api_token: Option<String>,

    /// Maximum tokens to generate.
    pub max_new_tokens: Option<u32>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for HfConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api-inference.huggingface.co".to_string(),
            api_token: None,
            max_new_tokens: Some(512),
            temperature: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl HfConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `HF_API_URL` - API URL (default: https://api-inference.huggingface.co)
    /// - `HF_API_TOKEN` - API token (default: anonymous)
    /// - `HF_MAX_NEW_TOKENS` - Max generated tokens (default: 512)
    /// - `HF_TEMPERATURE` - Temperature (default: unset)
    /// - `HF_TIMEOUT_SECS` - Request timeout in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_url: env::var("HF_API_URL").unwrap_or(defaults.api_url),
            api_token: env::var("HF_API_TOKEN").ok().filter(|t| !t.is_empty()),
            max_new_tokens: env::var("HF_MAX_NEW_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .or(defaults.max_new_tokens),
            temperature: env::var("HF_TEMPERATURE").ok().and_then(|v| v.parse().ok()),
            timeout: env::var("HF_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> HfConfigBuilder {
        HfConfigBuilder::default()
    }
}

/// Builder for [`HfConfig`].
#[derive(Debug, Default)]
pub struct HfConfigBuilder {
    config: HfConfig,
}

impl HfConfigBuilder {
    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the API token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    /// Set the max generated tokens.
    pub fn max_new_tokens(mut self, tokens: u32) -> Self {
        self.config.max_new_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HfConfig {
        self.config
    }
}
