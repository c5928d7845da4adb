//! PollinationsImage implementation.

use async_trait::async_trait;
use provider_core::{ImageOutput, ImageProvider, ProviderError};
use rand::Rng;
use reqwest::Client;
use tracing::debug;

use crate::config::PollinationsConfig;

/// Upper bound for the per-request random seed.
const SEED_RANGE: u32 = 100_000;

/// An [`ImageProvider`] backed by the Pollinations endpoint.
pub struct PollinationsImage {
    client: Client,
    config: PollinationsConfig,
}

impl PollinationsImage {
    /// Create a new provider with the given configuration.
    pub fn new(config: PollinationsConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables.
    ///
    /// See [`PollinationsConfig::from_env`] for the recognized variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(PollinationsConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &PollinationsConfig {
        &self.config
    }

    /// Build the request URL for a prompt and seed.
    fn build_url(&self, prompt: &str, seed: u32) -> String {
        format!(
            "{}/{}?width={}&height={}&seed={}",
            self.config.base_url,
            urlencoding::encode(prompt),
            self.config.width,
            self.config.height,
            seed
        )
    }
}

#[async_trait]
impl ImageProvider for PollinationsImage {
    async fn generate(&self, prompt: &str) -> Result<ImageOutput, ProviderError> {
        let seed = rand::thread_rng().gen_range(0..SEED_RANGE);
        let url = self.build_url(prompt, seed);

        debug!("Requesting image (seed {}): {}", seed, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Network(format!("Failed to send request: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to read body: {}", e)))?;

        if bytes.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "empty image body".to_string(),
            ));
        }

        Ok(ImageOutput::png(bytes.to_vec()))
    }

    fn name(&self) -> &str {
        "PollinationsImage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_prompt() {
        let provider = PollinationsImage::new(PollinationsConfig::default()).unwrap();
        let url = provider.build_url("a cat & a dog", 42);
        assert_eq!(
            url,
            "https://pollinations.ai/p/a%20cat%20%26%20a%20dog?width=1024&height=1024&seed=42"
        );
    }

    #[test]
    fn test_build_url_custom_dimensions() {
        let config = PollinationsConfig::builder().dimensions(512, 512).build();
        let provider = PollinationsImage::new(config).unwrap();
        let url = provider.build_url("tree", 7);
        assert!(url.ends_with("/tree?width=512&height=512&seed=7"));
    }

    #[test]
    fn test_provider_name() {
        let provider = PollinationsImage::new(PollinationsConfig::default()).unwrap();
        assert_eq!(provider.name(), "PollinationsImage");
    }
}
