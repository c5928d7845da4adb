//! Configuration for the Pollinations provider.

use std::env;
use std::time::Duration;

/// Configuration for [`crate::PollinationsImage`].
#[derive(Debug, Clone)]
pub struct PollinationsConfig {
    /// Base URL; the prompt is appended as a path segment.
    pub base_url: String,

    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Request timeout. Image rendering is slow; allow generous headroom.
    pub timeout: Duration,
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pollinations.ai/p".to_string(),
            width: 1024,
            height: 1024,
            timeout: Duration::from_secs(120),
        }
    }
}

impl PollinationsConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `POLLINATIONS_BASE_URL` - Base URL (default: https://pollinations.ai/p)
    /// - `POLLINATIONS_WIDTH` - Image width (default: 1024)
    /// - `POLLINATIONS_HEIGHT` - Image height (default: 1024)
    /// - `POLLINATIONS_TIMEOUT_SECS` - Request timeout (default: 120)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: env::var("POLLINATIONS_BASE_URL").unwrap_or(defaults.base_url),
            width: env::var("POLLINATIONS_WIDTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.width),
            height: env::var("POLLINATIONS_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.height),
            timeout: env::var("POLLINATIONS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> PollinationsConfigBuilder {
        PollinationsConfigBuilder::default()
    }
}

/// Builder for [`PollinationsConfig`].
#[derive(Debug, Default)]
pub struct PollinationsConfigBuilder {
    config: PollinationsConfig,
}

impl PollinationsConfigBuilder {
    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the image dimensions.
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PollinationsConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PollinationsConfig::default();
        assert_eq!(config.base_url, "https://pollinations.ai/p");
        assert_eq!(config.width, 1024);
        assert_eq!(config.height, 1024);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_builder() {
        let config = PollinationsConfig::builder()
            .base_url("https://mirror.example/p")
            .dimensions(512, 768)
            .timeout(Duration::from_secs(30))
            .build();

        assert_eq!(config.base_url, "https://mirror.example/p");
        assert_eq!(config.width, 512);
        assert_eq!(config.height, 768);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
