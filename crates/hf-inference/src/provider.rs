//! HfTextProvider implementation.

use async_trait::async_trait;
use provider_core::{ProviderError, TextProvider, Turn, TurnRole};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{ApiError, GeneratedText, GenerationParameters, GenerationRequest};
use crate::config::HfConfig;

/// Stock reply when the cleaned generation comes back empty.
const EMPTY_REPLY_FALLBACK: &str = "I'm not sure how to answer that.";

/// A [`TextProvider`] backed by the Hugging Face Inference API.
pub struct HfTextProvider {
    client: Client,
    config: HfConfig,
}

impl HfTextProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: HfConfig) -> Result<Self, ProviderError> {
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
    /// See [`HfConfig::from_env`] for the recognized variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(HfConfig::from_env())
    }

    /// Get the configuration.
    pub fn config(&self) -> &HfConfig {
        &self.config
    }

    /// Flatten prior turns and the current prompt into one input string.
    ///
    /// The raw text-generation endpoint has no messages array, so the
    /// conversation becomes labelled lines with a trailing open slot for
    /// the model to continue.
    fn build_inputs(prompt: &str, context: &[Turn]) -> String {
        if context.is_empty() {
            return prompt.to_string();
        }

        let mut inputs = String::new();
        for turn in context {
            let label = match turn.role {
                TurnRole::User => "User",
                TurnRole::Model => "Assistant",
            };
            inputs.push_str(label);
            inputs.push_str(": ");
            inputs.push_str(&turn.text);
            inputs.push('\n');
        }
        inputs.push_str("User: ");
        inputs.push_str(prompt);
        inputs.push_str("\nAssistant:");
        inputs
    }

    /// Strip the echoed input from a generation.
    ///
    /// The endpoint frequently returns the input text followed by the
    /// continuation. If nothing remains after stripping, fall back to a
    /// stock phrase rather than an empty reply.
    fn clean_reply(raw: &str, inputs: &str, prompt: &str) -> String {
        let cleaned = match raw.strip_prefix(inputs) {
            Some(rest) => rest.to_string(),
            None => raw.replacen(prompt, "", 1),
        };

        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            cleaned.to_string()
        }
    }
}

#[async_trait]
impl TextProvider for HfTextProvider {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        context: &[Turn],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}", self.config.api_url, model_id);
        let inputs = Self::build_inputs(prompt, context);

        let request = GenerationRequest {
            inputs: inputs.clone(),
            parameters: Some(GenerationParameters {
                max_new_tokens: self.config.max_new_tokens,
                temperature: self.config.temperature,
            }),
        };

        debug!("Sending generation request to {}", url);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(ref token) = self.config.api_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Network(format!("Failed to send request: {}", e))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                if let Some(eta) = api_error.estimated_time {
                    warn!("Model {} still loading (eta {:.0}s)", model_id, eta);
                }
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message: api_error.error,
                });
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let generations: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {}", e)))?;

        let raw = generations
            .first()
            .map(|g| g.generated_text.as_str())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("empty generations array".to_string())
            })?;

        Ok(Self::clean_reply(raw, &inputs, prompt))
    }

    fn name(&self) -> &str {
        "HfTextProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_inputs_no_context() {
        assert_eq!(HfTextProvider::build_inputs("hello", &[]), "hello");
    }

    #[test]
    fn test_build_inputs_with_context() {
        let context = vec![Turn::user("hi"), Turn::model("hello!")];
        let inputs = HfTextProvider::build_inputs("how are you?", &context);
        assert_eq!(
            inputs,
            "User: hi\nAssistant: hello!\nUser: how are you?\nAssistant:"
        );
    }

    #[test]
    fn test_clean_reply_strips_echoed_inputs() {
        let reply = HfTextProvider::clean_reply("hello Hi there!", "hello", "hello");
        assert_eq!(reply, "Hi there!");
    }

    #[test]
    fn test_clean_reply_strips_embedded_prompt() {
        let reply = HfTextProvider::clean_reply(
            "Answer to hello is: greetings",
            "something else",
            "hello",
        );
        assert_eq!(reply, "Answer to  is: greetings");
    }

    #[test]
    fn test_clean_reply_empty_falls_back() {
        let reply = HfTextProvider::clean_reply("hello", "hello", "hello");
        assert_eq!(reply, EMPTY_REPLY_FALLBACK);
    }

    #[test]
    fn test_clean_reply_passthrough() {
        let reply = HfTextProvider::clean_reply("A fresh answer.", "inputs", "prompt");
        assert_eq!(reply, "A fresh answer.");
    }

    #[test]
    fn test_provider_name() {
        let provider = HfTextProvider::new(HfConfig::default()).unwrap();
        assert_eq!(provider.name(), "HfTextProvider");
    }
}
