//! The provider trait definitions.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::Turn;

/// A text-completion backend.
///
/// Implementations range from canned test doubles to HTTP clients for
/// hosted inference APIs. The trait is object-safe and usable as
/// `Arc<dyn TextProvider>`.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// # Arguments
    ///
    /// * `model_id` - Provider-side model identifier to run against.
    /// * `prompt` - The user's current message.
    /// * `context` - Prior turns, oldest first, already bounded by the caller.
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        context: &[Turn],
    ) -> Result<String, ProviderError>;

    /// Human-readable name for this provider.
    fn name(&self) -> &str;
}

/// A generated image ready for attachment delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutput {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// File name to attach as.
    pub file_name: String,
}

impl ImageOutput {
    /// Create an output with the conventional attachment name.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: "ai_image.png".to_string(),
        }
    }
}

/// An image-generation backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate an image for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<ImageOutput, ProviderError>;

    /// Human-readable name for this provider.
    fn name(&self) -> &str;
}
