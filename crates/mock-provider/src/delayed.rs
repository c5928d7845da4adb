//! Delayed text provider - wraps another provider with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use provider_core::{ProviderError, TextProvider, Turn};
use tokio::time::sleep;

/// A text provider that adds artificial delay before delegating.
///
/// Useful for simulating slow inference calls and exercising the
/// interleaving that happens while a handler is suspended.
pub struct DelayedText<P: TextProvider> {
    inner: P,
    delay: Duration,
}

impl<P: TextProvider> DelayedText<P> {
    /// Wrap `inner` with the given delay.
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Wrap `inner` with a delay in milliseconds.
    pub fn with_millis(inner: P, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<P: TextProvider> TextProvider for DelayedText<P> {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        context: &[Turn],
    ) -> Result<String, ProviderError> {
        sleep(self.delay).await;
        self.inner.complete(model_id, prompt, context).await
    }

    fn name(&self) -> &str {
        "DelayedText"
    }
}
