//! Canned and failing image providers.

use std::sync::Mutex;

use async_trait::async_trait;
use provider_core::{ImageOutput, ImageProvider, ProviderError};

/// An image provider that returns fixed bytes and records every prompt.
pub struct CannedImage {
    bytes: Vec<u8>,
    prompts: Mutex<Vec<String>>,
}

impl CannedImage {
    /// Create a provider that always returns `bytes`.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider returning a tiny placeholder payload.
    pub fn placeholder() -> Self {
        Self::new(vec![0x89, 0x50, 0x4e, 0x47])
    }

    /// Number of generations requested so far.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Snapshot of all recorded prompts.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for CannedImage {
    async fn generate(&self, prompt: &str) -> Result<ImageOutput, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(ImageOutput::png(self.bytes.clone()))
    }

    fn name(&self) -> &str {
        "CannedImage"
    }
}

/// An image provider that always fails.
pub struct FailingImage {
    message: String,
    calls: Mutex<usize>,
}

impl FailingImage {
    /// Fail every call with an API error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Mutex::new(0),
        }
    }

    /// Number of generations attempted so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ImageProvider for FailingImage {
    async fn generate(&self, _prompt: &str) -> Result<ImageOutput, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Err(ProviderError::Api {
            status: 500,
            message: self.message.clone(),
        })
    }

    fn name(&self) -> &str {
        "FailingImage"
    }
}
