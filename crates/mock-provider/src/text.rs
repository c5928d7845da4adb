//! Canned and failing text providers.

use std::sync::Mutex;

use async_trait::async_trait;
use provider_core::{ProviderError, TextProvider, Turn};

/// One recorded call to a canned provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompletion {
    /// Model identifier the dispatcher resolved.
    pub model_id: String,
    /// The prompt text.
    pub prompt: String,
    /// Context turns passed alongside the prompt.
    pub context: Vec<Turn>,
}

/// A text provider that returns a fixed reply and records every call.
pub struct CannedText {
    reply: String,
    calls: Mutex<Vec<RecordedCompletion>>,
}

impl CannedText {
    /// Create a provider that always replies with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCompletion> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for CannedText {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        context: &[Turn],
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCompletion {
            model_id: model_id.to_string(),
            prompt: prompt.to_string(),
            context: context.to_vec(),
        });
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "CannedText"
    }
}

/// Which error a failing provider should produce.
#[derive(Debug, Clone)]
enum FailKind {
    Timeout,
    Api { status: u16, message: String },
    Network(String),
}

impl FailKind {
    fn to_error(&self) -> ProviderError {
        match self {
            FailKind::Timeout => ProviderError::Timeout,
            FailKind::Api { status, message } => ProviderError::Api {
                status: *status,
                message: message.clone(),
            },
            FailKind::Network(message) => ProviderError::Network(message.clone()),
        }
    }
}

/// A text provider that always fails, for exercising rollback paths.
pub struct FailingText {
    kind: FailKind,
    calls: Mutex<usize>,
}

impl FailingText {
    /// Fail every call with a timeout.
    pub fn timeout() -> Self {
        Self {
            kind: FailKind::Timeout,
            calls: Mutex::new(0),
        }
    }

    /// Fail every call with an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailKind::Api {
                status,
                message: message.into(),
            },
            calls: Mutex::new(0),
        }
    }

    /// Fail every call with a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailKind::Network(message.into()),
            calls: Mutex::new(0),
        }
    }

    /// Number of completions attempted so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextProvider for FailingText {
    async fn complete(
        &self,
        _model_id: &str,
        _prompt: &str,
        _context: &[Turn],
    ) -> Result<String, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Err(self.kind.to_error())
    }

    fn name(&self) -> &str {
        "FailingText"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_reply_and_recording() {
        let provider = CannedText::new("Hi there");

        let reply = provider
            .complete("llama", "hello", &[Turn::user("earlier")])
            .await
            .unwrap();

        assert_eq!(reply, "Hi there");
        assert_eq!(provider.call_count(), 1);
        let calls = provider.calls();
        assert_eq!(calls[0].model_id, "llama");
        assert_eq!(calls[0].prompt, "hello");
        assert_eq!(calls[0].context.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_timeout() {
        let provider = FailingText::timeout();

        let result = provider.complete("llama", "hello", &[]).await;
        assert!(matches!(result, Err(ProviderError::Timeout)));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_api_error() {
        let provider = FailingText::api(503, "overloaded");

        let result = provider.complete("llama", "hello", &[]).await;
        match result {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected API error, got {:?}", other.map(|_| ())),
        }
    }
}
