//! Chat sink trait and implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::DispatchError;

/// Capability for delivering replies and attachments to the origin channel.
///
/// Abstracted to support different transports (Discord client, tests).
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Send a text reply into a channel.
    async fn reply(&self, channel_id: &str, text: &str) -> Result<(), DispatchError>;

    /// Send image bytes as an attachment into a channel.
    async fn send_image(
        &self,
        channel_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), DispatchError>;
}

/// A no-op sink for testing that discards everything.
#[derive(Debug, Clone, Default)]
pub struct NoOpSink;

#[async_trait]
impl ChatSink for NoOpSink {
    async fn reply(&self, _channel_id: &str, _text: &str) -> Result<(), DispatchError> {
        Ok(())
    }

    async fn send_image(
        &self,
        _channel_id: &str,
        _file_name: &str,
        _bytes: &[u8],
    ) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// A sink that logs all deliveries, for debugging.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink;

#[async_trait]
impl ChatSink for LoggingSink {
    async fn reply(&self, channel_id: &str, text: &str) -> Result<(), DispatchError> {
        tracing::info!("[{}] reply: {}", channel_id, text);
        Ok(())
    }

    async fn send_image(
        &self,
        channel_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), DispatchError> {
        tracing::info!("[{}] attachment {} ({} bytes)", channel_id, file_name, bytes.len());
        Ok(())
    }
}

/// A recorded text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub channel_id: String,
    pub text: String,
}

/// A recorded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAttachment {
    pub channel_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A sink that records everything sent through it, for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    replies: Arc<Mutex<Vec<SentReply>>>,
    attachments: Arc<Mutex<Vec<SentAttachment>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded replies.
    pub fn replies(&self) -> Vec<SentReply> {
        self.replies.lock().unwrap().clone()
    }

    /// Texts of recorded replies, in send order.
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies.lock().unwrap().iter().map(|r| r.text.clone()).collect()
    }

    /// Snapshot of recorded attachments.
    pub fn attachments(&self) -> Vec<SentAttachment> {
        self.attachments.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSink for RecordingSink {
    async fn reply(&self, channel_id: &str, text: &str) -> Result<(), DispatchError> {
        self.replies.lock().unwrap().push(SentReply {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_image(
        &self,
        channel_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), DispatchError> {
        self.attachments.lock().unwrap().push(SentAttachment {
            channel_id: channel_id.to_string(),
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
