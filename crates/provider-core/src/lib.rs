//! Core traits and types for AI provider implementations.
//!
//! This crate provides the shared interface between the Tally bot core and
//! the external inference services it calls. It defines:
//!
//! - [`TextProvider`] - The trait text-completion backends implement
//! - [`ImageProvider`] - The trait image-generation backends implement
//! - [`ChatMessage`] - The inbound chat message type
//! - [`Turn`] / [`TurnRole`] - Conversation history entries
//! - [`ProviderError`] - Error types for provider calls
//!
//! # Example
//!
//! ```rust
//! use provider_core::{ProviderError, TextProvider, Turn};
//! use async_trait::async_trait;
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl TextProvider for MyProvider {
//!     async fn complete(
//!         &self,
//!         _model_id: &str,
//!         prompt: &str,
//!         _context: &[Turn],
//!     ) -> Result<String, ProviderError> {
//!         Ok(format!("echo: {}", prompt))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyProvider"
//!     }
//! }
//! ```

mod error;
mod message;
mod trait_def;
mod truncate;

pub use error::ProviderError;
pub use message::{ChatMessage, Turn, TurnRole};
pub use trait_def::{ImageOutput, ImageProvider, TextProvider};
pub use truncate::truncate_reply;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
