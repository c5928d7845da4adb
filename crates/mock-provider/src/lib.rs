//! Mock provider implementations for testing command dispatch.
//!
//! This crate provides test doubles for the provider traits:
//! - `CannedText` / `CannedImage` - Return a fixed result and record calls
//! - `FailingText` / `FailingImage` - Always fail with a chosen error
//! - `DelayedText` - Wraps another text provider with artificial delay
//!
//! The canned and failing doubles record every call, so tests can assert
//! that a rejected command never reached the provider.
//!
//! # Example
//!
//! ```rust
//! use mock_provider::{CannedText, TextProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_provider::ProviderError> {
//!     let provider = CannedText::new("Hi there");
//!
//!     let reply = provider.complete("any-model", "hello", &[]).await?;
//!     assert_eq!(reply, "Hi there");
//!     assert_eq!(provider.call_count(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod image;
mod text;

// Re-export provider-core types for convenience
pub use provider_core::{
    async_trait, ChatMessage, ImageOutput, ImageProvider, ProviderError, TextProvider, Turn,
    TurnRole,
};

pub use delayed::DelayedText;
pub use image::{CannedImage, FailingImage};
pub use text::{CannedText, FailingText, RecordedCompletion};
