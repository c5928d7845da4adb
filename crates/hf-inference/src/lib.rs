//! Hugging Face Inference API text provider.
//!
//! Implements [`provider_core::TextProvider`] against the hosted
//! text-generation endpoint (`POST /models/{model_id}`). Conversation
//! context is flattened into the request input, and the echoed prompt that
//! the endpoint tends to include in its output is stripped before the reply
//! is returned.

mod api_types;
mod config;
mod provider;

pub use api_types::{ApiError, GenerationParameters, GenerationRequest, GeneratedText};
pub use config::{HfConfig, HfConfigBuilder};
pub use provider::HfTextProvider;
