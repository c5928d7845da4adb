//! Pollinations image-generation provider.
//!
//! Implements [`provider_core::ImageProvider`] against the Pollinations
//! HTTP endpoint, which renders an image for a prompt encoded into the URL
//! path. Every request carries a random seed so repeated prompts produce
//! distinct images.

mod config;
mod provider;

pub use config::{PollinationsConfig, PollinationsConfigBuilder};
pub use provider::PollinationsImage;
