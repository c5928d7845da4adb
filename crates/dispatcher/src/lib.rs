//! Command dispatcher for the Tally bot.
//!
//! Parses prefix commands out of inbound chat messages, routes them to
//! handlers, and gates text and image generation on the credit ledger.
//! The dispatcher is platform-agnostic: inbound messages arrive as
//! [`ChatMessage`] values and outbound replies go through a [`ChatSink`]
//! implementation, so the same core serves any chat frontend.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dispatcher::{BotConfig, ChatMessage, Dispatcher, LoggingSink, ModelRegistry};
//! use hf_inference::HfTextProvider;
//! use ledger::Ledger;
//! use pollinations::PollinationsImage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Ledger::connect("sqlite:tally.db?mode=rwc").await?;
//!     ledger.migrate().await?;
//!
//!     let dispatcher = Dispatcher::new(
//!         ledger,
//!         ModelRegistry::default(),
//!         Arc::new(HfTextProvider::from_env()?),
//!         Arc::new(PollinationsImage::from_env()?),
//!         LoggingSink,
//!         BotConfig::from_env(),
//!     );
//!
//!     let msg = ChatMessage::new("1234", "chan-1", ".help");
//!     dispatcher.handle_message(&msg).await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod sink;

pub use command::Command;
pub use config::BotConfig;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::DispatchError;
pub use registry::{ModelRegistry, ModelSpec};
pub use sink::{ChatSink, LoggingSink, NoOpSink, RecordingSink, SentAttachment, SentReply};

// Re-export what frontends need to implement a sink and hand us messages.
pub use provider_core::{async_trait, ChatMessage, Turn, TurnRole};
