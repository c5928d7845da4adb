//! Bot configuration.

use std::env;

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Command prefix.
    pub prefix: String,

    /// User ID allowed to run `give`. When unset, `give` is refused for
    /// everyone.
    pub owner_id: Option<String>,

    /// Credits per message on a premium text model.
    pub premium_text_cost: i64,

    /// Credits per image generation. Always charged, regardless of the
    /// selected text model.
    pub image_cost: i64,

    /// Turns of history passed as provider context.
    pub context_turns: u32,

    /// Turns of history retained in storage.
    pub history_retention: u32,

    /// Reply truncation limit in characters, below the platform's ~2000
    /// character message ceiling.
    pub reply_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: ".".to_string(),
            owner_id: None,
            premium_text_cost: 1,
            image_cost: 2,
            context_turns: 10,
            history_retention: 50,
            reply_limit: 1900,
        }
    }
}

impl BotConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `BOT_PREFIX` - Command prefix (default: ".")
    /// - `BOT_OWNER_ID` - Owner user ID (default: unset, `give` disabled)
    /// - `BOT_PREMIUM_TEXT_COST` - Premium text cost (default: 1)
    /// - `BOT_IMAGE_COST` - Image generation cost (default: 2)
    /// - `BOT_CONTEXT_TURNS` - Context window turns (default: 10)
    /// - `BOT_HISTORY_RETENTION` - Stored history turns (default: 50)
    /// - `BOT_REPLY_LIMIT` - Reply truncation limit (default: 1900)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            prefix: env::var("BOT_PREFIX").unwrap_or(defaults.prefix),
            owner_id: env::var("BOT_OWNER_ID").ok().filter(|v| !v.is_empty()),
            premium_text_cost: env::var("BOT_PREMIUM_TEXT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.premium_text_cost),
            image_cost: env::var("BOT_IMAGE_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.image_cost),
            context_turns: env::var("BOT_CONTEXT_TURNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.context_turns),
            history_retention: env::var("BOT_HISTORY_RETENTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.history_retention),
            reply_limit: env::var("BOT_REPLY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reply_limit),
        }
    }

    /// Create a new config builder.
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }
}

/// Builder for [`BotConfig`].
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    config: BotConfig,
}

impl BotConfigBuilder {
    /// Set the command prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the owner user ID.
    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.config.owner_id = Some(owner_id.into());
        self
    }

    /// Set the premium text cost.
    pub fn premium_text_cost(mut self, cost: i64) -> Self {
        self.config.premium_text_cost = cost;
        self
    }

    /// Set the image generation cost.
    pub fn image_cost(mut self, cost: i64) -> Self {
        self.config.image_cost = cost;
        self
    }

    /// Set the context window size in turns.
    pub fn context_turns(mut self, turns: u32) -> Self {
        self.config.context_turns = turns;
        self
    }

    /// Set the stored history retention in turns.
    pub fn history_retention(mut self, turns: u32) -> Self {
        self.config.history_retention = turns;
        self
    }

    /// Set the reply truncation limit.
    pub fn reply_limit(mut self, limit: usize) -> Self {
        self.config.reply_limit = limit;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> BotConfig {
        self.config
    }
}
