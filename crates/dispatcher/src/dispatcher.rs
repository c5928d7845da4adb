//! Main dispatcher: command routing and credit-gated provider invocation.

use std::env;
use std::sync::Arc;

use hf_inference::HfTextProvider;
use ledger::{account, history, Ledger, LedgerError};
use pollinations::PollinationsImage;
use provider_core::{truncate_reply, ChatMessage, ImageProvider, TextProvider};
use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::config::BotConfig;
use crate::error::DispatchError;
use crate::registry::ModelRegistry;
use crate::sink::ChatSink;

/// Reply when the ledger itself fails; details stay in the logs.
const GENERIC_FAILURE: &str = "Something went wrong on my end. Please try again.";

/// Reply when the text provider fails.
const TEXT_PROVIDER_APOLOGY: &str = "The model is a bit busy right now. Try again in a few seconds!";

/// Reply when the image provider fails.
const IMAGE_PROVIDER_APOLOGY: &str = "Failed to generate that image.";

/// Interim reply sent before image generation starts.
const IMAGE_WORKING: &str = "🎨 Generating your image... please wait.";

/// Reply when the image was generated and debited but delivery failed.
const IMAGE_DELIVERY_FAILURE: &str = "I made your image but couldn't deliver it. Sorry about that.";

/// How an inbound message was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No prefix, or the first token wasn't a known command. No reply.
    Ignored,
    /// A handler ran; any reply or attachment has been sent.
    Handled,
}

/// Routes commands to handlers and gates provider calls on the ledger.
///
/// One dispatcher serves all users; all per-user state lives in the
/// ledger. Handlers never propagate errors to the caller: every failure
/// is converted to exactly one chat reply.
pub struct Dispatcher<S: ChatSink> {
    ledger: Ledger,
    registry: ModelRegistry,
    text: Arc<dyn TextProvider>,
    image: Arc<dyn ImageProvider>,
    sink: S,
    config: BotConfig,
}

impl<S: ChatSink> Dispatcher<S> {
    /// Create a dispatcher with the given components.
    pub fn new(
        ledger: Ledger,
        registry: ModelRegistry,
        text: Arc<dyn TextProvider>,
        image: Arc<dyn ImageProvider>,
        sink: S,
        config: BotConfig,
    ) -> Self {
        Self {
            ledger,
            registry,
            text,
            image,
            sink,
            config,
        }
    }

    /// Create a dispatcher from environment variables.
    ///
    /// Connects the ledger (`LEDGER_URL`, default `sqlite:tally.db?mode=rwc`),
    /// runs migrations, and builds the Hugging Face and Pollinations
    /// providers from their environments.
    pub async fn from_env(sink: S) -> Result<Self, DispatchError> {
        let ledger_url =
            env::var("LEDGER_URL").unwrap_or_else(|_| "sqlite:tally.db?mode=rwc".to_string());
        let ledger = Ledger::connect(&ledger_url).await?;
        ledger.migrate().await?;

        let text = Arc::new(HfTextProvider::from_env()?);
        let image = Arc::new(PollinationsImage::from_env()?);

        Ok(Self::new(
            ledger,
            ModelRegistry::default(),
            text,
            image,
            sink,
            BotConfig::from_env(),
        ))
    }

    /// Get the configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Get the model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Process one inbound message end-to-end.
    ///
    /// Parses the command, resolves the author's account (creating it on
    /// first contact), runs the handler, and sends at most one reply.
    /// Unknown commands and unprefixed text are ignored silently.
    pub async fn handle_message(&self, msg: &ChatMessage) -> Outcome {
        let command = match Command::parse(&self.config.prefix, &msg.text) {
            Some(command) => command,
            None => return Outcome::Ignored,
        };

        info!(
            "Dispatching {} for {} ({})",
            command_name(&command),
            msg.author_name,
            msg.author_id
        );

        // Every handler needs balance/model state, even read-only ones.
        let account = match account::get_or_create_account(
            self.ledger.pool(),
            &msg.author_id,
            self.registry.default_key(),
        )
        .await
        {
            Ok(account) => account,
            Err(e) => {
                error!("Failed to resolve account for {}: {}", msg.author_id, e);
                self.send(&msg.channel_id, GENERIC_FAILURE).await;
                return Outcome::Handled;
            }
        };

        match self.run_command(msg, &command, &account).await {
            Ok(Some(reply)) => {
                let reply = truncate_reply(&reply, self.config.reply_limit);
                self.send(&msg.channel_id, &reply).await;
            }
            Ok(None) => {}
            Err(e) => {
                match &e {
                    DispatchError::Ledger(inner) => {
                        error!(
                            "Ledger failure handling {} for {}: {}",
                            command_name(&command),
                            msg.author_id,
                            inner
                        );
                    }
                    other => {
                        debug!(
                            "Rejected {} for {}: {}",
                            command_name(&command),
                            msg.author_id,
                            other
                        );
                    }
                }
                let reply = self.error_reply(&e);
                self.send(&msg.channel_id, &reply).await;
            }
        }

        Outcome::Handled
    }

    /// Run a parsed command against the author's account.
    ///
    /// Returns the reply text to send, or `None` when the handler already
    /// delivered its output (image attachments).
    async fn run_command(
        &self,
        msg: &ChatMessage,
        command: &Command,
        account: &ledger::Account,
    ) -> Result<Option<String>, DispatchError> {
        match command {
            Command::Help => Ok(Some(self.help_text())),
            Command::Balance => Ok(Some(self.balance_text(account))),
            Command::Models => Ok(Some(self.models_text(account))),
            Command::Change { arg } => self.handle_change(msg, arg.as_deref(), account).await,
            Command::ResetMemory => self.handle_reset(msg).await,
            Command::Give { target, amount } => {
                self.handle_give(msg, target.as_deref(), amount.as_deref()).await
            }
            Command::Msg { prompt } => self.handle_msg(msg, prompt, account).await,
            Command::Pgen { prompt } => self.handle_pgen(msg, prompt, account).await,
        }
    }

    fn help_text(&self) -> String {
        let p = &self.config.prefix;
        format!(
            "Commands:\n\
             {p}help - show this message\n\
             {p}bal - show your credit balance\n\
             {p}models - list available models\n\
             {p}change <n> - select a model by number\n\
             {p}resetmemory - clear our conversation history\n\
             {p}msg <text> - chat with your selected model\n\
             {p}pgen <text> - generate an image ({} credits)\n\
             {p}give <user> <amount> - grant credits (owner only)",
            self.config.image_cost,
        )
    }

    fn balance_text(&self, account: &ledger::Account) -> String {
        let spec = self.registry.resolve_or_default(&account.selected_model);
        format!(
            "You have {} credits. Selected model: {}.",
            account.credits, spec.display_name
        )
    }

    fn models_text(&self, account: &ledger::Account) -> String {
        let selected_key = &self.registry.resolve_or_default(&account.selected_model).key;
        let mut lines = vec!["Available models:".to_string()];

        for (i, spec) in self.registry.iter().enumerate() {
            let mut line = format!("{}. {}", i + 1, spec.display_name);
            if spec.premium {
                line.push_str(&format!(
                    " [premium, {} credit(s) per message]",
                    self.config.premium_text_cost
                ));
            }
            if &spec.key == selected_key {
                line.push_str(" (selected)");
            }
            lines.push(line);
        }

        lines.push(format!("Switch with {}change <number>.", self.config.prefix));
        lines.join("\n")
    }

    async fn handle_change(
        &self,
        msg: &ChatMessage,
        arg: Option<&str>,
        account: &ledger::Account,
    ) -> Result<Option<String>, DispatchError> {
        let guidance = format!(
            "Give me a model number, e.g. {}change 1 (see {}models).",
            self.config.prefix, self.config.prefix
        );
        let arg = arg.ok_or_else(|| DispatchError::InvalidArgument(guidance.clone()))?;
        let index: usize = arg
            .parse()
            .map_err(|_| DispatchError::InvalidArgument(guidance))?;

        let spec = self
            .registry
            .by_index(index)
            .ok_or(DispatchError::InvalidSelection {
                given: index,
                max: self.registry.len(),
            })?;

        if spec.premium && account.credits == 0 {
            return Err(DispatchError::InsufficientCredit {
                needed: self.config.premium_text_cost,
                available: 0,
            });
        }

        account::set_selected_model(self.ledger.pool(), &msg.author_id, &spec.key).await?;
        Ok(Some(format!("Now using {}.", spec.display_name)))
    }

    async fn handle_reset(&self, msg: &ChatMessage) -> Result<Option<String>, DispatchError> {
        history::clear_history(self.ledger.pool(), &msg.author_id).await?;
        Ok(Some("Memory cleared. We're starting fresh.".to_string()))
    }

    async fn handle_give(
        &self,
        msg: &ChatMessage,
        target: Option<&str>,
        amount: Option<&str>,
    ) -> Result<Option<String>, DispatchError> {
        if self.config.owner_id.as_deref() != Some(msg.author_id.as_str()) {
            return Err(DispatchError::Forbidden);
        }

        let usage = format!("Usage: {}give <user> <amount>", self.config.prefix);
        let target = target.ok_or_else(|| DispatchError::InvalidArgument(usage.clone()))?;
        let amount = amount.ok_or_else(|| DispatchError::InvalidArgument(usage))?;

        let target_id = parse_mention(target).ok_or_else(|| {
            DispatchError::InvalidArgument(
                "I couldn't tell who that is. Mention them like <@123456789>.".to_string(),
            )
        })?;
        let amount: i64 = amount
            .parse()
            .ok()
            .filter(|a| *a > 0)
            .ok_or_else(|| {
                DispatchError::InvalidArgument("The amount must be a positive whole number.".to_string())
            })?;

        account::get_or_create_account(self.ledger.pool(), &target_id, self.registry.default_key())
            .await?;
        let balance = account::grant_credits(self.ledger.pool(), &target_id, amount).await?;

        Ok(Some(format!(
            "Granted {} credits to <@{}>. Their balance is now {}.",
            amount, target_id, balance
        )))
    }

    /// Credit-gated text completion.
    ///
    /// Precondition check, provider call, then a single atomic commit of
    /// debit plus history. A provider failure leaves account state exactly
    /// as it was.
    async fn handle_msg(
        &self,
        msg: &ChatMessage,
        prompt: &str,
        account: &ledger::Account,
    ) -> Result<Option<String>, DispatchError> {
        if prompt.is_empty() {
            return Err(DispatchError::InvalidArgument("Ask me something!".to_string()));
        }

        let spec = self.registry.resolve_or_default(&account.selected_model);
        let cost = if spec.premium {
            self.config.premium_text_cost
        } else {
            0
        };

        // Optimistic check to avoid a pointless provider call. The
        // authoritative check is the conditional debit at commit time.
        if account.credits < cost {
            return Err(DispatchError::InsufficientCredit {
                needed: cost,
                available: account.credits,
            });
        }

        let context =
            history::recent_turns(self.ledger.pool(), &msg.author_id, self.config.context_turns)
                .await?;

        let reply = match self
            .text
            .complete(&spec.provider_model_id, prompt, &context)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Text provider failure for {}: {}", msg.author_id, e);
                return Ok(Some(TEXT_PROVIDER_APOLOGY.to_string()));
            }
        };

        match history::commit_exchange(
            self.ledger.pool(),
            &msg.author_id,
            prompt,
            &reply,
            cost,
            self.config.history_retention,
        )
        .await
        {
            Ok(()) => {}
            Err(LedgerError::InsufficientCredits { needed, available }) => {
                // A racing command spent the balance while we were waiting
                // on the provider.
                return Err(DispatchError::InsufficientCredit { needed, available });
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Some(reply))
    }

    /// Credit-gated image generation.
    ///
    /// Image generation is always metered, regardless of the selected text
    /// model. The debit lands before delivery is confirmed; a delivery
    /// failure after the debit is not rolled back.
    async fn handle_pgen(
        &self,
        msg: &ChatMessage,
        prompt: &str,
        account: &ledger::Account,
    ) -> Result<Option<String>, DispatchError> {
        if prompt.is_empty() {
            return Err(DispatchError::InvalidArgument(
                "Describe what you want to see!".to_string(),
            ));
        }

        let cost = self.config.image_cost;
        if account.credits < cost {
            return Err(DispatchError::InsufficientCredit {
                needed: cost,
                available: account.credits,
            });
        }

        self.send(&msg.channel_id, IMAGE_WORKING).await;

        let image = match self.image.generate(prompt).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Image provider failure for {}: {}", msg.author_id, e);
                return Ok(Some(IMAGE_PROVIDER_APOLOGY.to_string()));
            }
        };

        if !account::try_debit(self.ledger.pool(), &msg.author_id, cost).await? {
            let current = account::get_account(self.ledger.pool(), &msg.author_id).await?;
            return Err(DispatchError::InsufficientCredit {
                needed: cost,
                available: current.credits,
            });
        }

        if let Err(e) = self
            .sink
            .send_image(&msg.channel_id, &image.file_name, &image.bytes)
            .await
        {
            error!("Image delivery failed for {} after debit: {}", msg.author_id, e);
            return Ok(Some(IMAGE_DELIVERY_FAILURE.to_string()));
        }

        Ok(None)
    }

    /// Convert a handler error into its user-facing reply.
    fn error_reply(&self, err: &DispatchError) -> String {
        let p = &self.config.prefix;
        match err {
            DispatchError::InvalidArgument(guidance) => guidance.clone(),
            DispatchError::InvalidSelection { given, max } => format!(
                "{} isn't a valid model number. Pick a number from 1 to {} (see {p}models).",
                given, max
            ),
            DispatchError::InsufficientCredit { needed, available } => format!(
                "Not enough credits: this costs {} and you have {}. \
                 Switch to a free model with {p}change, or ask the owner for a top-up.",
                needed, available
            ),
            DispatchError::Forbidden => "Only the bot owner can do that.".to_string(),
            DispatchError::Provider(_) => TEXT_PROVIDER_APOLOGY.to_string(),
            DispatchError::Ledger(_) | DispatchError::Send(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Send a reply, logging delivery failures instead of propagating.
    async fn send(&self, channel_id: &str, text: &str) {
        if let Err(e) = self.sink.reply(channel_id, text).await {
            warn!("Failed to send reply to {}: {}", channel_id, e);
        }
    }
}

/// Short name of a command for logging.
fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Help => "help",
        Command::Balance => "bal",
        Command::Models => "models",
        Command::Change { .. } => "change",
        Command::ResetMemory => "resetmemory",
        Command::Give { .. } => "give",
        Command::Msg { .. } => "msg",
        Command::Pgen { .. } => "pgen",
    }
}

/// Resolve a mention token to a user ID.
///
/// Accepts `<@123>`, `<@!123>` (nickname form), and bare numeric IDs.
fn parse_mention(token: &str) -> Option<String> {
    let inner = token
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.strip_prefix('!').unwrap_or(rest))
        .unwrap_or(token);

    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        Some(inner.to_string())
    } else {
        None
    }
}
