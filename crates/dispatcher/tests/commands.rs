//! End-to-end command tests against an in-memory ledger.

use std::sync::Arc;

use dispatcher::{
    BotConfig, ChatMessage, ChatSink, DispatchError, Dispatcher, ModelRegistry, Outcome,
    RecordingSink,
};
use ledger::{account, history, Ledger};
use mock_provider::{async_trait, CannedImage, CannedText, DelayedText, FailingImage, FailingText};

const OWNER: &str = "owner-1";
const CHANNEL: &str = "chan-1";

fn test_config() -> BotConfig {
    BotConfig::builder()
        .prefix(".")
        .owner_id(OWNER)
        .premium_text_cost(1)
        .image_cost(2)
        .context_turns(10)
        .history_retention(50)
        .reply_limit(1900)
        .build()
}

async fn test_ledger() -> Ledger {
    let ledger = Ledger::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    ledger.migrate().await.unwrap();
    ledger
}

struct Harness {
    dispatcher: Dispatcher<RecordingSink>,
    sink: RecordingSink,
    text: Arc<CannedText>,
    image: Arc<CannedImage>,
    ledger: Ledger,
}

impl Harness {
    async fn new() -> Self {
        Self::with_reply("canned reply").await
    }

    async fn with_reply(reply: &str) -> Self {
        let ledger = test_ledger().await;
        let sink = RecordingSink::new();
        let text = Arc::new(CannedText::new(reply));
        let image = Arc::new(CannedImage::placeholder());

        let dispatcher = Dispatcher::new(
            ledger.clone(),
            ModelRegistry::default(),
            text.clone(),
            image.clone(),
            sink.clone(),
            test_config(),
        );

        Self {
            dispatcher,
            sink,
            text,
            image,
            ledger,
        }
    }

    async fn send(&self, user: &str, text: &str) -> Outcome {
        self.dispatcher
            .handle_message(&ChatMessage::new(user, CHANNEL, text))
            .await
    }

    async fn credits(&self, user: &str) -> i64 {
        account::get_account(self.ledger.pool(), user)
            .await
            .unwrap()
            .credits
    }

    async fn grant(&self, user: &str, amount: i64) {
        account::get_or_create_account(self.ledger.pool(), user, "llama-3-8b")
            .await
            .unwrap();
        account::grant_credits(self.ledger.pool(), user, amount)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn ignores_unprefixed_text() {
    let h = Harness::new().await;
    assert_eq!(h.send("u1", "hello there").await, Outcome::Ignored);
    assert!(h.sink.replies().is_empty());
}

#[tokio::test]
async fn ignores_unknown_command() {
    let h = Harness::new().await;
    assert_eq!(h.send("u1", ".frobnicate now").await, Outcome::Ignored);
    assert!(h.sink.replies().is_empty());
}

#[tokio::test]
async fn help_lists_commands() {
    let h = Harness::new().await;
    assert_eq!(h.send("u1", ".help").await, Outcome::Handled);

    let texts = h.sink.reply_texts();
    assert_eq!(texts.len(), 1);
    for cmd in [".bal", ".models", ".change", ".resetmemory", ".msg", ".pgen", ".give"] {
        assert!(texts[0].contains(cmd), "help is missing {}", cmd);
    }
}

#[tokio::test]
async fn bal_reports_new_account_defaults() {
    let h = Harness::new().await;
    h.send("u1", ".bal").await;

    let texts = h.sink.reply_texts();
    assert_eq!(
        texts[0],
        "You have 0 credits. Selected model: Llama 3 8B Instruct."
    );
}

#[tokio::test]
async fn models_lists_numbered_catalog_with_selection() {
    let h = Harness::new().await;
    h.send("u1", ".models").await;

    let text = &h.sink.reply_texts()[0];
    assert!(text.contains("1. Llama 3 8B Instruct (selected)"));
    assert!(text.contains("2. Mistral 7B Instruct"));
    assert!(text.contains("3. Llama 3 70B Instruct [premium, 1 credit(s) per message]"));
    assert!(text.contains(".change <number>"));
}

#[tokio::test]
async fn change_selects_free_model_by_number() {
    let h = Harness::new().await;
    h.send("u1", ".change 2").await;
    assert_eq!(h.sink.reply_texts()[0], "Now using Mistral 7B Instruct.");

    h.send("u1", ".bal").await;
    assert!(h.sink.reply_texts()[1].contains("Mistral 7B Instruct"));
}

#[tokio::test]
async fn change_rejects_out_of_range_number() {
    let h = Harness::new().await;
    h.send("u1", ".change 4").await;
    assert!(h.sink.reply_texts()[0].starts_with("4 isn't a valid model number"));
}

#[tokio::test]
async fn change_rejects_non_numeric_argument() {
    let h = Harness::new().await;
    h.send("u1", ".change llama").await;
    assert!(h.sink.reply_texts()[0].contains("model number"));

    h.send("u1", ".change").await;
    assert!(h.sink.reply_texts()[1].contains("model number"));
}

#[tokio::test]
async fn change_to_premium_requires_credits() {
    let h = Harness::new().await;
    h.send("u1", ".change 3").await;
    assert!(h.sink.reply_texts()[0].starts_with("Not enough credits"));

    h.grant("u1", 1).await;
    h.send("u1", ".change 3").await;
    assert_eq!(h.sink.reply_texts()[1], "Now using Llama 3 70B Instruct.");
}

#[tokio::test]
async fn give_requires_owner() {
    let h = Harness::new().await;
    h.send("u1", ".give <@42> 5").await;
    assert_eq!(h.sink.reply_texts()[0], "Only the bot owner can do that.");
}

#[tokio::test]
async fn give_grants_credits_and_creates_target() {
    let h = Harness::new().await;
    h.send(OWNER, ".give <@42> 5").await;
    assert_eq!(
        h.sink.reply_texts()[0],
        "Granted 5 credits to <@42>. Their balance is now 5."
    );
    assert_eq!(h.credits("42").await, 5);
}

#[tokio::test]
async fn give_rejects_bad_target_and_amount() {
    let h = Harness::new().await;

    h.send(OWNER, ".give @alice 5").await;
    assert!(h.sink.reply_texts()[0].contains("couldn't tell who that is"));

    h.send(OWNER, ".give <@42> zero").await;
    assert!(h.sink.reply_texts()[1].contains("positive whole number"));

    h.send(OWNER, ".give <@42> -3").await;
    assert!(h.sink.reply_texts()[2].contains("positive whole number"));

    h.send(OWNER, ".give").await;
    assert!(h.sink.reply_texts()[3].starts_with("Usage:"));
}

#[tokio::test]
async fn msg_on_free_model_is_free() {
    let h = Harness::new().await;
    h.send("u1", ".msg what is rust").await;

    assert_eq!(h.sink.reply_texts(), vec!["canned reply".to_string()]);
    assert_eq!(h.text.call_count(), 1);
    assert_eq!(h.credits("u1").await, 0);
    assert_eq!(history::count_turns(h.ledger.pool(), "u1").await.unwrap(), 2);
}

#[tokio::test]
async fn msg_passes_history_as_context() {
    let h = Harness::new().await;
    h.send("u1", ".msg first question").await;
    h.send("u1", ".msg second question").await;

    let calls = h.text.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].context.is_empty());
    assert_eq!(calls[1].context.len(), 2);
    assert_eq!(calls[1].context[0].text, "first question");
    assert_eq!(calls[1].context[1].text, "canned reply");
}

#[tokio::test]
async fn msg_on_premium_model_debits_per_message() {
    let h = Harness::new().await;
    h.grant("u1", 2).await;
    h.send("u1", ".change 3").await;

    h.send("u1", ".msg hi").await;
    assert_eq!(h.credits("u1").await, 1);

    h.send("u1", ".msg hi again").await;
    assert_eq!(h.credits("u1").await, 0);

    // Third message is refused before the provider is called.
    h.send("u1", ".msg one more").await;
    assert_eq!(h.text.call_count(), 2);
    assert!(h.sink.reply_texts().last().unwrap().starts_with("Not enough credits"));
    assert_eq!(h.credits("u1").await, 0);
}

#[tokio::test]
async fn msg_rejects_empty_prompt() {
    let h = Harness::new().await;
    h.send("u1", ".msg").await;
    assert_eq!(h.sink.reply_texts()[0], "Ask me something!");
    assert_eq!(h.text.call_count(), 0);
}

#[tokio::test]
async fn msg_provider_failure_apologizes_without_charging() {
    let ledger = test_ledger().await;
    let sink = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        ledger.clone(),
        ModelRegistry::default(),
        Arc::new(FailingText::timeout()),
        Arc::new(CannedImage::placeholder()),
        sink.clone(),
        test_config(),
    );

    account::get_or_create_account(ledger.pool(), "u1", "llama-3-8b")
        .await
        .unwrap();
    account::grant_credits(ledger.pool(), "u1", 3).await.unwrap();

    dispatcher
        .handle_message(&ChatMessage::new("u1", CHANNEL, ".msg hi"))
        .await;

    assert!(sink.reply_texts()[0].contains("busy right now"));
    assert_eq!(
        account::get_account(ledger.pool(), "u1").await.unwrap().credits,
        3
    );
    assert_eq!(history::count_turns(ledger.pool(), "u1").await.unwrap(), 0);
}

#[tokio::test]
async fn long_reply_is_truncated_with_ellipsis() {
    let long = "x".repeat(3000);
    let h = Harness::with_reply(&long).await;
    h.send("u1", ".msg tell me everything").await;

    let reply = &h.sink.reply_texts()[0];
    assert_eq!(reply.chars().count(), 1903);
    assert!(reply.ends_with("..."));
}

#[tokio::test]
async fn stale_model_selection_falls_back_to_default() {
    let h = Harness::new().await;
    account::get_or_create_account(h.ledger.pool(), "u1", "llama-3-8b")
        .await
        .unwrap();
    account::set_selected_model(h.ledger.pool(), "u1", "retired-model")
        .await
        .unwrap();

    h.send("u1", ".bal").await;
    assert!(h.sink.reply_texts()[0].contains("Llama 3 8B Instruct"));

    h.send("u1", ".msg hi").await;
    assert_eq!(
        h.text.calls()[0].model_id,
        "meta-llama/Meta-Llama-3-8B-Instruct"
    );
}

#[tokio::test]
async fn resetmemory_clears_history() {
    let h = Harness::new().await;
    h.send("u1", ".msg hi").await;
    assert_eq!(history::count_turns(h.ledger.pool(), "u1").await.unwrap(), 2);

    h.send("u1", ".resetmemory").await;
    assert_eq!(
        h.sink.reply_texts().last().unwrap(),
        "Memory cleared. We're starting fresh."
    );
    assert_eq!(history::count_turns(h.ledger.pool(), "u1").await.unwrap(), 0);

    // The next exchange starts from a clean context window.
    h.send("u1", ".msg hi again").await;
    assert!(h.text.calls().last().unwrap().context.is_empty());
}

#[tokio::test]
async fn pgen_generates_debits_and_attaches() {
    let h = Harness::new().await;
    h.grant("u1", 2).await;
    h.send("u1", ".pgen a red fox").await;

    let texts = h.sink.reply_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Generating your image"));

    let attachments = h.sink.attachments();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].file_name, "ai_image.png");
    assert!(!attachments[0].bytes.is_empty());

    assert_eq!(h.image.prompts(), vec!["a red fox".to_string()]);
    assert_eq!(h.credits("u1").await, 0);
    // Image prompts never enter conversation memory.
    assert_eq!(history::count_turns(h.ledger.pool(), "u1").await.unwrap(), 0);
}

#[tokio::test]
async fn pgen_refused_without_credits() {
    let h = Harness::new().await;
    h.send("u1", ".pgen a red fox").await;

    let texts = h.sink.reply_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Not enough credits"));
    assert_eq!(h.image.call_count(), 0);
    assert!(h.sink.attachments().is_empty());
}

#[tokio::test]
async fn pgen_rejects_empty_prompt() {
    let h = Harness::new().await;
    h.grant("u1", 2).await;
    h.send("u1", ".pgen").await;
    assert_eq!(h.sink.reply_texts()[0], "Describe what you want to see!");
    assert_eq!(h.image.call_count(), 0);
}

#[tokio::test]
async fn pgen_provider_failure_apologizes_without_charging() {
    let ledger = test_ledger().await;
    let sink = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        ledger.clone(),
        ModelRegistry::default(),
        Arc::new(CannedText::new("hi")),
        Arc::new(FailingImage::new("backend down")),
        sink.clone(),
        test_config(),
    );

    account::get_or_create_account(ledger.pool(), "u1", "llama-3-8b")
        .await
        .unwrap();
    account::grant_credits(ledger.pool(), "u1", 2).await.unwrap();

    dispatcher
        .handle_message(&ChatMessage::new("u1", CHANNEL, ".pgen a fox"))
        .await;

    let texts = sink.reply_texts();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("Generating your image"));
    assert_eq!(texts[1], "Failed to generate that image.");
    assert_eq!(
        account::get_account(ledger.pool(), "u1").await.unwrap().credits,
        2
    );
}

/// Sink whose attachment delivery always fails.
#[derive(Clone)]
struct BrokenAttachmentSink {
    inner: RecordingSink,
}

#[async_trait]
impl ChatSink for BrokenAttachmentSink {
    async fn reply(&self, channel_id: &str, text: &str) -> Result<(), DispatchError> {
        self.inner.reply(channel_id, text).await
    }

    async fn send_image(
        &self,
        _channel_id: &str,
        _file_name: &str,
        _bytes: &[u8],
    ) -> Result<(), DispatchError> {
        Err(DispatchError::Send("connection reset".to_string()))
    }
}

#[tokio::test]
async fn pgen_delivery_failure_keeps_the_debit() {
    let ledger = test_ledger().await;
    let recording = RecordingSink::new();
    let sink = BrokenAttachmentSink {
        inner: recording.clone(),
    };
    let dispatcher = Dispatcher::new(
        ledger.clone(),
        ModelRegistry::default(),
        Arc::new(CannedText::new("hi")),
        Arc::new(CannedImage::placeholder()),
        sink,
        test_config(),
    );

    account::get_or_create_account(ledger.pool(), "u1", "llama-3-8b")
        .await
        .unwrap();
    account::grant_credits(ledger.pool(), "u1", 2).await.unwrap();

    dispatcher
        .handle_message(&ChatMessage::new("u1", CHANNEL, ".pgen a fox"))
        .await;

    let texts = recording.reply_texts();
    assert!(texts.last().unwrap().contains("couldn't deliver it"));
    assert_eq!(
        account::get_account(ledger.pool(), "u1").await.unwrap().credits,
        0
    );
}

#[tokio::test]
async fn concurrent_premium_messages_never_overdraw() {
    let ledger = test_ledger().await;
    let sink = RecordingSink::new();
    let dispatcher = Dispatcher::new(
        ledger.clone(),
        ModelRegistry::default(),
        Arc::new(DelayedText::with_millis(CannedText::new("slow reply"), 20)),
        Arc::new(CannedImage::placeholder()),
        sink.clone(),
        test_config(),
    );

    account::get_or_create_account(ledger.pool(), "u1", "llama-3-8b")
        .await
        .unwrap();
    account::grant_credits(ledger.pool(), "u1", 1).await.unwrap();
    account::set_selected_model(ledger.pool(), "u1", "llama-3-70b")
        .await
        .unwrap();

    // Both handlers pass the optimistic check against the stale balance of
    // 1; the conditional debit inside commit_exchange lets only one land.
    let msg_one = ChatMessage::new("u1", CHANNEL, ".msg one");
    let msg_two = ChatMessage::new("u1", CHANNEL, ".msg two");
    let first = dispatcher.handle_message(&msg_one);
    let second = dispatcher.handle_message(&msg_two);
    tokio::join!(first, second);

    assert_eq!(
        account::get_account(ledger.pool(), "u1").await.unwrap().credits,
        0
    );
    // One delivered reply; at most one refusal depending on interleaving.
    assert!(sink
        .reply_texts()
        .iter()
        .any(|t| t == "slow reply"));
    assert_eq!(history::count_turns(ledger.pool(), "u1").await.unwrap(), 2);
}

#[tokio::test]
async fn concurrent_image_requests_never_overdraw() {
    let h = Harness::new().await;
    h.grant("u1", 2).await;

    let first = h.send("u1", ".pgen a fox");
    let second = h.send("u1", ".pgen a hound");
    tokio::join!(first, second);

    // Both pass the optimistic check, but only one debit can land.
    assert_eq!(h.sink.attachments().len(), 1);
    assert_eq!(h.credits("u1").await, 0);
    assert!(h
        .sink
        .reply_texts()
        .iter()
        .any(|t| t.starts_with("Not enough credits")));
}
