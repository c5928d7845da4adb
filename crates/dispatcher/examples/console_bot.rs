//! Interactive console frontend for the dispatcher.
//!
//! Reads commands from stdin, replies on stdout, and writes generated
//! images to the current directory. Configure providers through the
//! environment or a `.env` file:
//!
//! ```text
//! LEDGER_URL=sqlite:tally.db?mode=rwc
//! HF_API_TOKEN=hf_...
//! BOT_OWNER_ID=console
//! cargo run -p dispatcher --example console_bot
//! ```

use std::io::{self, BufRead, Write};

use dispatcher::{async_trait, ChatSink, ChatMessage, DispatchError, Dispatcher, Outcome};

/// Sink that prints replies and saves attachments to disk.
struct ConsoleSink;

#[async_trait]
impl ChatSink for ConsoleSink {
    async fn reply(&self, _channel_id: &str, text: &str) -> Result<(), DispatchError> {
        println!("{}", text);
        Ok(())
    }

    async fn send_image(
        &self,
        _channel_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<(), DispatchError> {
        std::fs::write(file_name, bytes).map_err(|e| DispatchError::Send(e.to_string()))?;
        println!("(saved {} bytes to {})", bytes.len(), file_name);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dispatcher = Dispatcher::from_env(ConsoleSink).await?;

    // stdin user doubles as the owner when BOT_OWNER_ID=console is set.
    let user_id = std::env::var("CONSOLE_USER_ID").unwrap_or_else(|_| "console".to_string());
    let prefix = dispatcher.config().prefix.clone();

    println!("Type {}help for commands, Ctrl-D to quit.", prefix);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let msg = ChatMessage::new(user_id.clone(), "console", line);
        if dispatcher.handle_message(&msg).await == Outcome::Ignored {
            println!("(not a command; try {}help)", prefix);
        }
    }

    Ok(())
}
