//! Prefix-delimited command parsing.

/// A parsed bot command.
///
/// The command set is closed; anything else parses to `None` and is
/// silently ignored. Argument validation happens in the handlers so that
/// each command can reply with its own guidance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `help` - list commands.
    Help,
    /// `bal` - show credit balance and selected model.
    Balance,
    /// `models` - enumerate the model registry.
    Models,
    /// `change <n>` - select a model by 1-based index.
    Change { arg: Option<String> },
    /// `resetmemory` - clear conversation history.
    ResetMemory,
    /// `give <mention> <amount>` - owner-only credit grant.
    Give {
        target: Option<String>,
        amount: Option<String>,
    },
    /// `msg <text>` - chat with the selected text model.
    Msg { prompt: String },
    /// `pgen <text>` - generate an image.
    Pgen { prompt: String },
}

impl Command {
    /// Parse raw message text.
    ///
    /// Returns `None` when the text does not start with `prefix` or the
    /// first token is not a known command. The first token is matched
    /// case-insensitively; free-form arguments are re-joined with single
    /// spaces.
    pub fn parse(prefix: &str, text: &str) -> Option<Command> {
        let rest = text.strip_prefix(prefix)?.trim();
        if rest.is_empty() {
            return None;
        }

        let mut tokens = rest.split_whitespace();
        let head = tokens.next()?.to_lowercase();
        let args: Vec<&str> = tokens.collect();

        let command = match head.as_str() {
            "help" => Command::Help,
            "bal" => Command::Balance,
            "models" => Command::Models,
            "change" => Command::Change {
                arg: args.first().map(|s| s.to_string()),
            },
            "resetmemory" => Command::ResetMemory,
            "give" => Command::Give {
                target: args.first().map(|s| s.to_string()),
                amount: args.get(1).map(|s| s.to_string()),
            },
            "msg" => Command::Msg {
                prompt: args.join(" "),
            },
            "pgen" => Command::Pgen {
                prompt: args.join(" "),
            },
            _ => return None,
        };

        Some(command)
    }
}
