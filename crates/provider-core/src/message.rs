//! Inbound message and conversation turn types.

use serde::{Deserialize, Serialize};

/// An inbound chat message from the messaging platform.
///
/// Carries only what the bot core needs: who sent it, where to reply,
/// and the raw text. Delivery of replies goes through the `ChatSink`
/// capability in the dispatcher crate, not through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Stable platform identifier for the author (e.g., a Discord user ID).
    pub author_id: String,
    /// Display name of the author, for logging only.
    pub author_name: String,
    /// Channel to reply into.
    pub channel_id: String,
    /// Raw message text, prefix included.
    pub text: String,
    /// Platform timestamp in milliseconds.
    pub timestamp: u64,
}

impl ChatMessage {
    /// Create a message with the author id doubling as display name.
    pub fn new(
        author_id: impl Into<String>,
        channel_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let author_id = author_id.into();
        Self {
            author_name: author_id.clone(),
            author_id,
            channel_id: channel_id.into(),
            text: text.into(),
            timestamp: 0,
        }
    }

    /// Set the author display name.
    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    /// Set the platform timestamp.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The human user.
    User,
    /// The AI model.
    Model,
}

impl TurnRole {
    /// Stable string form used in storage and provider payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(TurnRole::User),
            "model" => Some(TurnRole::Model),
            _ => None,
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub role: TurnRole,
    /// What they said.
    pub text: String,
}

impl Turn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let msg = ChatMessage::new("42", "general", ".bal")
            .with_author_name("alice")
            .with_timestamp(1234567890);

        assert_eq!(msg.author_id, "42");
        assert_eq!(msg.author_name, "alice");
        assert_eq!(msg.channel_id, "general");
        assert_eq!(msg.text, ".bal");
        assert_eq!(msg.timestamp, 1234567890);
    }

    #[test]
    fn test_default_author_name() {
        let msg = ChatMessage::new("42", "general", "hi");
        assert_eq!(msg.author_name, "42");
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(TurnRole::parse("user"), Some(TurnRole::User));
        assert_eq!(TurnRole::parse("model"), Some(TurnRole::Model));
        assert_eq!(TurnRole::parse("assistant"), None);
        assert_eq!(TurnRole::User.as_str(), "user");
    }

    #[test]
    fn test_turn_constructors() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text, "hello");

        let turn = Turn::model("hi there");
        assert_eq!(turn.role, TurnRole::Model);
    }
}
