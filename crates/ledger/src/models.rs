//! Ledger models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user's account, created lazily on first contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Platform user ID (e.g., a Discord snowflake as text).
    pub user_id: String,
    /// Credit balance. Never negative; debits are refused, not clamped.
    pub credits: i64,
    /// Registry key of the currently selected model.
    pub selected_model: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A stored conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoredTurn {
    /// Auto-incrementing ID; insertion order is conversation order.
    pub id: i64,
    /// Owning account.
    pub user_id: String,
    /// "user" or "model".
    pub role: String,
    /// Turn text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: String,
}
