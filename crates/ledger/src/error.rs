//! Ledger error types.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account not found
    #[error("account not found: {user_id}")]
    NotFound { user_id: String },

    /// A conditional debit was refused because the balance is too low.
    /// The balance is never clamped; the whole operation is rejected.
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredits { needed: i64, available: i64 },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
