//! Error types for command dispatch.

use ledger::LedgerError;
use provider_core::ProviderError;
use thiserror::Error;

/// Errors raised while handling a command.
///
/// Every variant is caught inside `handle_message` and converted to a
/// single chat reply; none of them propagate to the host event loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Bad or missing command arguments. The message is shown to the
    /// user as-is, so handlers phrase it as guidance.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Model index outside the registry's display range.
    #[error("invalid selection {given}: valid range is 1 to {max}")]
    InvalidSelection { given: usize, max: usize },

    /// The account cannot cover the cost of the operation.
    #[error("insufficient credits: need {needed}, have {available}")]
    InsufficientCredit { needed: i64, available: i64 },

    /// A non-owner used an owner-only command.
    #[error("forbidden")]
    Forbidden,

    /// External provider failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Ledger persistence failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Reply or attachment delivery failure.
    #[error("send failed: {0}")]
    Send(String),
}
