//! SQLite credit ledger for the Tally bot.
//!
//! This crate provides async persistence for per-user accounts (credit
//! balance and model selection) and bounded conversation history, using
//! SQLx with SQLite.
//!
//! The credit invariant lives here: every debit is a single conditional
//! decrement at the storage layer, so a balance can never be observed
//! negative no matter how handlers interleave.
//!
//! # Example
//!
//! ```no_run
//! use ledger::{account, Ledger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let ledger = Ledger::connect("sqlite:tally.db?mode=rwc").await?;
//!     ledger.migrate().await?;
//!
//!     // Accounts are created lazily with defaults
//!     let acct = account::get_or_create_account(ledger.pool(), "1234", "llama-3-8b").await?;
//!     assert_eq!(acct.credits, 0);
//!
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod error;
pub mod history;
pub mod models;

pub use error::{LedgerError, Result};
pub use models::{Account, StoredTurn};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Ledger database connection wrapper.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    /// Default pool size for ledger connections.
    const DEFAULT_POOL_SIZE: u32 = 8;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist, or
    /// `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect with a custom pool size.
    ///
    /// In-memory test databases should use a pool size of 1: each pooled
    /// connection to `sqlite::memory:` gets its own empty database.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to ledger database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// Call once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running ledger migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
