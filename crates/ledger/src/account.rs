//! Account operations.
//!
//! All credit mutations happen here as single conditional statements so the
//! non-negativity invariant holds even when handlers for the same user
//! interleave at await points.

use sqlx::SqlitePool;

use crate::error::{LedgerError, Result};
use crate::models::Account;

/// Load an account, creating it with defaults if the author is new.
///
/// New accounts start with zero credits and the given default model key.
pub async fn get_or_create_account(
    pool: &SqlitePool,
    user_id: &str,
    default_model: &str,
) -> Result<Account> {
    sqlx::query(
        r#"
        INSERT INTO accounts (user_id, credits, selected_model)
        VALUES (?, 0, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(default_model)
    .execute(pool)
    .await?;

    get_account(pool, user_id).await
}

/// Get an account by user ID.
pub async fn get_account(pool: &SqlitePool, user_id: &str) -> Result<Account> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT user_id, credits, selected_model, created_at, updated_at
        FROM accounts
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| LedgerError::NotFound {
        user_id: user_id.to_string(),
    })
}

/// Persist a new model selection for an account.
pub async fn set_selected_model(pool: &SqlitePool, user_id: &str, model_key: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET selected_model = ?, updated_at = datetime('now')
        WHERE user_id = ?
        "#,
    )
    .bind(model_key)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::NotFound {
            user_id: user_id.to_string(),
        });
    }

    Ok(())
}

/// Add credits to an account and return the new balance.
///
/// This is the only minting path; everything else only debits.
pub async fn grant_credits(pool: &SqlitePool, user_id: &str, amount: i64) -> Result<i64> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET credits = credits + ?, updated_at = datetime('now')
        WHERE user_id = ?
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::NotFound {
            user_id: user_id.to_string(),
        });
    }

    let account = get_account(pool, user_id).await?;
    tracing::info!("Granted {} credits to {}: balance now {}", amount, user_id, account.credits);
    Ok(account.credits)
}

/// Debit `cost` credits if and only if the balance covers it.
///
/// The decrement is a single conditional UPDATE, so two racing callers can
/// never drive the balance negative: the second one simply affects zero
/// rows. A zero cost always succeeds without touching the row.
pub async fn try_debit(pool: &SqlitePool, user_id: &str, cost: i64) -> Result<bool> {
    if cost == 0 {
        return Ok(true);
    }

    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET credits = credits - ?, updated_at = datetime('now')
        WHERE user_id = ? AND credits >= ?
        "#,
    )
    .bind(cost)
    .bind(user_id)
    .bind(cost)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
