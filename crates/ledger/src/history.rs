//! Conversation history operations.
//!
//! Turns are append-only rows; the stored log is trimmed at write time to a
//! retention cap, and callers read back only a bounded recent suffix for
//! provider context.

use provider_core::{Turn, TurnRole};
use sqlx::SqlitePool;

use crate::error::{LedgerError, Result};

/// Commit a completed text exchange as one atomic update.
///
/// Inside a single transaction this debits `cost` (conditionally, so the
/// balance never goes negative), appends the user and model turns, and trims
/// stored history for the user down to `retention` turns. If the conditional
/// debit affects no rows the transaction is rolled back and
/// [`LedgerError::InsufficientCredits`] is returned: a racing command spent
/// the balance between precondition check and commit.
pub async fn commit_exchange(
    pool: &SqlitePool,
    user_id: &str,
    prompt: &str,
    reply: &str,
    cost: i64,
    retention: u32,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    if cost > 0 {
        let debit = sqlx::query(
            r#"
            UPDATE accounts
            SET credits = credits - ?, updated_at = datetime('now')
            WHERE user_id = ? AND credits >= ?
            "#,
        )
        .bind(cost)
        .bind(user_id)
        .bind(cost)
        .execute(&mut *tx)
        .await?;

        if debit.rows_affected() == 0 {
            let available = sqlx::query_scalar::<_, i64>(
                r#"SELECT credits FROM accounts WHERE user_id = ?"#,
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or(0);

            tracing::warn!(
                "Debit of {} refused for {} at commit time (balance {})",
                cost,
                user_id,
                available
            );
            return Err(LedgerError::InsufficientCredits {
                needed: cost,
                available,
            });
        }
    }

    for (role, text) in [(TurnRole::User, prompt), (TurnRole::Model, reply)] {
        sqlx::query(
            r#"
            INSERT INTO history_turns (user_id, role, text)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(text)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        DELETE FROM history_turns
        WHERE user_id = ?
          AND id NOT IN (
              SELECT id FROM history_turns
              WHERE user_id = ?
              ORDER BY id DESC
              LIMIT ?
          )
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(retention)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Fetch the most recent `limit` turns in chronological order.
pub async fn recent_turns(pool: &SqlitePool, user_id: &str, limit: u32) -> Result<Vec<Turn>> {
    let rows = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT role, text FROM history_turns
        WHERE user_id = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut turns: Vec<Turn> = rows
        .into_iter()
        .filter_map(|(role, text)| TurnRole::parse(&role).map(|role| Turn { role, text }))
        .collect();
    turns.reverse();
    Ok(turns)
}

/// Delete all stored turns for a user.
pub async fn clear_history(pool: &SqlitePool, user_id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM history_turns
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    tracing::debug!("Cleared {} stored turns for {}", result.rows_affected(), user_id);
    Ok(())
}

/// Count stored turns for a user.
pub async fn count_turns(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM history_turns
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
