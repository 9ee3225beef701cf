//! # Wallet Repository
//!
//! The balance lives on `users.wallet_balance_cents`; every change to it
//! goes through [`credit`], which writes a `wallet_credits` row first.
//!
//! ## Exactly-Once Credits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  seller rejects order / confirms return                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  conditional status UPDATE   ── 0 rows? ──► InvalidTransition (no $)   │
//! │       │ 1 row                                                           │
//! │       ▼                                                                 │
//! │  INSERT wallet_credits       ── dup (order_id, reason)? ──► rollback   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE users balance += amount                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT (all three or nothing)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{CreditReason, Money, WalletCredit};

/// Credits `user_id` inside the caller's transaction.
pub(crate) async fn credit(
    conn: &mut SqliteConnection,
    user_id: &str,
    order_id: &str,
    reason: CreditReason,
    amount: Money,
) -> DbResult<WalletCredit> {
    let credit = WalletCredit {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        order_id: order_id.to_string(),
        reason,
        amount_cents: amount.cents(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO wallet_credits (id, user_id, order_id, reason, amount_cents, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&credit.id)
    .bind(&credit.user_id)
    .bind(&credit.order_id)
    .bind(credit.reason)
    .bind(credit.amount_cents)
    .bind(credit.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        err if err.is_unique_violation_on("wallet_credits.order_id") => {
            DbError::duplicate("wallet credit", order_id)
        }
        err => err,
    })?;

    let result = sqlx::query(
        "UPDATE users SET wallet_balance_cents = wallet_balance_cents + ?, updated_at = ? WHERE id = ?",
    )
    .bind(credit.amount_cents)
    .bind(credit.created_at)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("User", user_id));
    }

    info!(
        user_id = %user_id,
        order_id = %order_id,
        amount = credit.amount_cents,
        reason = ?reason,
        "Wallet credited"
    );
    Ok(credit)
}

#[derive(Debug, Clone)]
pub struct WalletRepository {
    pool: SqlitePool,
}

impl WalletRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WalletRepository { pool }
    }

    pub async fn balance(&self, user_id: &str) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar("SELECT wallet_balance_cents FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;
        Ok(Money::from_cents(cents))
    }

    /// Credit history, newest first.
    pub async fn credits(&self, user_id: &str) -> DbResult<Vec<WalletCredit>> {
        let credits = sqlx::query_as::<_, WalletCredit>(
            "SELECT id, user_id, order_id, reason, amount_cents, created_at \
             FROM wallet_credits WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(credits)
    }
}
