//! Email verification codes. At most one live code per email: issuing a new
//! one replaces the old, and a successful check consumes it.

use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::user;
use bazaar_core::{CoreError, User};

#[derive(Debug, Clone)]
pub struct VerificationRepository {
    pool: SqlitePool,
}

impl VerificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VerificationRepository { pool }
    }

    /// Stores `code` for `email`, valid for `ttl_secs`, replacing earlier codes.
    pub async fn issue(&self, email: &str, code: &str, ttl_secs: i64) -> DbResult<DateTime<Utc>> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl_secs);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM verification_codes WHERE email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO verification_codes (id, email, code, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(email = %email, expires_at = %expires_at, "Verification code issued");
        Ok(expires_at)
    }

    /// Checks `code` against the live code for `email` at time `now`.
    ///
    /// Returns `true` and deletes the email's codes on a match. A wrong or
    /// expired code returns `false` and leaves the stored code in place.
    pub async fn consume(&self, email: &str, code: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;
        let accepted = consume_code(&mut tx, email, code, now).await?;
        if accepted {
            tx.commit().await?;
        }
        Ok(accepted)
    }

    /// Consumes the code and marks the account verified in one transaction.
    ///
    /// ## Errors
    /// - `Rule(InvalidVerificationCode)` on a wrong or expired code
    /// - `NotFound` if no account uses `email`
    ///
    /// On any error the code stays usable.
    pub async fn verify_user(&self, email: &str, code: &str, now: DateTime<Utc>) -> DbResult<User> {
        let mut tx = self.pool.begin().await?;

        if !consume_code(&mut tx, email, code, now).await? {
            return Err(CoreError::InvalidVerificationCode.into());
        }
        let user = user::mark_verified(&mut tx, email).await?;

        tx.commit().await?;
        Ok(user)
    }
}

async fn consume_code(
    conn: &mut SqliteConnection,
    email: &str,
    code: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let expires_at: Option<DateTime<Utc>> = sqlx::query_scalar(
        "SELECT expires_at FROM verification_codes WHERE email = ? AND code = ?",
    )
    .bind(email)
    .bind(code)
    .fetch_optional(&mut *conn)
    .await?;

    match expires_at {
        Some(expires_at) if expires_at > now => {
            sqlx::query("DELETE FROM verification_codes WHERE email = ?")
                .bind(email)
                .execute(&mut *conn)
                .await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::repository::test_support;
    use bazaar_core::CoreError;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_code_is_single_use() {
        let db = test_support::db().await;
        let codes = db.verification_codes();

        codes.issue("a@example.com", "123456", 900).await.unwrap();
        assert!(!codes.consume("a@example.com", "654321", Utc::now()).await.unwrap());
        assert!(codes.consume("a@example.com", "123456", Utc::now()).await.unwrap());
        assert!(!codes.consume("a@example.com", "123456", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_reissue_replaces_old_code() {
        let db = test_support::db().await;
        let codes = db.verification_codes();

        codes.issue("b@example.com", "111111", 900).await.unwrap();
        codes.issue("b@example.com", "222222", 900).await.unwrap();

        assert!(!codes.consume("b@example.com", "111111", Utc::now()).await.unwrap());
        assert!(codes.consume("b@example.com", "222222", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let db = test_support::db().await;
        let codes = db.verification_codes();

        codes.issue("c@example.com", "333333", 900).await.unwrap();
        let later = Utc::now() + Duration::seconds(901);
        assert!(!codes.consume("c@example.com", "333333", later).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_user_marks_account_and_spends_code() {
        let db = test_support::db().await;
        let user = test_support::unverified(&db, "d@example.com").await;
        let codes = db.verification_codes();
        codes.issue("d@example.com", "444444", 900).await.unwrap();

        let err = codes.verify_user("d@example.com", "000000", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvalidVerificationCode)));

        let verified = codes.verify_user("d@example.com", "444444", Utc::now()).await.unwrap();
        assert_eq!(verified.id, user.id);
        assert!(verified.is_verified);
        assert!(!codes.consume("d@example.com", "444444", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_verification_keeps_code() {
        let db = test_support::db().await;
        test_support::unverified(&db, "e@example.com").await;
        let codes = db.verification_codes();
        codes.issue("e@example.com", "555555", 900).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER fail_verify BEFORE UPDATE OF is_verified ON users \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(codes.verify_user("e@example.com", "555555", Utc::now()).await.is_err());

        sqlx::query("DROP TRIGGER fail_verify").execute(db.pool()).await.unwrap();
        let user = codes.verify_user("e@example.com", "555555", Utc::now()).await.unwrap();
        assert!(user.is_verified);
    }
}
