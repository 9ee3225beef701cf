//! # User Repository
//!
//! Accounts, credentials and profile edits.
//!
//! The password hash is stored on the `users` row but never loaded into
//! [`User`]; only [`UserRepository::credentials_by_email`] reads it.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, email, first_name, last_name, phone_number, address, \
     role, is_verified, shop_name, registration_number, shop_address, warehouse_address, \
     return_address, business_details, wallet_balance_cents, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account.
    ///
    /// ## Errors
    /// - `UniqueViolation { field: "email" }` if the email is taken
    pub async fn create(&self, new_user: &NewUser) -> DbResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let seller = new_user.seller.as_ref();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name, phone_number, address,
                role, is_verified, shop_name, registration_number, shop_address,
                warehouse_address, return_address, business_details,
                wallet_balance_cents, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone_number)
        .bind(&new_user.address)
        .bind(new_user.role)
        .bind(new_user.is_verified)
        .bind(seller.map(|s| s.shop_name.as_str()))
        .bind(seller.map(|s| s.registration_number.as_str()))
        .bind(seller.map(|s| s.shop_address.as_str()))
        .bind(seller.map(|s| s.warehouse_address.as_str()))
        .bind(seller.map(|s| s.return_address.as_str()))
        .bind(seller.and_then(|s| s.business_details.as_deref()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("users.email") => {
                DbError::duplicate("email", &new_user.email)
            }
            err => err,
        })?;

        info!(user_id = %id, role = %new_user.role, "User created");

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("User", &id))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Looks up by (already normalized) email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Returns the user together with the stored password hash, for login.
    pub async fn credentials_by_email(&self, email: &str) -> DbResult<Option<(User, String)>> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?");
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Applies a validated profile edit; absent fields keep their value.
    pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> DbResult<User> {
        fn clean(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim)
        }

        let result = sqlx::query(
            r#"
            UPDATE users SET
                first_name        = COALESCE(?1, first_name),
                last_name         = COALESCE(?2, last_name),
                phone_number      = COALESCE(?3, phone_number),
                address           = COALESCE(?4, address),
                shop_name         = COALESCE(?5, shop_name),
                shop_address      = COALESCE(?6, shop_address),
                warehouse_address = COALESCE(?7, warehouse_address),
                return_address    = COALESCE(?8, return_address),
                business_details  = COALESCE(?9, business_details),
                updated_at        = ?10
            WHERE id = ?11
            "#,
        )
        .bind(clean(&update.first_name))
        .bind(clean(&update.last_name))
        .bind(clean(&update.phone_number))
        .bind(clean(&update.address))
        .bind(clean(&update.shop_name))
        .bind(clean(&update.shop_address))
        .bind(clean(&update.warehouse_address))
        .bind(clean(&update.return_address))
        .bind(clean(&update.business_details))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// All accounts, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }
}

/// Sets `is_verified` and returns the updated user, on the caller's connection.
pub(crate) async fn mark_verified(conn: &mut SqliteConnection, email: &str) -> DbResult<User> {
    let result = sqlx::query("UPDATE users SET is_verified = 1, updated_at = ? WHERE email = ?")
        .bind(Utc::now())
        .bind(email)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("User", email));
    }

    debug!(email = %email, "Email verified");
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("User", email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use bazaar_core::UserRole;

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "shop@example.com").await;

        assert_eq!(seller.role, UserRole::Seller);
        assert_eq!(seller.wallet_balance_cents, 0);
        assert_eq!(seller.return_address.as_deref(), Some("3 Returns Ln"));

        let by_email = db
            .users()
            .get_by_email("shop@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, seller.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let db = test_support::db().await;
        test_support::buyer(&db, "dup@example.com").await;

        let err = db
            .users()
            .create(&NewUser {
                email: "dup@example.com".to_string(),
                password_hash: "x".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                phone_number: "0300 1234567".to_string(),
                address: "addr".to_string(),
                role: UserRole::Buyer,
                is_verified: false,
                seller: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_credentials_include_hash() {
        let db = test_support::db().await;
        test_support::buyer(&db, "login@example.com").await;

        let (user, hash) = db
            .users()
            .credentials_by_email("login@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email, "login@example.com");
        assert_eq!(hash, "not-a-real-hash");

        assert!(db
            .users()
            .credentials_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_profile_keeps_absent_fields() {
        let db = test_support::db().await;
        let user = test_support::buyer(&db, "edit@example.com").await;

        let updated = db
            .users()
            .update_profile(
                &user.id,
                &ProfileUpdate {
                    address: Some("  42 New Rd ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address, "42 New Rd");
        assert_eq!(updated.first_name, user.first_name);
    }

    #[tokio::test]
    async fn test_mark_verified_unknown_email() {
        let db = test_support::db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let err = mark_verified(&mut conn, "ghost@example.com").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
