//! # Cart Repository
//!
//! One row per (user, product). Adding a product that is already in the
//! cart merges the quantities.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{validation, CartLine, CoreError, Product};

const CART_LINE_SELECT: &str = r#"
    SELECT
        c.id,
        c.product_id,
        c.quantity,
        p.name AS product_name,
        p.price_cents,
        p.images,
        p.seller_id,
        u.shop_name
    FROM cart_items c
    INNER JOIN products p ON p.id = c.product_id
    INNER JOIN users u ON u.id = p.seller_id
"#;

/// Cart lines at live prices. Shared with order placement so the order is
/// priced from the same rows inside its transaction.
pub(crate) async fn cart_lines(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Vec<CartLine>> {
    let sql = format!("{CART_LINE_SELECT} WHERE c.user_id = ? ORDER BY c.created_at, c.id");
    let lines = sqlx::query_as::<_, CartLine>(&sql)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(lines)
}

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Adds `quantity` of a product, merging with an existing line.
    ///
    /// ## Errors
    /// - `NotFound` if the product doesn't exist
    /// - `Rule(ProductUnavailable)` if it is inactive or out of stock
    /// - `Rule(Validation)` if the merged quantity leaves 1..=999
    pub async fn add(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<CartLine> {
        let mut tx = self.pool.begin().await?;

        let product: Product = sqlx::query_as(
            "SELECT id, product_code, seller_id, name, description, category, price_cents, \
             stock_quantity, images, status, created_at, updated_at FROM products WHERE id = ?",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

        if !product.is_purchasable() {
            return Err(CoreError::ProductUnavailable(product.name).into());
        }

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE user_id = ? AND product_id = ?",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let merged = existing.unwrap_or(0).saturating_add(quantity);
        validation::validate_quantity(merged).map_err(CoreError::from)?;

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = excluded.quantity, updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(product_id)
        .bind(merged)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let sql = format!("{CART_LINE_SELECT} WHERE c.user_id = ? AND c.product_id = ?");
        let line = sqlx::query_as::<_, CartLine>(&sql)
            .bind(user_id)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(user_id = %user_id, product_id = %product_id, quantity = merged, "Cart line saved");
        Ok(line)
    }

    pub async fn lines(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let mut conn = self.pool.acquire().await?;
        cart_lines(&mut conn, user_id).await
    }

    /// Sets the quantity of one of the user's lines.
    pub async fn update_quantity(&self, user_id: &str, item_id: &str, quantity: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(item_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", item_id));
        }
        Ok(())
    }

    pub async fn remove(&self, user_id: &str, item_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ? AND user_id = ?")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", item_id));
        }
        Ok(())
    }

    /// Empties the cart; returns the number of lines removed.
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use bazaar_core::{CartSummary, ProductPatch, ProductStatus};

    #[tokio::test]
    async fn test_add_merges_quantity() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let product = test_support::product(&db, &seller, "Mug", 1000).await;

        db.cart().add(&buyer.id, &product.id, 1).await.unwrap();
        let line = db.cart().add(&buyer.id, &product.id, 2).await.unwrap();

        assert_eq!(line.quantity, 3);
        assert_eq!(line.product_name, "Mug");
        assert_eq!(db.cart().lines(&buyer.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merged_quantity_is_capped() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let product = test_support::product(&db, &seller, "Mug", 1000).await;

        db.cart().add(&buyer.id, &product.id, 998).await.unwrap();
        let err = db.cart().add(&buyer.id, &product.id, 2).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));

        let lines = db.cart().lines(&buyer.id).await.unwrap();
        assert_eq!(lines[0].quantity, 998);
    }

    #[tokio::test]
    async fn test_inactive_product_cannot_be_added() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let product = test_support::product(&db, &seller, "Mug", 1000).await;

        db.products()
            .update(
                &seller.id,
                &product.id,
                &ProductPatch {
                    status: Some(ProductStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = db.cart().add(&buyer.id, &product.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::ProductUnavailable(_))));

        let err = db.cart().add(&buyer.id, "missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let ten = test_support::product(&db, &seller, "Ten", 1000).await;
        let five = test_support::product(&db, &seller, "Five", 500).await;

        db.cart().add(&buyer.id, &ten.id, 2).await.unwrap();
        db.cart().add(&buyer.id, &five.id, 1).await.unwrap();

        let summary = CartSummary::from_lines(db.cart().lines(&buyer.id).await.unwrap()).unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_cents, 2500);
    }

    #[tokio::test]
    async fn test_lines_are_scoped_to_owner() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let other = test_support::buyer(&db, "o@example.com").await;
        let product = test_support::product(&db, &seller, "Mug", 1000).await;

        let line = db.cart().add(&buyer.id, &product.id, 1).await.unwrap();

        assert!(db.cart().update_quantity(&other.id, &line.id, 5).await.is_err());
        assert!(db.cart().remove(&other.id, &line.id).await.is_err());

        db.cart().update_quantity(&buyer.id, &line.id, 5).await.unwrap();
        assert_eq!(db.cart().lines(&buyer.id).await.unwrap()[0].quantity, 5);

        db.cart().remove(&buyer.id, &line.id).await.unwrap();
        assert!(db.cart().lines(&buyer.id).await.unwrap().is_empty());
        assert_eq!(db.cart().clear(&buyer.id).await.unwrap(), 0);
    }
}
