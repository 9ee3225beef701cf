//! # Product Repository
//!
//! Seller-owned catalog and the public shop view.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update / delete  ──►  WHERE id = ? AND seller_id = ?                  │
//! │                                                                         │
//! │  Another seller's product and a missing product look the same:         │
//! │  NotFound. Only admin_delete skips the seller filter.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Product Codes
//! `PROD-0001`, `PROD-0002`, ... one more than the highest existing code,
//! computed and inserted in the same transaction.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{CoreError, ListedProduct, NewProduct, Product, ProductPatch};

const PRODUCT_COLUMNS: &str = "id, product_code, seller_id, name, description, category, \
     price_cents, stock_quantity, images, status, created_at, updated_at";

const LISTED_PRODUCT_SELECT: &str = r#"
    SELECT
        p.id, p.product_code, p.seller_id, p.name, p.description, p.category,
        p.price_cents, p.stock_quantity, p.images, p.status, p.created_at, p.updated_at,
        u.shop_name,
        u.first_name || ' ' || u.last_name AS seller_name
    FROM products p
    INNER JOIN users u ON u.id = p.seller_id
"#;

fn images_json(images: &[String]) -> DbResult<String> {
    serde_json::to_string(images).map_err(|e| DbError::Internal(e.to_string()))
}

/// Next `PROD-NNNN` code. Must run inside the inserting transaction.
async fn next_product_code(conn: &mut SqliteConnection) -> DbResult<String> {
    let highest: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(CAST(SUBSTR(product_code, 6) AS INTEGER)), 0) FROM products",
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(format!("PROD-{:04}", highest + 1))
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let product = db.products().create(&seller_id, &new_product).await?;
/// let shop = db.products().list_shop().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a listing for `seller_id` with a fresh product code.
    pub async fn create(&self, seller_id: &str, input: &NewProduct) -> DbResult<Product> {
        input.validate().map_err(CoreError::from)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let images = images_json(&input.images)?;

        let mut tx = self.pool.begin().await?;
        let product_code = next_product_code(&mut tx).await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, product_code, seller_id, name, description, category,
                price_cents, stock_quantity, images, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&product_code)
        .bind(seller_id)
        .bind(input.name.trim())
        .bind(input.description.trim())
        .bind(input.category.trim())
        .bind(input.price_cents)
        .bind(input.stock_quantity)
        .bind(&images)
        .bind(input.initial_status())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(product_id = %id, product_code = %product_code, seller_id = %seller_id, "Product created");

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &id))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// A seller's own listings, newest first, whatever their status.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = ? ORDER BY created_at DESC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn get_owned(&self, seller_id: &str, id: &str) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ? AND seller_id = ?");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Validates a patch and applies it to one of the seller's products.
    pub async fn update(&self, seller_id: &str, id: &str, patch: &ProductPatch) -> DbResult<Product> {
        patch.validate().map_err(CoreError::from)?;

        let mut product = self.get_owned(seller_id, id).await?;
        patch.apply(&mut product);
        product.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, description = ?, category = ?, price_cents = ?,
                stock_quantity = ?, images = ?, status = ?, updated_at = ?
            WHERE id = ? AND seller_id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(images_json(&product.images)?)
        .bind(product.status)
        .bind(product.updated_at)
        .bind(id)
        .bind(seller_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Deletes one of the seller's products. Cart rows cascade; order items
    /// keep their snapshot with `product_id` cleared.
    pub async fn delete(&self, seller_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ? AND seller_id = ?")
            .bind(id)
            .bind(seller_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, seller_id = %seller_id, "Product deleted");
        Ok(())
    }

    /// Deletes any product regardless of owner.
    pub async fn admin_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deleted by admin");
        Ok(())
    }

    /// Public catalog: active, in-stock products with their shop.
    pub async fn list_shop(&self) -> DbResult<Vec<ListedProduct>> {
        let sql = format!(
            "{LISTED_PRODUCT_SELECT} WHERE p.status = 'active' AND p.stock_quantity > 0 \
             ORDER BY p.created_at DESC"
        );
        let products = sqlx::query_as::<_, ListedProduct>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// One shop product. Inactive or sold-out products are NotFound.
    pub async fn get_shop(&self, id: &str) -> DbResult<ListedProduct> {
        let sql = format!(
            "{LISTED_PRODUCT_SELECT} WHERE p.id = ? AND p.status = 'active' AND p.stock_quantity > 0"
        );
        sqlx::query_as::<_, ListedProduct>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Every product with its seller, for the admin overview.
    pub async fn list_all_with_seller(&self) -> DbResult<Vec<ListedProduct>> {
        let sql = format!("{LISTED_PRODUCT_SELECT} ORDER BY p.created_at DESC");
        let products = sqlx::query_as::<_, ListedProduct>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use bazaar_core::ProductStatus;

    #[tokio::test]
    async fn test_product_codes_increase() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;

        let first = test_support::product(&db, &seller, "Scarf", 1000).await;
        let second = test_support::product(&db, &seller, "Hat", 500).await;

        assert_eq!(first.product_code, "PROD-0001");
        assert_eq!(second.product_code, "PROD-0002");
        assert_eq!(first.images, vec!["https://img.example.com/Scarf.png"]);
    }

    #[tokio::test]
    async fn test_code_follows_highest_after_delete() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;

        let first = test_support::product(&db, &seller, "A", 100).await;
        test_support::product(&db, &seller, "B", 100).await;
        db.products().delete(&seller.id, &first.id).await.unwrap();

        let third = test_support::product(&db, &seller, "C", 100).await;
        assert_eq!(third.product_code, "PROD-0003");
    }

    #[tokio::test]
    async fn test_other_seller_cannot_edit() {
        let db = test_support::db().await;
        let owner = test_support::seller(&db, "owner@example.com").await;
        let other = test_support::seller(&db, "other@example.com").await;
        let product = test_support::product(&db, &owner, "Lamp", 2500).await;

        let patch = ProductPatch {
            price_cents: Some(1),
            ..Default::default()
        };
        let err = db
            .products()
            .update(&other.id, &product.id, &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.products().delete(&other.id, &product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let updated = db
            .products()
            .update(&owner.id, &product.id, &patch)
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 1);
    }

    #[tokio::test]
    async fn test_shop_hides_inactive_and_sold_out() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let visible = test_support::product(&db, &seller, "Visible", 100).await;
        let hidden = test_support::product(&db, &seller, "Hidden", 100).await;
        let sold_out = test_support::product(&db, &seller, "SoldOut", 100).await;

        db.products()
            .update(
                &seller.id,
                &hidden.id,
                &ProductPatch {
                    status: Some(ProductStatus::Inactive),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        db.products()
            .update(
                &seller.id,
                &sold_out.id,
                &ProductPatch {
                    stock_quantity: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let shop = db.products().list_shop().await.unwrap();
        assert_eq!(shop.len(), 1);
        assert_eq!(shop[0].product.id, visible.id);
        assert_eq!(shop[0].seller_name, "Test User");
        assert!(shop[0].shop_name.is_some());

        assert!(db.products().get_shop(&hidden.id).await.is_err());
        assert!(db.products().get_shop(&visible.id).await.is_ok());
        assert_eq!(db.products().list_all_with_seller().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_admin_delete() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let product = test_support::product(&db, &seller, "Gone", 100).await;

        db.products().admin_delete(&product.id).await.unwrap();
        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());
        assert!(db.products().admin_delete(&product.id).await.is_err());
    }
}
