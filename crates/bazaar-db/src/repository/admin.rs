//! Back-office overview: every user, product and order, plus per-seller
//! earnings over delivered sales.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;
use bazaar_core::{AdminOverview, EarningsSplit, Money, OrderStatus, OrderWithBuyer, SellerEarnings};

#[derive(sqlx::FromRow)]
struct SalesRow {
    seller_id: String,
    seller_name: String,
    shop_name: Option<String>,
    total_sales_cents: i64,
}

#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    pub async fn overview(&self) -> DbResult<AdminOverview> {
        let users = UserRepository::new(self.pool.clone()).list_all().await?;

        let products = ProductRepository::new(self.pool.clone())
            .list_all_with_seller()
            .await?;

        let orders = sqlx::query_as::<_, OrderWithBuyer>(
            r#"
            SELECT
                o.id, o.order_number, o.user_id, o.total_cents, o.delivery_address,
                o.status, o.created_at, o.updated_at,
                u.first_name || ' ' || u.last_name AS buyer_name
            FROM orders o
            INNER JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let seller_earnings = self.seller_earnings().await?;

        debug!(
            users = users.len(),
            products = products.len(),
            orders = orders.len(),
            "Admin overview loaded"
        );

        Ok(AdminOverview {
            users,
            products,
            orders,
            seller_earnings,
        })
    }

    /// Earnings of every seller, highest sales first. Only delivered orders
    /// count; sellers without sales appear with zeros.
    pub async fn seller_earnings(&self) -> DbResult<Vec<SellerEarnings>> {
        let rows = sqlx::query_as::<_, SalesRow>(
            r#"
            SELECT
                u.id AS seller_id,
                u.first_name || ' ' || u.last_name AS seller_name,
                u.shop_name AS shop_name,
                COALESCE(SUM(oi.unit_price_cents * oi.quantity), 0) AS total_sales_cents
            FROM users u
            LEFT JOIN order_items oi
                ON oi.seller_id = u.id
               AND oi.order_id IN (SELECT id FROM orders WHERE status = ?)
            WHERE u.role = 'seller'
            GROUP BY u.id
            ORDER BY total_sales_cents DESC, seller_name
            "#,
        )
        .bind(OrderStatus::Delivered)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SellerEarnings {
                seller_id: row.seller_id,
                seller_name: row.seller_name,
                shop_name: row.shop_name,
                split: EarningsSplit::from_sales(Money::from_cents(row.total_sales_cents)),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support;
    use bazaar_core::SellerAction;

    #[tokio::test]
    async fn test_earnings_count_only_delivered_orders() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let idle = test_support::seller(&db, "idle@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let product = test_support::product(&db, &seller, "Rug", 5000).await;

        db.cart().add(&buyer.id, &product.id, 2).await.unwrap();
        let delivered = db.orders().place_order(&buyer.id, "addr").await.unwrap();
        for action in [SellerAction::Accept, SellerAction::Deliver] {
            db.orders()
                .apply_seller_action(&seller.id, &delivered.id, action)
                .await
                .unwrap();
        }

        db.cart().add(&buyer.id, &product.id, 1).await.unwrap();
        db.orders().place_order(&buyer.id, "addr").await.unwrap();

        let overview = db.admin().overview().await.unwrap();
        assert_eq!(overview.users.len(), 3);
        assert_eq!(overview.products.len(), 1);
        assert_eq!(overview.orders.len(), 2);
        assert_eq!(overview.orders[0].buyer_name, "Test User");

        let top = &overview.seller_earnings[0];
        assert_eq!(top.seller_id, seller.id);
        assert_eq!(top.split.total_sales_cents, 10_000);
        assert_eq!(top.split.admin_commission_cents, 2_000);
        assert_eq!(top.split.seller_earnings_cents, 8_000);

        let zero = overview
            .seller_earnings
            .iter()
            .find(|e| e.seller_id == idle.id)
            .unwrap();
        assert_eq!(zero.split.total_sales_cents, 0);
    }
}
