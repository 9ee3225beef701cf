//! # Order Repository
//!
//! Order placement, buyer/seller queries and seller fulfillment actions.
//!
//! ## Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place_order (one transaction)                        │
//! │                                                                         │
//! │  1. cart lines ⋈ products   (live price, seller)                       │
//! │  2. empty?  ──► CoreError::EmptyCart                                   │
//! │  3. order_number = ORD-YYYYMMDD-XXXXXXXX                               │
//! │  4. total = Σ price × qty                                              │
//! │  5. INSERT orders (pending)                                            │
//! │  6. INSERT order_items (name + price snapshot)                         │
//! │  7. DELETE cart_items                                                  │
//! │                                                                         │
//! │  Any error before COMMIT rolls back all of it.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::cart::cart_lines;
use crate::repository::returns::return_for_order;
use crate::repository::wallet;
use bazaar_core::{
    group_seller_orders, validation, CartSummary, CoreError, CreditReason, Order, OrderDetail,
    OrderHistory, OrderItemDetail, OrderStatus, SellerAction, SellerOrderList, SellerOrderRow,
};

pub(crate) const ORDER_COLUMNS: &str =
    "id, order_number, user_id, total_cents, delivery_address, status, created_at, updated_at";

/// `ORD-20261019-3F9A1C2B`
fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

pub(crate) async fn order_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Order> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))
}

/// Items of an order with the product's current images (empty if the
/// product was deleted).
async fn order_items(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<OrderItemDetail>> {
    let items = sqlx::query_as::<_, OrderItemDetail>(
        r#"
        SELECT
            oi.id, oi.order_id, oi.product_id, oi.seller_id, oi.product_name,
            oi.quantity, oi.unit_price_cents, oi.created_at,
            COALESCE(p.images, '[]') AS product_images
        FROM order_items oi
        LEFT JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ?
        ORDER BY oi.created_at, oi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

/// Repository for orders.
///
/// ## Usage
/// ```rust,ignore
/// let order = db.orders().place_order(&buyer_id, "12 Main St").await?;
/// let order = db.orders().apply_seller_action(&seller_id, &order.id, SellerAction::Accept).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Turns the user's cart into a pending order.
    ///
    /// ## Errors
    /// - `Rule(Validation)` if the delivery address is blank
    /// - `Rule(EmptyCart)` if there is nothing to order
    pub async fn place_order(&self, user_id: &str, delivery_address: &str) -> DbResult<Order> {
        let delivery_address = delivery_address.trim();
        validation::validate_required("delivery_address", delivery_address)
            .map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let summary = CartSummary::from_lines(cart_lines(&mut tx, user_id).await?)?;
        if summary.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number: generate_order_number(now),
            user_id: user_id.to_string(),
            total_cents: summary.total_cents,
            delivery_address: delivery_address.to_string(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, user_id, total_cents, delivery_address, status,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.user_id)
        .bind(order.total_cents)
        .bind(&order.delivery_address)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in &summary.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, seller_id, product_name,
                    quantity, unit_price_cents, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order.id)
            .bind(&line.product_id)
            .bind(&line.seller_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.price_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            items = summary.items.len(),
            total = order.total_cents,
            "Order placed"
        );
        Ok(order)
    }

    /// The buyer's orders, newest first.
    pub async fn list_for_buyer(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    /// One of the buyer's orders with items and return.
    /// Someone else's order is NotFound.
    pub async fn get_for_buyer(&self, user_id: &str, order_id: &str) -> DbResult<OrderDetail> {
        let mut conn = self.pool.acquire().await?;

        let order = order_by_id(&mut conn, order_id).await?;
        if order.user_id != user_id {
            return Err(DbError::not_found("Order", order_id));
        }

        let items = order_items(&mut conn, &order.id).await?;
        let return_order = return_for_order(&mut conn, &order.id).await?;
        Ok(OrderDetail::new(order, items, return_order))
    }

    /// Every order of the buyer with items and return status, plus totals.
    pub async fn history(&self, user_id: &str) -> DbResult<OrderHistory> {
        let orders = self.list_for_buyer(user_id).await?;
        let mut conn = self.pool.acquire().await?;

        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let items = order_items(&mut conn, &order.id).await?;
            let return_order = return_for_order(&mut conn, &order.id).await?;
            details.push(OrderDetail::new(order, items, return_order));
        }

        debug!(user_id = %user_id, orders = details.len(), "Order history loaded");
        Ok(OrderHistory::new(details))
    }

    /// Orders containing the seller's items, grouped per order, newest first.
    pub async fn list_for_seller(
        &self,
        seller_id: &str,
        status: Option<OrderStatus>,
    ) -> DbResult<SellerOrderList> {
        let rows = sqlx::query_as::<_, SellerOrderRow>(
            r#"
            SELECT
                o.id               AS order_id,
                o.order_number     AS order_number,
                o.status           AS order_status,
                o.total_cents      AS order_total_cents,
                o.delivery_address AS delivery_address,
                o.created_at       AS order_created_at,
                b.id               AS buyer_id,
                b.first_name || ' ' || b.last_name AS buyer_name,
                b.email            AS buyer_email,
                oi.id              AS item_id,
                oi.product_id      AS product_id,
                oi.product_name    AS product_name,
                oi.quantity        AS quantity,
                oi.unit_price_cents AS unit_price_cents
            FROM order_items oi
            INNER JOIN orders o ON o.id = oi.order_id
            INNER JOIN users b ON b.id = o.user_id
            WHERE oi.seller_id = ?1
              AND (?2 IS NULL OR o.status = ?2)
            ORDER BY o.created_at DESC, o.id, oi.created_at, oi.id
            "#,
        )
        .bind(seller_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(group_seller_orders(rows)?)
    }

    /// Applies a fulfillment action to an order containing the seller's items.
    ///
    /// ## Errors
    /// - `NotFound` if the order doesn't exist or has none of the seller's items
    /// - `Rule(InvalidTransition)` if the action isn't allowed from the current
    ///   status, or another writer changed it first
    pub async fn apply_seller_action(
        &self,
        seller_id: &str,
        order_id: &str,
        action: SellerAction,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let mut order = order_by_id(&mut tx, order_id).await?;

        let seller_items: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM order_items WHERE order_id = ? AND seller_id = ?",
        )
        .bind(order_id)
        .bind(seller_id)
        .fetch_one(&mut *tx)
        .await?;

        if seller_items == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        let observed = order.status;
        let next = action.apply(order_id, observed)?;
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
                .bind(next)
                .bind(now)
                .bind(order_id)
                .bind(observed)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(
                CoreError::invalid_transition("order", order_id, action.as_str(), observed.as_str())
                    .into(),
            );
        }

        if action.credits_buyer() {
            wallet::credit(
                &mut tx,
                &order.user_id,
                &order.id,
                CreditReason::OrderRejected,
                order.total(),
            )
            .await?;
        }

        tx.commit().await?;

        order.status = next;
        order.updated_at = now;

        info!(
            order_id = %order_id,
            seller_id = %seller_id,
            action = %action,
            from = %observed,
            to = %next,
            "Order status changed"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use bazaar_core::{NewProduct, User, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

    async fn cart_of_two(db: &crate::Database) -> (User, User) {
        let seller = test_support::seller(db, "s@example.com").await;
        let buyer = test_support::buyer(db, "b@example.com").await;
        let ten = test_support::product(db, &seller, "Ten", 1000).await;
        let five = test_support::product(db, &seller, "Five", 500).await;
        db.cart().add(&buyer.id, &ten.id, 2).await.unwrap();
        db.cart().add(&buyer.id, &five.id, 1).await.unwrap();
        (seller, buyer)
    }

    #[tokio::test]
    async fn test_place_order_snapshots_cart() {
        let db = test_support::db().await;
        let (_, buyer) = cart_of_two(&db).await;

        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        assert_eq!(order.total_cents, 2500);
        assert_eq!(order.total().to_string(), "$25.00");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.order_number.len(), "ORD-YYYYMMDD-XXXXXXXX".len());

        let detail = db.orders().get_for_buyer(&buyer.id, &order.id).await.unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.item_count, 3);
        let sum: i64 = detail
            .items
            .iter()
            .map(|i| i.item.line_total().unwrap().cents())
            .sum();
        assert_eq!(sum, order.total_cents);

        assert!(db.cart().lines(&buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_at_price_ceiling_totals_exactly() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let top = test_support::product(&db, &seller, "Top", MAX_PRICE_CENTS).await;
        let other = test_support::product(&db, &seller, "Other", MAX_PRICE_CENTS).await;
        db.cart().add(&buyer.id, &top.id, MAX_ITEM_QUANTITY).await.unwrap();
        db.cart().add(&buyer.id, &other.id, MAX_ITEM_QUANTITY).await.unwrap();

        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        assert_eq!(order.total_cents, 2 * MAX_PRICE_CENTS * MAX_ITEM_QUANTITY);
        assert!(order.total_cents > 0);
    }

    #[tokio::test]
    async fn test_price_above_ceiling_is_rejected() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let input = NewProduct {
            name: "Too Much".to_string(),
            description: "d".to_string(),
            category: "General".to_string(),
            price_cents: (1 << 62) + 1,
            stock_quantity: 10,
            images: vec![],
            status: None,
        };

        let err = db.products().create(&seller.id, &input).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let db = test_support::db().await;
        let buyer = test_support::buyer(&db, "b@example.com").await;

        let err = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected() {
        let db = test_support::db().await;
        let (_, buyer) = cart_of_two(&db).await;

        let err = db.orders().place_order(&buyer.id, "   ").await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::Validation(_))));
        assert_eq!(db.cart().lines(&buyer.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_placement_leaves_cart_and_orders_untouched() {
        let db = test_support::db().await;
        let (_, buyer) = cart_of_two(&db).await;

        sqlx::query(
            "CREATE TRIGGER fail_order_items BEFORE INSERT ON order_items \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orders, 0);
        assert_eq!(db.cart().lines(&buyer.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_order_price_is_frozen() {
        let db = test_support::db().await;
        let (seller, buyer) = cart_of_two(&db).await;
        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        for product in db.products().list_by_seller(&seller.id).await.unwrap() {
            db.products()
                .update(
                    &seller.id,
                    &product.id,
                    &bazaar_core::ProductPatch {
                        price_cents: Some(99_999),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let history = db.orders().history(&buyer.id).await.unwrap();
        assert_eq!(history.totals.total_orders, 1);
        assert_eq!(history.totals.total_amount_cents, 2500);
        assert_eq!(history.orders[0].order.id, order.id);
        assert!(history.orders[0].return_order.is_none());
    }

    #[tokio::test]
    async fn test_other_buyer_cannot_see_order() {
        let db = test_support::db().await;
        let (_, buyer) = cart_of_two(&db).await;
        let stranger = test_support::buyer(&db, "x@example.com").await;
        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        let err = db
            .orders()
            .get_for_buyer(&stranger.id, &order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_seller_flow_and_illegal_transition() {
        let db = test_support::db().await;
        let (seller, buyer) = cart_of_two(&db).await;
        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();
        let orders = db.orders();

        let accepted = orders
            .apply_seller_action(&seller.id, &order.id, SellerAction::Accept)
            .await
            .unwrap();
        assert_eq!(accepted.status, OrderStatus::Confirmed);

        let err = orders
            .apply_seller_action(&seller.id, &order.id, SellerAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvalidTransition { .. })));

        let shipped = orders
            .apply_seller_action(&seller.id, &order.id, SellerAction::Ship)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);

        let delivered = orders
            .apply_seller_action(&seller.id, &order.id, SellerAction::Deliver)
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn test_reject_credits_buyer() {
        let db = test_support::db().await;
        let (seller, buyer) = cart_of_two(&db).await;
        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        let rejected = db
            .orders()
            .apply_seller_action(&seller.id, &order.id, SellerAction::Reject)
            .await
            .unwrap();
        assert_eq!(rejected.status, OrderStatus::Cancelled);
        assert_eq!(db.wallet().balance(&buyer.id).await.unwrap().cents(), 2500);

        let err = db
            .orders()
            .apply_seller_action(&seller.id, &order.id, SellerAction::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvalidTransition { .. })));
        assert_eq!(db.wallet().balance(&buyer.id).await.unwrap().cents(), 2500);
    }

    #[tokio::test]
    async fn test_unrelated_seller_gets_not_found() {
        let db = test_support::db().await;
        let (_, buyer) = cart_of_two(&db).await;
        let other = test_support::seller(&db, "other@example.com").await;
        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        let err = db
            .orders()
            .apply_seller_action(&other.id, &order.id, SellerAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_seller_sees_only_own_lines() {
        let db = test_support::db().await;
        let (seller, buyer) = cart_of_two(&db).await;
        let other = test_support::seller(&db, "other@example.com").await;
        let lamp = test_support::product(&db, &other, "Lamp", 700).await;
        db.cart().add(&buyer.id, &lamp.id, 1).await.unwrap();
        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();

        let mine = db.orders().list_for_seller(&seller.id, None).await.unwrap();
        assert_eq!(mine.total_orders, 1);
        assert_eq!(mine.orders[0].items.len(), 2);
        assert_eq!(mine.orders[0].seller_total_cents, 2500);
        assert_eq!(mine.orders[0].order_total_cents, 3200);
        assert_eq!(mine.orders[0].buyer_email, "b@example.com");

        let theirs = db.orders().list_for_seller(&other.id, None).await.unwrap();
        assert_eq!(theirs.total_amount_cents, 700);

        let filtered = db
            .orders()
            .list_for_seller(&seller.id, Some(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(filtered.total_orders, 0);

        let pending = db
            .orders()
            .list_for_seller(&seller.id, Some(OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.orders[0].order_id, order.id);
    }
}
