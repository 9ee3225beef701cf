//! # Return Repository
//!
//! The post-delivery return flow. Every step writes the return row and the
//! mirrored order status in one transaction, each with a conditional UPDATE
//! on the status it observed.
//!
//! ```text
//! buyer  request_return         delivered        → return_requested
//! buyer  mark_return_delivered  return_requested → return_delivered
//! seller resolve_return confirm return_delivered → return_resolved (+ refund)
//! seller resolve_return dispute return_delivered → return_in_conflict
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::order::order_by_id;
use crate::repository::wallet;
use bazaar_core::{
    validation, CoreError, CreditReason, Money, OrderStatus, ReturnAction, ReturnOrder,
    ReturnStatus,
};

const RETURN_COLUMNS: &str = "id, order_id, user_id, seller_id, return_reason, status, \
     refund_amount_cents, return_address, resolved_at, created_at, updated_at";

pub(crate) async fn return_for_order(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> DbResult<Option<ReturnOrder>> {
    let sql = format!("SELECT {RETURN_COLUMNS} FROM return_orders WHERE order_id = ?");
    let ret = sqlx::query_as::<_, ReturnOrder>(&sql)
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(ret)
}

/// Moves the order from `from` to `to`, or fails if someone else moved it.
async fn set_order_status(
    conn: &mut SqliteConnection,
    order_id: &str,
    action: &str,
    from: OrderStatus,
    to: OrderStatus,
) -> DbResult<()> {
    let result =
        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
            .bind(to)
            .bind(Utc::now())
            .bind(order_id)
            .bind(from)
            .execute(&mut *conn)
            .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::invalid_transition("order", order_id, action, from.as_str()).into());
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    pub async fn get_for_order(&self, order_id: &str) -> DbResult<Option<ReturnOrder>> {
        let mut conn = self.pool.acquire().await?;
        return_for_order(&mut conn, order_id).await
    }

    /// Opens a return on one of the buyer's delivered orders.
    ///
    /// The refund is frozen at the order total and the return address is
    /// copied from the seller of the order's first item.
    ///
    /// ## Errors
    /// - `NotFound` if the order isn't the buyer's
    /// - `Rule(ReturnAlreadyExists)` on a second request
    /// - `Rule(InvalidTransition)` if the order isn't delivered
    pub async fn request_return(
        &self,
        buyer_id: &str,
        order_id: &str,
        reason: &str,
    ) -> DbResult<ReturnOrder> {
        let reason = reason.trim();
        validation::validate_required("return_reason", reason).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let order = order_by_id(&mut tx, order_id).await?;
        if order.user_id != buyer_id {
            return Err(DbError::not_found("Order", order_id));
        }
        if return_for_order(&mut tx, order_id).await?.is_some() {
            return Err(CoreError::ReturnAlreadyExists(order.order_number).into());
        }
        if !order.status.can_request_return() {
            return Err(CoreError::invalid_transition(
                "order",
                order_id,
                "request return",
                order.status.as_str(),
            )
            .into());
        }

        let seller_id: String = sqlx::query_scalar(
            "SELECT seller_id FROM order_items WHERE order_id = ? ORDER BY rowid LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Order item", order_id))?;

        let return_address: String =
            sqlx::query_scalar("SELECT COALESCE(return_address, '') FROM users WHERE id = ?")
                .bind(&seller_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("User", &seller_id))?;

        let now = Utc::now();
        let ret = ReturnOrder {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            user_id: buyer_id.to_string(),
            seller_id,
            return_reason: reason.to_string(),
            status: ReturnStatus::Requested,
            refund_amount_cents: order.total_cents,
            return_address,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO return_orders (
                id, order_id, user_id, seller_id, return_reason, status,
                refund_amount_cents, return_address, resolved_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(&ret.id)
        .bind(&ret.order_id)
        .bind(&ret.user_id)
        .bind(&ret.seller_id)
        .bind(&ret.return_reason)
        .bind(ret.status)
        .bind(ret.refund_amount_cents)
        .bind(&ret.return_address)
        .bind(ret.created_at)
        .bind(ret.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            err if err.is_unique_violation_on("return_orders.order_id") => {
                CoreError::ReturnAlreadyExists(order.order_number.clone()).into()
            }
            err => err,
        })?;

        set_order_status(
            &mut tx,
            order_id,
            "request return",
            order.status,
            ReturnStatus::Requested.order_status(),
        )
        .await?;

        tx.commit().await?;

        info!(
            order_id = %order_id,
            return_id = %ret.id,
            refund = ret.refund_amount_cents,
            "Return requested"
        );
        Ok(ret)
    }

    /// Buyer reports the parcel arrived back at the seller.
    pub async fn mark_return_delivered(&self, buyer_id: &str, order_id: &str) -> DbResult<ReturnOrder> {
        self.advance(buyer_id, order_id, ReturnAction::MarkDelivered)
            .await
    }

    /// Seller confirms (refund) or disputes a delivered return.
    pub async fn resolve_return(
        &self,
        seller_id: &str,
        order_id: &str,
        action: ReturnAction,
    ) -> DbResult<ReturnOrder> {
        if !action.is_seller_action() {
            return Err(CoreError::UnknownAction {
                action: action.as_str().to_string(),
                allowed: "confirm, dispute".to_string(),
            }
            .into());
        }
        self.advance(seller_id, order_id, action).await
    }

    async fn advance(
        &self,
        actor_id: &str,
        order_id: &str,
        action: ReturnAction,
    ) -> DbResult<ReturnOrder> {
        let mut tx = self.pool.begin().await?;

        let mut ret = return_for_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Return", order_id))?;

        let owner = if action.is_seller_action() {
            &ret.seller_id
        } else {
            &ret.user_id
        };
        if owner != actor_id {
            return Err(DbError::not_found("Return", order_id));
        }

        let observed = ret.status;
        let next = action.apply(order_id, observed)?;
        let now = Utc::now();
        let resolved_at = (next == ReturnStatus::Resolved).then_some(now);

        let result = sqlx::query(
            r#"
            UPDATE return_orders
            SET status = ?, resolved_at = COALESCE(?, resolved_at), updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(next)
        .bind(resolved_at)
        .bind(now)
        .bind(&ret.id)
        .bind(observed)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::invalid_transition(
                "return for order",
                order_id,
                action.as_str(),
                observed.as_str(),
            )
            .into());
        }

        set_order_status(
            &mut tx,
            order_id,
            action.as_str(),
            observed.order_status(),
            next.order_status(),
        )
        .await?;

        if action.credits_buyer() {
            wallet::credit(
                &mut tx,
                &ret.user_id,
                &ret.order_id,
                CreditReason::ReturnResolved,
                Money::from_cents(ret.refund_amount_cents),
            )
            .await?;
        }

        tx.commit().await?;

        ret.status = next;
        ret.updated_at = now;
        if resolved_at.is_some() {
            ret.resolved_at = resolved_at;
        }

        info!(
            order_id = %order_id,
            action = action.as_str(),
            from = %observed,
            to = %next,
            "Return status changed"
        );
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use crate::Database;
    use bazaar_core::{Order, ProductPatch, SellerAction, User};

    struct Delivered {
        seller: User,
        buyer: User,
        order: Order,
    }

    async fn delivered_order(db: &Database) -> Delivered {
        let seller = test_support::seller(db, "s@example.com").await;
        let buyer = test_support::buyer(db, "b@example.com").await;
        let ten = test_support::product(db, &seller, "Ten", 1000).await;
        let five = test_support::product(db, &seller, "Five", 500).await;
        db.cart().add(&buyer.id, &ten.id, 2).await.unwrap();
        db.cart().add(&buyer.id, &five.id, 1).await.unwrap();

        let order = db.orders().place_order(&buyer.id, "12 Main St").await.unwrap();
        for action in [SellerAction::Accept, SellerAction::Deliver] {
            db.orders()
                .apply_seller_action(&seller.id, &order.id, action)
                .await
                .unwrap();
        }

        Delivered { seller, buyer, order }
    }

    async fn order_status(db: &Database, order_id: &str) -> OrderStatus {
        sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_refund_frozen_at_request_time() {
        let db = test_support::db().await;
        let d = delivered_order(&db).await;

        for product in db.products().list_by_seller(&d.seller.id).await.unwrap() {
            db.products()
                .update(
                    &d.seller.id,
                    &product.id,
                    &ProductPatch {
                        price_cents: Some(1),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let ret = db
            .returns()
            .request_return(&d.buyer.id, &d.order.id, "Wrong size")
            .await
            .unwrap();

        assert_eq!(ret.refund_amount_cents, 2500);
        assert_eq!(ret.seller_id, d.seller.id);
        assert_eq!(ret.return_address, "3 Returns Ln");
        assert_eq!(ret.status, ReturnStatus::Requested);
        assert_eq!(order_status(&db, &d.order.id).await, OrderStatus::ReturnRequested);
    }

    #[tokio::test]
    async fn test_confirm_credits_exactly_once() {
        let db = test_support::db().await;
        let d = delivered_order(&db).await;
        let returns = db.returns();

        returns
            .request_return(&d.buyer.id, &d.order.id, "Broken")
            .await
            .unwrap();
        returns
            .mark_return_delivered(&d.buyer.id, &d.order.id)
            .await
            .unwrap();
        assert_eq!(order_status(&db, &d.order.id).await, OrderStatus::ReturnDelivered);

        let resolved = returns
            .resolve_return(&d.seller.id, &d.order.id, ReturnAction::Confirm)
            .await
            .unwrap();
        assert_eq!(resolved.status, ReturnStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
        assert_eq!(db.wallet().balance(&d.buyer.id).await.unwrap().cents(), 2500);
        assert_eq!(order_status(&db, &d.order.id).await, OrderStatus::ReturnResolved);

        let err = returns
            .resolve_return(&d.seller.id, &d.order.id, ReturnAction::Confirm)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvalidTransition { .. })));
        assert_eq!(db.wallet().balance(&d.buyer.id).await.unwrap().cents(), 2500);
        assert_eq!(db.wallet().credits(&d.buyer.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispute_moves_no_money() {
        let db = test_support::db().await;
        let d = delivered_order(&db).await;
        let returns = db.returns();

        returns.request_return(&d.buyer.id, &d.order.id, "Meh").await.unwrap();
        returns.mark_return_delivered(&d.buyer.id, &d.order.id).await.unwrap();
        let disputed = returns
            .resolve_return(&d.seller.id, &d.order.id, ReturnAction::Dispute)
            .await
            .unwrap();

        assert_eq!(disputed.status, ReturnStatus::InConflict);
        assert!(disputed.resolved_at.is_none());
        assert_eq!(db.wallet().balance(&d.buyer.id).await.unwrap().cents(), 0);
        assert_eq!(order_status(&db, &d.order.id).await, OrderStatus::ReturnInConflict);
    }

    #[tokio::test]
    async fn test_confirm_before_delivery_back_is_rejected() {
        let db = test_support::db().await;
        let d = delivered_order(&db).await;

        db.returns()
            .request_return(&d.buyer.id, &d.order.id, "Broken")
            .await
            .unwrap();
        let err = db
            .returns()
            .resolve_return(&d.seller.id, &d.order.id, ReturnAction::Confirm)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_second_request_is_rejected() {
        let db = test_support::db().await;
        let d = delivered_order(&db).await;

        db.returns()
            .request_return(&d.buyer.id, &d.order.id, "Broken")
            .await
            .unwrap();
        let err = db
            .returns()
            .request_return(&d.buyer.id, &d.order.id, "Again")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::ReturnAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_only_delivered_orders_can_be_returned() {
        let db = test_support::db().await;
        let seller = test_support::seller(&db, "s@example.com").await;
        let buyer = test_support::buyer(&db, "b@example.com").await;
        let product = test_support::product(&db, &seller, "Mug", 1000).await;
        db.cart().add(&buyer.id, &product.id, 1).await.unwrap();
        let order = db.orders().place_order(&buyer.id, "addr").await.unwrap();

        let err = db
            .returns()
            .request_return(&buyer.id, &order.id, "Changed my mind")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::InvalidTransition { .. })));
        assert!(db.returns().get_for_order(&order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_actor_gets_not_found() {
        let db = test_support::db().await;
        let d = delivered_order(&db).await;
        let returns = db.returns();

        let err = returns
            .request_return(&d.seller.id, &d.order.id, "Not mine")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        returns.request_return(&d.buyer.id, &d.order.id, "Broken").await.unwrap();

        let err = returns
            .mark_return_delivered(&d.seller.id, &d.order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        returns.mark_return_delivered(&d.buyer.id, &d.order.id).await.unwrap();
        let err = returns
            .resolve_return(&d.buyer.id, &d.order.id, ReturnAction::Confirm)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
