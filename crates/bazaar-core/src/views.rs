//! Read-side aggregates computed from rows the database returns: the cart
//! summary, per-seller order grouping and order list totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::lifecycle::OrderStatus;
use crate::money::Money;
use crate::types::{CartLine, Order, OrderDetail};

// =============================================================================
// Cart Summary
// =============================================================================

/// What `GET /cart` returns.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    /// Sum of quantities, not number of lines.
    pub item_count: i64,
    pub total_cents: i64,
}

impl CartSummary {
    /// Fails with `AmountOverflow` rather than producing a wrapped total.
    pub fn from_lines(items: Vec<CartLine>) -> CoreResult<Self> {
        let item_count = items.iter().map(|line| line.quantity).sum();
        let subtotals = items
            .iter()
            .map(CartLine::subtotal)
            .collect::<CoreResult<Vec<_>>>()?;
        let total = Money::try_sum(subtotals)?;
        Ok(CartSummary {
            items,
            item_count,
            total_cents: total.cents(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// Count and sum over a list of orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub total_orders: i64,
    pub total_amount_cents: i64,
}

impl OrderTotals {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders
            .into_iter()
            .fold(OrderTotals::default(), |acc, order| OrderTotals {
                total_orders: acc.total_orders + 1,
                total_amount_cents: acc.total_amount_cents.saturating_add(order.total_cents),
            })
    }
}

/// Buyer order history with totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderHistory {
    pub orders: Vec<OrderDetail>,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl OrderHistory {
    pub fn new(orders: Vec<OrderDetail>) -> Self {
        let totals = OrderTotals::from_orders(orders.iter().map(|detail| &detail.order));
        OrderHistory { orders, totals }
    }
}

// =============================================================================
// Seller Orders
// =============================================================================

/// One (order × seller item) row as the seller-orders query returns it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SellerOrderRow {
    pub order_id: String,
    pub order_number: String,
    pub order_status: OrderStatus,
    pub order_total_cents: i64,
    pub delivery_address: String,
    pub order_created_at: DateTime<Utc>,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub item_id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// A seller's line within an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerOrderItem {
    pub id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// An order as one seller sees it: only their lines, plus their subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerOrder {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    /// Whole-order total, including other sellers' lines.
    pub order_total_cents: i64,
    /// This seller's lines only.
    pub seller_total_cents: i64,
    pub items: Vec<SellerOrderItem>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Seller order list with totals over the seller's share.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerOrderList {
    pub orders: Vec<SellerOrder>,
    pub total_orders: i64,
    pub total_amount_cents: i64,
}

/// Folds flat rows into one entry per order, keeping first-seen order.
///
/// ```text
/// rows:  (o1, itemA) (o1, itemB) (o2, itemC)
///          └────┬─────┘             │
///  out:   o1 [A, B]               o2 [C]
/// ```
pub fn group_seller_orders(rows: Vec<SellerOrderRow>) -> CoreResult<SellerOrderList> {
    let mut orders: Vec<SellerOrder> = Vec::new();

    for row in rows {
        let item = SellerOrderItem {
            id: row.item_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        };
        let line_total = Money::from_cents(item.unit_price_cents).multiply_quantity(item.quantity)?;

        match orders.iter_mut().find(|o| o.order_id == row.order_id) {
            Some(order) => {
                order.seller_total_cents = Money::from_cents(order.seller_total_cents)
                    .checked_add(line_total)?
                    .cents();
                order.items.push(item);
            }
            None => orders.push(SellerOrder {
                order_id: row.order_id,
                order_number: row.order_number,
                status: row.order_status,
                delivery_address: row.delivery_address,
                buyer_id: row.buyer_id,
                buyer_name: row.buyer_name,
                buyer_email: row.buyer_email,
                order_total_cents: row.order_total_cents,
                seller_total_cents: line_total.cents(),
                items: vec![item],
                created_at: row.order_created_at,
            }),
        }
    }

    let total_amount = Money::try_sum(
        orders
            .iter()
            .map(|o| Money::from_cents(o.seller_total_cents)),
    )?;
    Ok(SellerOrderList {
        total_orders: orders.len() as i64,
        total_amount_cents: total_amount.cents(),
        orders,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn line(id: &str, price_cents: i64, quantity: i64) -> CartLine {
        CartLine {
            id: id.to_string(),
            product_id: format!("p-{id}"),
            quantity,
            product_name: "Item".to_string(),
            price_cents,
            images: vec![],
            seller_id: "s-1".to_string(),
            shop_name: None,
        }
    }

    fn row(order: &str, item: &str, price: i64, qty: i64) -> SellerOrderRow {
        SellerOrderRow {
            order_id: order.to_string(),
            order_number: format!("ORD-{order}"),
            order_status: OrderStatus::Pending,
            order_total_cents: 9999,
            delivery_address: "addr".to_string(),
            order_created_at: Utc::now(),
            buyer_id: "b-1".to_string(),
            buyer_name: "Ada Lovelace".to_string(),
            buyer_email: "ada@example.com".to_string(),
            item_id: item.to_string(),
            product_id: Some(format!("p-{item}")),
            product_name: "Item".to_string(),
            quantity: qty,
            unit_price_cents: price,
        }
    }

    #[test]
    fn test_cart_summary() {
        let summary = CartSummary::from_lines(vec![line("a", 1000, 2), line("b", 500, 1)]).unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_cents, 2500);
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = CartSummary::from_lines(vec![]).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.total_cents, 0);
        assert_eq!(summary.item_count, 0);
    }

    #[test]
    fn test_group_seller_orders() {
        let list = group_seller_orders(vec![
            row("o2", "c", 300, 1),
            row("o1", "a", 1000, 2),
            row("o2", "d", 200, 3),
        ])
        .unwrap();

        assert_eq!(list.total_orders, 2);
        assert_eq!(list.orders[0].order_id, "o2");
        assert_eq!(list.orders[0].items.len(), 2);
        assert_eq!(list.orders[0].seller_total_cents, 900);
        assert_eq!(list.orders[1].seller_total_cents, 2000);
        assert_eq!(list.total_amount_cents, 2900);
    }

    #[test]
    fn test_group_no_rows() {
        let list = group_seller_orders(vec![]).unwrap();
        assert_eq!(list.total_orders, 0);
        assert!(list.orders.is_empty());
    }

    #[test]
    fn test_cart_summary_overflow_is_an_error() {
        let err = CartSummary::from_lines(vec![line("a", (1 << 62) + 1, 4)]).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));

        let err = CartSummary::from_lines(vec![
            line("a", i64::MAX / 2, 1),
            line("b", i64::MAX / 2, 1),
            line("c", i64::MAX / 2, 1),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
    }
}
