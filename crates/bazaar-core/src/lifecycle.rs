//! # Order Lifecycle
//!
//! The order and return state machine. Repositories ask this module for the
//! next status and then write it with a conditional UPDATE, so the database
//! never holds a status this module would not have produced.
//!
//! ## Order States
//! ```text
//!                accept            ship              deliver
//!   pending ───────────► confirmed ──────► shipped ──────────► delivered
//!      │                     │                                    ▲   │
//!      │ reject              └──────────── deliver ───────────────┘   │
//!      ▼ (+ wallet credit)                                            │ buyer requests return
//!   cancelled                                                         ▼
//!                                                            return_requested
//!                                                                     │ buyer: mark delivered
//!                                                                     ▼
//!                                                            return_delivered
//!                                                   seller: confirm │ │ seller: dispute
//!                                             (+ wallet credit)     ▼ ▼
//!                                              return_resolved   return_in_conflict
//! ```
//!
//! Each return status mirrors onto the parent order (`requested` →
//! `return_requested`, ...). Both rows change in one transaction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Order Status
// =============================================================================

/// Status of an order, including the mirrored return branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the buyer, waiting for the seller.
    Pending,
    /// Accepted by the seller.
    Confirmed,
    /// Handed to the carrier.
    Shipped,
    /// Received by the buyer.
    Delivered,
    /// Rejected by the seller; the buyer was refunded to the wallet.
    Cancelled,
    ReturnRequested,
    ReturnDelivered,
    ReturnResolved,
    ReturnInConflict,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::ReturnRequested,
        OrderStatus::ReturnDelivered,
        OrderStatus::ReturnResolved,
        OrderStatus::ReturnInConflict,
    ];

    /// Returns the stored/serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::ReturnRequested => "return_requested",
            OrderStatus::ReturnDelivered => "return_delivered",
            OrderStatus::ReturnResolved => "return_resolved",
            OrderStatus::ReturnInConflict => "return_in_conflict",
        }
    }

    /// A return may only be opened on a delivered order.
    pub const fn can_request_return(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                ValidationError::NotAllowed {
                    field: "status".to_string(),
                    allowed: OrderStatus::ALL.map(|st| st.as_str().to_string()).to_vec(),
                }
                .into()
            })
    }
}

// =============================================================================
// Seller Action
// =============================================================================

/// Fulfillment actions a seller can take on an order containing their items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SellerAction {
    Accept,
    Reject,
    Ship,
    Deliver,
}

impl SellerAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SellerAction::Accept => "accept",
            SellerAction::Reject => "reject",
            SellerAction::Ship => "ship",
            SellerAction::Deliver => "deliver",
        }
    }

    /// Returns the status this action leads to from `current`, if allowed.
    ///
    /// ```text
    /// accept : pending               → confirmed
    /// reject : pending               → cancelled
    /// ship   : confirmed             → shipped
    /// deliver: confirmed | shipped   → delivered
    /// ```
    pub const fn next_status(&self, current: OrderStatus) -> Option<OrderStatus> {
        match (self, current) {
            (SellerAction::Accept, OrderStatus::Pending) => Some(OrderStatus::Confirmed),
            (SellerAction::Reject, OrderStatus::Pending) => Some(OrderStatus::Cancelled),
            (SellerAction::Ship, OrderStatus::Confirmed) => Some(OrderStatus::Shipped),
            (SellerAction::Deliver, OrderStatus::Confirmed | OrderStatus::Shipped) => {
                Some(OrderStatus::Delivered)
            }
            _ => None,
        }
    }

    /// Like [`next_status`](Self::next_status) but with a typed rejection.
    pub fn apply(&self, order_id: &str, current: OrderStatus) -> CoreResult<OrderStatus> {
        self.next_status(current).ok_or_else(|| {
            CoreError::invalid_transition("order", order_id, self.as_str(), current.as_str())
        })
    }

    /// Rejection refunds the full order total to the buyer's wallet.
    pub const fn credits_buyer(&self) -> bool {
        matches!(self, SellerAction::Reject)
    }
}

impl fmt::Display for SellerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SellerAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(SellerAction::Accept),
            "reject" => Ok(SellerAction::Reject),
            "ship" => Ok(SellerAction::Ship),
            "deliver" => Ok(SellerAction::Deliver),
            _ => Err(CoreError::UnknownAction {
                action: s.to_string(),
                allowed: "accept, reject, ship, deliver".to_string(),
            }),
        }
    }
}

// =============================================================================
// Return Status
// =============================================================================

/// Status of a return order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    /// Buyer asked to return the order.
    Requested,
    /// Buyer reports the parcel reached the seller's return address.
    Delivered,
    /// Seller accepted the return; refund credited.
    Resolved,
    /// Seller disputed the return; left for manual handling.
    InConflict,
}

impl ReturnStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Requested => "requested",
            ReturnStatus::Delivered => "delivered",
            ReturnStatus::Resolved => "resolved",
            ReturnStatus::InConflict => "in_conflict",
        }
    }

    /// The order status shown while the return is in this state.
    pub const fn order_status(&self) -> OrderStatus {
        match self {
            ReturnStatus::Requested => OrderStatus::ReturnRequested,
            ReturnStatus::Delivered => OrderStatus::ReturnDelivered,
            ReturnStatus::Resolved => OrderStatus::ReturnResolved,
            ReturnStatus::InConflict => OrderStatus::ReturnInConflict,
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Return Action
// =============================================================================

/// Steps of the return flow after it has been requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnAction {
    /// Buyer: the item is back at the seller.
    MarkDelivered,
    /// Seller: accept the returned item and refund.
    Confirm,
    /// Seller: refuse the returned item.
    Dispute,
}

impl ReturnAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReturnAction::MarkDelivered => "mark_delivered",
            ReturnAction::Confirm => "confirm",
            ReturnAction::Dispute => "dispute",
        }
    }

    /// Parses the seller-side resolution (`confirm` or `dispute`).
    pub fn parse_resolution(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirm" => Ok(ReturnAction::Confirm),
            "dispute" => Ok(ReturnAction::Dispute),
            _ => Err(CoreError::UnknownAction {
                action: s.to_string(),
                allowed: "confirm, dispute".to_string(),
            }),
        }
    }

    pub const fn next_status(&self, current: ReturnStatus) -> Option<ReturnStatus> {
        match (self, current) {
            (ReturnAction::MarkDelivered, ReturnStatus::Requested) => Some(ReturnStatus::Delivered),
            (ReturnAction::Confirm, ReturnStatus::Delivered) => Some(ReturnStatus::Resolved),
            (ReturnAction::Dispute, ReturnStatus::Delivered) => Some(ReturnStatus::InConflict),
            _ => None,
        }
    }

    pub fn apply(&self, order_id: &str, current: ReturnStatus) -> CoreResult<ReturnStatus> {
        self.next_status(current).ok_or_else(|| {
            CoreError::invalid_transition(
                "return for order",
                order_id,
                self.as_str(),
                current.as_str(),
            )
        })
    }

    /// Only a confirmed return moves money.
    pub const fn credits_buyer(&self) -> bool {
        matches!(self, ReturnAction::Confirm)
    }

    /// Whether the seller (rather than the buyer) performs this step.
    pub const fn is_seller_action(&self) -> bool {
        !matches!(self, ReturnAction::MarkDelivered)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
