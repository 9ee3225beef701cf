//! # bazaar-core: Pure Business Logic for the Bazaar Marketplace
//!
//! This crate is the **heart** of Bazaar. It holds the domain types and every
//! business rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (actix-web)                         │   │
//! │  │    /auth  /cart  /orders  /seller/*  /shop  /admin             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────────┐   │   │
//! │  │   │  types   │  │  money   │  │ lifecycle │  │ validation │   │   │
//! │  │   │  User    │  │  Money   │  │ OrderStat │  │   rules    │   │   │
//! │  │   │  Order   │  │ Earnings │  │ SellerAct │  │   checks   │   │   │
//! │  │   └──────────┘  └──────────┘  └───────────┘  └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-db (Database Layer)                   │   │
//! │  │          SQLite queries, migrations, transactional repos        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Order, ReturnOrder, ...)
//! - [`money`] - Money type with checked integer arithmetic and the earnings split
//! - [`lifecycle`] - Order and return state machine
//! - [`views`] - Cart summary and seller order grouping
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::lifecycle::{OrderStatus, SellerAction};
//! use bazaar_core::money::Money;
//!
//! // 2 × $10 + 1 × $5
//! let total = Money::from_cents(1000)
//!     .multiply_quantity(2)?
//!     .checked_add(Money::from_cents(500))?;
//! assert_eq!(total.to_string(), "$25.00");
//!
//! let next = SellerAction::Accept.apply("order-1", OrderStatus::Pending).unwrap();
//! assert_eq!(next, OrderStatus::Confirmed);
//! # Ok::<(), bazaar_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{OrderStatus, ReturnAction, ReturnStatus, SellerAction};
pub use money::{EarningsSplit, Money};
pub use types::*;
pub use views::{
    group_seller_orders, CartSummary, OrderHistory, OrderTotals, SellerOrder, SellerOrderList,
    SellerOrderRow,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in a cart line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest product price a seller may set ($1,000,000.00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Admin commission on delivered sales, in basis points (2000 = 20%).
pub const ADMIN_COMMISSION_BPS: u32 = 2000;

/// Lifetime of an email verification code.
pub const VERIFICATION_CODE_TTL_SECS: i64 = 15 * 60;

/// Number of digits in an email verification code.
pub const VERIFICATION_CODE_LEN: usize = 6;
