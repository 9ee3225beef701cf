//! # Repository Module
//!
//! Database repository implementations for Bazaar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().place_order(&user_id, "12 Main St")               │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place_order(&self, user_id, address)   ── one transaction         │
//! │  ├── apply_seller_action(&self, ...)        ── conditional UPDATE      │
//! │  └── history(&self, user_id)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Rules come from bazaar-core; repositories only decide *where* they    │
//! │  run (inside which transaction) and turn rejections into DbError::Rule │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`] - Accounts, credentials and profiles
//! - [`VerificationRepository`] - Email verification codes
//! - [`ProductRepository`] - Seller catalog and public shop
//! - [`CartRepository`] - Per-user cart lines
//! - [`OrderRepository`] - Order placement, queries and seller actions
//! - [`ReturnRepository`] - Return/refund flow
//! - [`WalletRepository`] - Wallet ledger
//! - [`AdminRepository`] - Back-office overview

pub mod admin;
pub mod cart;
pub mod order;
pub mod product;
pub mod returns;
pub mod user;
pub mod verification;
pub mod wallet;

pub use admin::AdminRepository;
pub use cart::CartRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use returns::ReturnRepository;
pub use user::UserRepository;
pub use verification::VerificationRepository;
pub use wallet::WalletRepository;
