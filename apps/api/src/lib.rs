//! # Bazaar API
//!
//! REST server for the marketplace.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Path                                    │
//! │                                                                         │
//! │  HTTP ──► TracingLogger ──► routes (/api/...) ──► handler               │
//! │                                                     │                   │
//! │                      extractors: AuthUser / SellerUser / AdminUser      │
//! │                      (cookie `token` or Authorization: Bearer)          │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                   bazaar-db repository (one call)       │
//! │                                                     │                   │
//! │                         ApiError ◄── DbError / CoreError                │
//! │                         {"error", "code"} + status                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Every field can be set with a `BAZAAR_`
//! environment variable, e.g. `BAZAAR_PORT`, `BAZAAR_DATABASE_PATH`,
//! `BAZAAR_JWT_SECRET`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod routes;
pub mod security;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
