//! HTTP handlers, one module per resource.
//!
//! Handlers parse the request, check who is calling, call one repository
//! operation and shape the JSON response. Business rules live in
//! bazaar-core and bazaar-db.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod seller;
pub mod shop;
