use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use bazaar_core::validation::{validate_quantity, validate_required};
use bazaar_core::CartSummary;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

async fn summary(state: &AppState, user_id: &str) -> ApiResult<CartSummary> {
    let lines = state.db.cart().lines(user_id).await?;
    Ok(CartSummary::from_lines(lines)?)
}

#[instrument(name = "handler::get_cart", skip(state, user), fields(user_id = %user.id))]
pub async fn get_cart(state: web::Data<AppState>, user: AuthUser) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(summary(&state, &user.id).await?))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(state, user, body),
    fields(user_id = %user.id, product_id = %body.product_id, quantity = body.quantity)
)]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<AddToCartRequest>,
) -> ApiResult<HttpResponse> {
    validate_required("product_id", &body.product_id)?;
    validate_quantity(body.quantity)?;

    let line = state
        .db
        .cart()
        .add(&user.id, body.product_id.trim(), body.quantity)
        .await?;
    info!(cart_item_id = %line.id, "Added to cart");

    let cart = summary(&state, &user.id).await?;
    Ok(HttpResponse::Created().json(json!({
        "item": line,
        "cart": cart,
    })))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(state, user, body),
    fields(user_id = %user.id, item_id = %item_id, quantity = body.quantity)
)]
pub async fn update_cart_item(
    state: web::Data<AppState>,
    user: AuthUser,
    item_id: web::Path<String>,
    body: web::Json<UpdateQuantityRequest>,
) -> ApiResult<HttpResponse> {
    validate_quantity(body.quantity)?;

    state
        .db
        .cart()
        .update_quantity(&user.id, &item_id, body.quantity)
        .await?;

    Ok(HttpResponse::Ok().json(summary(&state, &user.id).await?))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(state, user),
    fields(user_id = %user.id, item_id = %item_id)
)]
pub async fn remove_cart_item(
    state: web::Data<AppState>,
    user: AuthUser,
    item_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.db.cart().remove(&user.id, &item_id).await?;
    Ok(HttpResponse::Ok().json(summary(&state, &user.id).await?))
}
