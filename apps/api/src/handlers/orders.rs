//! Buyer-side orders and returns.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub delivery_address: String,
}

#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    #[serde(default)]
    pub return_reason: String,
}

#[instrument(name = "handler::list_orders", skip(state, user), fields(user_id = %user.id))]
pub async fn list_orders(state: web::Data<AppState>, user: AuthUser) -> ApiResult<HttpResponse> {
    let orders = state.db.orders().list_for_buyer(&user.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::place_order", skip(state, user, body), fields(user_id = %user.id))]
pub async fn place_order(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<PlaceOrderRequest>,
) -> ApiResult<HttpResponse> {
    let order = state
        .db
        .orders()
        .place_order(&user.id, &body.delivery_address)
        .await?;

    info!(order_id = %order.id, order_number = %order.order_number, "Order placed");
    Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::order_history", skip(state, user), fields(user_id = %user.id))]
pub async fn order_history(state: web::Data<AppState>, user: AuthUser) -> ApiResult<HttpResponse> {
    let history = state.db.orders().history(&user.id).await?;
    Ok(HttpResponse::Ok().json(history))
}

#[instrument(
    name = "handler::get_order",
    skip(state, user),
    fields(user_id = %user.id, order_id = %order_id)
)]
pub async fn get_order(
    state: web::Data<AppState>,
    user: AuthUser,
    order_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let detail = state.db.orders().get_for_buyer(&user.id, &order_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[instrument(
    name = "handler::request_return",
    skip(state, user, body),
    fields(user_id = %user.id, order_id = %order_id)
)]
pub async fn request_return(
    state: web::Data<AppState>,
    user: AuthUser,
    order_id: web::Path<String>,
    body: web::Json<ReturnRequest>,
) -> ApiResult<HttpResponse> {
    let return_order = state
        .db
        .returns()
        .request_return(&user.id, &order_id, &body.return_reason)
        .await?;

    Ok(HttpResponse::Created().json(return_order))
}

#[instrument(
    name = "handler::mark_return_delivered",
    skip(state, user),
    fields(user_id = %user.id, order_id = %order_id)
)]
pub async fn mark_return_delivered(
    state: web::Data<AppState>,
    user: AuthUser,
    order_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let return_order = state
        .db
        .returns()
        .mark_return_delivered(&user.id, &order_id)
        .await?;

    Ok(HttpResponse::Ok().json(return_order))
}
