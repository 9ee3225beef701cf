//! Seller dashboard: fulfillment, return resolution and listings.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use bazaar_core::{NewProduct, OrderStatus, ProductPatch, ReturnAction, SellerAction};

use crate::auth::SellerUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SellerOrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderActionRequest {
    pub order_id: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct ReturnActionRequest {
    pub action: String,
}

#[instrument(
    name = "handler::seller_orders",
    skip(state, seller, query),
    fields(seller_id = %seller.0.id, status = ?query.status)
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    seller: SellerUser,
    query: web::Query<SellerOrdersQuery>,
) -> ApiResult<HttpResponse> {
    // "all" and an empty value both mean no filter
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let orders = state.db.orders().list_for_seller(&seller.0.id, status).await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
    name = "handler::update_order_status",
    skip(state, seller, body),
    fields(seller_id = %seller.0.id, order_id = %body.order_id, action = %body.action)
)]
pub async fn update_order_status(
    state: web::Data<AppState>,
    seller: SellerUser,
    body: web::Json<OrderActionRequest>,
) -> ApiResult<HttpResponse> {
    let action: SellerAction = body.action.parse()?;

    let order = state
        .db
        .orders()
        .apply_seller_action(&seller.0.id, &body.order_id, action)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Order {} is now {}", order.order_number, order.status),
        "order": order,
    })))
}

#[instrument(
    name = "handler::resolve_return",
    skip(state, seller, body),
    fields(seller_id = %seller.0.id, order_id = %order_id, action = %body.action)
)]
pub async fn resolve_return(
    state: web::Data<AppState>,
    seller: SellerUser,
    order_id: web::Path<String>,
    body: web::Json<ReturnActionRequest>,
) -> ApiResult<HttpResponse> {
    let action = ReturnAction::parse_resolution(&body.action)?;

    let return_order = state
        .db
        .returns()
        .resolve_return(&seller.0.id, &order_id, action)
        .await?;

    Ok(HttpResponse::Ok().json(return_order))
}

#[instrument(name = "handler::seller_products", skip(state, seller), fields(seller_id = %seller.0.id))]
pub async fn list_products(
    state: web::Data<AppState>,
    seller: SellerUser,
) -> ApiResult<HttpResponse> {
    let products = state.db.products().list_by_seller(&seller.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(
    name = "handler::create_product",
    skip(state, seller, body),
    fields(seller_id = %seller.0.id, name = %body.name)
)]
pub async fn create_product(
    state: web::Data<AppState>,
    seller: SellerUser,
    body: web::Json<NewProduct>,
) -> ApiResult<HttpResponse> {
    let product = state.db.products().create(&seller.0.id, &body).await?;
    info!(product_id = %product.id, product_code = %product.product_code, "Product listed");

    Ok(HttpResponse::Created().json(product))
}

#[instrument(
    name = "handler::update_product",
    skip(state, seller, body),
    fields(seller_id = %seller.0.id, product_id = %product_id)
)]
pub async fn update_product(
    state: web::Data<AppState>,
    seller: SellerUser,
    product_id: web::Path<String>,
    body: web::Json<ProductPatch>,
) -> ApiResult<HttpResponse> {
    let product = state
        .db
        .products()
        .update(&seller.0.id, &product_id, &body)
        .await?;

    Ok(HttpResponse::Ok().json(product))
}

#[instrument(
    name = "handler::delete_product",
    skip(state, seller),
    fields(seller_id = %seller.0.id, product_id = %product_id)
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    seller: SellerUser,
    product_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.db.products().delete(&seller.0.id, &product_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted" })))
}
