//! Public catalog. No authentication.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::error::ApiResult;
use crate::state::AppState;

#[instrument(name = "handler::shop_products", skip(state))]
pub async fn list_products(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let products = state.db.products().list_shop().await?;
    Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::shop_product", skip(state), fields(product_id = %product_id))]
pub async fn get_product(
    state: web::Data<AppState>,
    product_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let product = state.db.products().get_shop(&product_id).await?;
    Ok(HttpResponse::Ok().json(product))
}
