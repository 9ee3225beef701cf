use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[instrument(name = "handler::admin_data", skip(state, admin), fields(admin_id = %admin.0.id))]
pub async fn admin_data(state: web::Data<AppState>, admin: AdminUser) -> ApiResult<HttpResponse> {
    let overview = state.db.admin().overview().await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[instrument(
    name = "handler::admin_delete_product",
    skip(state, admin),
    fields(admin_id = %admin.0.id, product_id = %product_id)
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    admin: AdminUser,
    product_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.db.products().admin_delete(&product_id).await?;
    info!("Product removed by admin");
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted" })))
}
