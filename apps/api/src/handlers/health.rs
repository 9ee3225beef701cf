use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let database = if state.db.health_check().await {
        "connected"
    } else {
        "unavailable"
    };

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "database": database,
    }))
}
