//! The caller's own profile and wallet.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use bazaar_core::ProfileUpdate;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[instrument(name = "handler::me", skip(state, user), fields(user_id = %user.id))]
pub async fn me(state: web::Data<AppState>, user: AuthUser) -> ApiResult<HttpResponse> {
    let profile = state
        .db
        .users()
        .get_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::update_me", skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_me(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<ProfileUpdate>,
) -> ApiResult<HttpResponse> {
    body.validate(user.role)?;

    let profile = state.db.users().update_profile(&user.id, &body).await?;
    info!("Profile updated");

    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(name = "handler::wallet", skip(state, user), fields(user_id = %user.id))]
pub async fn wallet(state: web::Data<AppState>, user: AuthUser) -> ApiResult<HttpResponse> {
    let wallet = state.db.wallet();
    let balance = wallet.balance(&user.id).await?;
    let credits = wallet.credits(&user.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "balance_cents": balance.cents(),
        "credits": credits,
    })))
}
