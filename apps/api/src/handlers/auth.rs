//! Signup, email verification and sessions.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use bazaar_core::validation::{normalize_email, validate_verification_code};
use bazaar_core::{CoreError, SignupInput};

use crate::auth::TOKEN_COOKIE;
use crate::error::{ApiError, ApiResult};
use crate::mailer::OutgoingMail;
use crate::security::{generate_verification_code, hash_password, verify_password};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Stores a fresh code and mails it. Returns whether the mail went out;
/// the code stays valid either way so the user can ask for a resend.
async fn send_verification_code(state: &AppState, email: &str) -> ApiResult<bool> {
    let code = generate_verification_code();
    let ttl = state.config.verification_code_ttl_secs;

    state.db.verification_codes().issue(email, &code, ttl).await?;

    match state.mailer.send(OutgoingMail::verification(email, &code, ttl)) {
        Ok(()) => Ok(true),
        Err(e) => {
            warn!(error = %e, "Verification mail not sent");
            Ok(false)
        }
    }
}

#[instrument(name = "handler::signup", skip(state, body), fields(email = %body.email))]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupInput>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    let role = input.validate()?;

    let password_hash = hash_password(&input.password)?;
    let user = state
        .db
        .users()
        .create(&input.into_new_user(role, password_hash))
        .await?;

    let email_sent = send_verification_code(&state, &user.email).await?;

    info!(user_id = %user.id, role = %user.role, "Account created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Account created. Check your email for a verification code.",
        "user_id": user.id,
        "email": user.email,
        "email_sent": email_sent,
    })))
}

#[instrument(name = "handler::verify_email", skip(state, body), fields(email = %body.email))]
pub async fn verify_email(
    state: web::Data<AppState>,
    body: web::Json<VerifyEmailRequest>,
) -> ApiResult<HttpResponse> {
    let email = normalize_email(&body.email);
    let code = body.code.trim();
    validate_verification_code(code)?;

    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await?
        .ok_or(CoreError::InvalidVerificationCode)?;

    if user.is_verified {
        return Err(CoreError::AlreadyVerified.into());
    }

    let user = state
        .db
        .verification_codes()
        .verify_user(&email, code, Utc::now())
        .await?;

    if let Err(e) = state.mailer.send(OutgoingMail::welcome(&user.email, &user.first_name)) {
        warn!(error = %e, "Welcome mail not sent");
    }

    info!(user_id = %user.id, "Email verified");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Email verified. You can now log in.",
        "user": user,
    })))
}

#[instrument(name = "handler::resend_verification", skip(state, body), fields(email = %body.email))]
pub async fn resend_verification(
    state: web::Data<AppState>,
    body: web::Json<ResendVerificationRequest>,
) -> ApiResult<HttpResponse> {
    let email = normalize_email(&body.email);

    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.is_verified {
        return Err(CoreError::AlreadyVerified.into());
    }

    let email_sent = send_verification_code(&state, &user.email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "A new verification code has been sent.",
        "email_sent": email_sent,
    })))
}

#[instrument(name = "handler::login", skip(state, body), fields(email = %body.email))]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let email = normalize_email(&body.email);
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let (user, password_hash) = state
        .db
        .users()
        .credentials_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&password_hash, &body.password)? {
        return Err(invalid());
    }

    if !user.is_verified {
        return Err(CoreError::NotVerified.into());
    }

    let token = state.jwt.generate_token(&user)?;

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(state.jwt.lifetime_secs()))
        .finish();

    info!(user_id = %user.id, role = %user.role, "Logged in");

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "token": token,
        "user": user,
    })))
}

pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": "Logged out" }))
}
