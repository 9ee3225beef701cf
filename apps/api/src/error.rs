//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bazaar                                 │
//! │                                                                         │
//! │  Handler: Result<HttpResponse, ApiError>                               │
//! │       │                                                                 │
//! │       ├── ValidationError ──► CoreError::Validation ──┐                │
//! │       ├── CoreError (rules) ──────────────────────────┤                │
//! │       ├── DbError (NotFound, UniqueViolation, Rule) ──┼──► ApiError    │
//! │       └── auth (token, role) ─────────────────────────┘       │        │
//! │                                                               ▼        │
//! │  ResponseError:  status from code, body {"error", "code"}              │
//! │                  5xx are logged here; clients get a generic message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;

use bazaar_core::{CoreError, ValidationError};
use bazaar_db::DbError;

/// Error returned by every handler.
///
/// ## Serialization
/// ```json
/// { "error": "Cart is empty", "code": "EMPTY_CART" }
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Order placement with an empty cart (400)
    EmptyCart,

    /// Action string not recognised (400)
    UnknownAction,

    /// Wrong or expired verification code (400)
    InvalidVerificationCode,

    /// Verification requested for a verified account (400)
    AlreadyVerified,

    /// Product inactive or out of stock (400)
    ProductUnavailable,

    /// Missing/invalid token or bad credentials (401)
    Unauthorized,

    /// Account email not verified (401)
    NotVerified,

    /// Authenticated but wrong role (403)
    Forbidden,

    /// Resource not found or not owned (404)
    NotFound,

    /// Duplicate resource (409)
    Conflict,

    /// Status change not allowed from the current state (409)
    InvalidTransition,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError
            | ErrorCode::EmptyCart
            | ErrorCode::UnknownAction
            | ErrorCode::InvalidVerificationCode
            | ErrorCode::AlreadyVerified
            | ErrorCode::ProductUnavailable => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized | ErrorCode::NotVerified => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict | ErrorCode::InvalidTransition => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // The real cause was logged where the error was converted.
        let message = if status.is_server_error() {
            "An internal error occurred"
        } else {
            self.message.as_str()
        };

        HttpResponse::build(status).json(json!({
            "error": message,
            "code": self.code,
        }))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts business rule errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::ReturnAlreadyExists(_) => ErrorCode::Conflict,
            CoreError::ProductUnavailable(_) => ErrorCode::ProductUnavailable,
            CoreError::NotVerified => ErrorCode::NotVerified,
            CoreError::AlreadyVerified => ErrorCode::AlreadyVerified,
            CoreError::InvalidVerificationCode => ErrorCode::InvalidVerificationCode,
            CoreError::UnknownAction { .. } => ErrorCode::UnknownAction,
            CoreError::AmountOverflow => ErrorCode::ValidationError,
            CoreError::Validation(inner) => {
                return ApiError::validation(inner.to_string());
            }
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rule(core) => core.into(),
            DbError::NotFound { entity, .. } => ApiError::not_found(format!("{entity} not found")),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{field} '{value}' already exists"),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(error = %message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
