//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures (wraps CoreError as Rule)    │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError         - What HTTP clients see (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Order placement was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A status change is not allowed from the order's current state.
    ///
    /// ## When This Occurs
    /// ```text
    /// accept  on confirmed      → InvalidTransition
    /// deliver on pending        → InvalidTransition
    /// confirm on return "requested" (not yet delivered back)
    /// a second writer loses the conditional UPDATE race
    /// ```
    #[error("Cannot {action} {entity} {id} while it is {current}")]
    InvalidTransition {
        entity: String,
        id: String,
        action: String,
        current: String,
    },

    /// A return already exists for this order.
    #[error("A return has already been requested for order {0}")]
    ReturnAlreadyExists(String),

    /// Product exists but cannot be bought right now.
    #[error("Product {0} is not available for purchase")]
    ProductUnavailable(String),

    /// Account has not confirmed its email address.
    #[error("Email address has not been verified")]
    NotVerified,

    /// Account email is already verified.
    #[error("Email is already verified")]
    AlreadyVerified,

    /// Verification code is wrong or expired.
    #[error("Invalid or expired verification code")]
    InvalidVerificationCode,

    /// Action string is not one of the known actions.
    #[error("Unknown action '{action}', expected one of: {allowed}")]
    UnknownAction { action: String, allowed: String },

    /// A money calculation left the representable range.
    #[error("Amount is too large")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidTransition error.
    pub fn invalid_transition(
        entity: impl Into<String>,
        id: impl Into<String>,
        action: impl Into<String>,
        current: impl Into<String>,
    ) -> Self {
        CoreError::InvalidTransition {
            entity: entity.into(),
            id: id.into(),
            action: action.into(),
            current: current.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
