//! Password hashing and verification codes.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::{error, instrument};

use crate::error::ApiError;

/// Hashes a plain-text password with Argon2 and a random salt.
#[instrument(name = "security::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Argon2 password hashing failed");
            ApiError::internal("Password hashing failed")
        })
}

/// Checks `password` against a stored Argon2 hash.
///
/// A mismatch is `Ok(false)`; only an unreadable stored hash is an error.
#[instrument(name = "security::verify_password", skip(stored_hash, password), err(Display))]
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "Stored password hash is malformed");
        ApiError::internal("Stored credentials are unreadable")
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "Argon2 password verification failed");
            Err(ApiError::internal("Password verification failed"))
        }
    }
}

/// Six-digit numeric code for email verification.
pub fn generate_verification_code() -> String {
    let n = 100_000 + OsRng.next_u32() % 900_000;
    n.to_string()
}
