//! Authentication error types.

use thiserror::Error;
use warden_core::error::WardenError;

/// Public message for any failed username/password check.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => WardenError::unauthorized(INVALID_CREDENTIALS),
            AuthError::InvalidToken(_) => WardenError::unauthorized("Invalid or expired token"),
            AuthError::Configuration(_) | AuthError::Crypto(_) => {
                WardenError::internal(err.to_string())
            }
        }
    }
}
