//! Error types for the authentication service.

use thiserror::Error;

use crate::error::AppError;
use crate::store::StoreError;

use super::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password did not match.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Token issue/validation failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing failed.
    #[error("hash error: {0}")]
    Hash(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A user with the same email already exists.
    #[error("a user with email '{0}' already exists")]
    EmailTaken(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::Token(_) => {
                Self::Unauthorized("invalid credentials".to_owned())
            }
            AuthError::EmailTaken(email) => {
                Self::BadRequest(format!("a user with email '{email}' already exists"))
            }
            AuthError::Store(e) => Self::Store(e),
            AuthError::Hash(detail) => Self::Internal(detail),
        }
    }
}
