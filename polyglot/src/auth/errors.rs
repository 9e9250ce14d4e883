//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::validation::FieldErrors;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credential store failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token signing failed
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Token expiry falls outside the representable time range
    #[error("Token lifetime of {0}s is out of range")]
    TokenLifetime(i64),

    /// Malformed input, one entry per offending field
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    /// Unknown username or wrong password
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(FieldErrors),

    /// Username and/or email already registered
    #[error("Already in use: {0}")]
    Conflict(FieldErrors),

    /// The role assigned at registration does not exist
    #[error("Default role '{0}' is missing")]
    DefaultRoleMissing(String),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage, hashing and signing failures collapse into one generic message.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(_)
            | AuthError::HashingFailed
            | AuthError::JwtError(_)
            | AuthError::TokenLifetime(_)
            | AuthError::DefaultRoleMissing(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// The field errors carried by input, credential and conflict failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AuthError::Validation(errors)
            | AuthError::InvalidCredentials(errors)
            | AuthError::Conflict(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
