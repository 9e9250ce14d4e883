//! Storage error types.

use thiserror::Error;

/// Credential and catalogue store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A UNIQUE constraint rejected the write; carries the offending field
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    /// A referenced row does not exist
    #[error("Missing reference: {0}")]
    MissingReference(String),
}

impl StoreError {
    /// Translate a driver error, recognising the schema's UNIQUE constraints.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        let field = match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some("users_username_key") => Some("username"),
                    Some("users_email_key") => Some("email"),
                    Some("languages_code_key") => Some("code"),
                    _ => None,
                }
            }
            _ => None,
        };

        match field {
            Some(field) => StoreError::UniqueViolation(field),
            None => StoreError::Database(err),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
