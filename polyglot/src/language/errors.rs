//! Language catalogue error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::validation::FieldErrors;

/// Language catalogue errors
#[derive(Debug, Error)]
pub enum LanguageError {
    /// Store failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Malformed input
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    /// No language with the requested id
    #[error("Language not found")]
    NotFound,

    /// Code already used by another language
    #[error("Already in use: {0}")]
    Conflict(FieldErrors),
}

/// Result type for language operations
pub type LanguageResult<T> = Result<T, LanguageError>;
