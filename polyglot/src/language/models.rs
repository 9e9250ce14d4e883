//! Language data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{FieldError, INVALID_VALUE};

/// Language ID type
pub type LanguageId = Uuid;

/// Language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
    pub code: String,
}

/// Body of a create or update request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

/// Listing options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageFilter {
    /// Maximum number of entries returned
    pub limit: Option<i64>,
    /// Number of entries skipped
    pub offset: Option<i64>,
    /// Case-sensitive substring the name must contain
    pub q: Option<String>,
}

/// Parse a path segment into a language id
pub fn parse_language_id(raw: &str) -> Result<LanguageId, FieldError> {
    Uuid::parse_str(raw).map_err(|_| FieldError::new("id", INVALID_VALUE))
}
