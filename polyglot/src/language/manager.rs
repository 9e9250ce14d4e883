//! Language catalogue manager.

use std::sync::Arc;

use super::{
    errors::{LanguageError, LanguageResult},
    models::{Language, LanguageFilter, LanguageId, LanguageInput},
};
use crate::db::{LanguageRepository, StoreError};
use crate::validation::{FieldError, FieldErrors, INVALID_VALUE, REQUIRED, char_len};

/// Reason code for a code held by another language
pub const CODE_ALREADY_EXISTS: &str = "code_already_exists";

const MAX_NAME_LEN: usize = 100;

/// Language catalogue manager
#[derive(Clone)]
pub struct LanguageManager {
    languages: Arc<dyn LanguageRepository>,
}

impl LanguageManager {
    pub fn new(languages: Arc<dyn LanguageRepository>) -> Self {
        Self { languages }
    }

    /// List languages matching `filter`
    ///
    /// # Errors
    ///
    /// * `LanguageError::Validation` - Negative `limit` or `offset`
    pub async fn list(&self, filter: LanguageFilter) -> LanguageResult<Vec<Language>> {
        let mut errors = FieldErrors::new();
        if filter.limit.is_some_and(|l| l < 0) {
            errors.push("limit", INVALID_VALUE);
        }
        if filter.offset.is_some_and(|o| o < 0) {
            errors.push("offset", INVALID_VALUE);
        }
        errors.into_result().map_err(LanguageError::Validation)?;

        let filter = LanguageFilter {
            q: filter.q.filter(|q| !q.is_empty()),
            ..filter
        };
        Ok(self.languages.list_languages(&filter).await?)
    }

    /// Fetch one language
    ///
    /// # Errors
    ///
    /// * `LanguageError::NotFound` - No language with this id
    pub async fn get(&self, id: LanguageId) -> LanguageResult<Language> {
        self.languages
            .find_language(id)
            .await?
            .ok_or(LanguageError::NotFound)
    }

    /// Create a language
    ///
    /// # Errors
    ///
    /// * `LanguageError::Validation` - Missing or malformed name/code
    /// * `LanguageError::Conflict` - Code already used
    pub async fn create(&self, input: LanguageInput) -> LanguageResult<Language> {
        let input = normalize(input)?;

        if self.languages.find_language_by_code(&input.code).await?.is_some() {
            return Err(code_conflict());
        }

        let language = self
            .languages
            .create_language(&input)
            .await
            .map_err(map_store_error)?;

        log::info!("Created language {} ({})", language.code, language.id);
        Ok(language)
    }

    /// Replace the name and code of a language
    ///
    /// # Errors
    ///
    /// * `LanguageError::Validation` - Missing or malformed name/code
    /// * `LanguageError::NotFound` - No language with this id
    /// * `LanguageError::Conflict` - Code used by another language
    pub async fn update(&self, id: LanguageId, input: LanguageInput) -> LanguageResult<Language> {
        let input = normalize(input)?;

        self.get(id).await?;

        let holder = self.languages.find_language_by_code(&input.code).await?;
        if holder.is_some_and(|other| other.id != id) {
            return Err(code_conflict());
        }

        let language = self
            .languages
            .update_language(id, &input)
            .await
            .map_err(map_store_error)?
            .ok_or(LanguageError::NotFound)?;

        log::info!("Updated language {} ({})", language.code, language.id);
        Ok(language)
    }

    /// Delete a language, returning the removed entry
    ///
    /// # Errors
    ///
    /// * `LanguageError::NotFound` - No language with this id
    pub async fn delete(&self, id: LanguageId) -> LanguageResult<Language> {
        let language = self
            .languages
            .delete_language(id)
            .await?
            .ok_or(LanguageError::NotFound)?;

        log::info!("Deleted language {} ({})", language.code, language.id);
        Ok(language)
    }
}

/// Trim both fields, upper-case the code, and check every rule
fn normalize(input: LanguageInput) -> LanguageResult<LanguageInput> {
    let name = input.name.trim().to_string();
    let code = input.code.trim().to_ascii_uppercase();
    let mut errors = FieldErrors::new();

    if name.is_empty() {
        errors.push("name", REQUIRED);
    } else if char_len(&name) > MAX_NAME_LEN {
        errors.push("name", INVALID_VALUE);
    }

    if code.is_empty() {
        errors.push("code", REQUIRED);
    } else if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push("code", INVALID_VALUE);
    }

    errors.into_result().map_err(LanguageError::Validation)?;
    Ok(LanguageInput { name, code })
}

fn code_conflict() -> LanguageError {
    LanguageError::Conflict(FieldError::new("code", CODE_ALREADY_EXISTS).into())
}

fn map_store_error(err: StoreError) -> LanguageError {
    match err {
        StoreError::UniqueViolation("code") => code_conflict(),
        other => LanguageError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, code: &str) -> LanguageInput {
        LanguageInput {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_normalize_uppercases_code() {
        let normalized = normalize(input("  Breton ", "bre")).unwrap();
        assert_eq!(normalized, input("Breton", "BRE"));
    }

    #[test]
    fn test_normalize_reports_every_field() {
        let Err(LanguageError::Validation(errors)) = normalize(input("", "")) else {
            panic!("expected validation error");
        };
        assert!(errors.contains("name", REQUIRED));
        assert!(errors.contains("code", REQUIRED));
    }

    #[test]
    fn test_code_format() {
        for bad in ["1ABC9", "A", "ABCD", "A1", "É"] {
            let Err(LanguageError::Validation(errors)) = normalize(input("Name", bad)) else {
                panic!("{bad} should be rejected");
            };
            assert!(errors.contains("code", INVALID_VALUE), "{bad}");
        }
        assert!(normalize(input("Name", "en")).is_ok());
        assert!(normalize(input("Name", "VDL")).is_ok());
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            normalize(input(&long, "LNG")),
            Err(LanguageError::Validation(_))
        ));
    }
}
