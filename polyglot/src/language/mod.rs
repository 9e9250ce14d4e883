//! Languages catalogue: listing, lookup and maintenance of language entries.
//!
//! Each language has a display name and a unique two or three letter code,
//! stored upper-case.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{LanguageError, LanguageResult};
pub use manager::LanguageManager;
pub use models::{Language, LanguageFilter, LanguageId, LanguageInput, parse_language_id};
