//! # Polyglot
//!
//! Accounts, roles and a catalogue of languages behind token authentication.
//!
//! The crate holds the domain side of the service. HTTP concerns live in the
//! `polyglot_server` crate, which wires these managers into an axum router.
//!
//! ## Core Modules
//!
//! - [`auth`]: password hashing, signed tokens, login/registration flows
//! - [`language`]: CRUD over the languages catalogue
//! - [`db`]: connection pool, repository traits, PostgreSQL and in-memory stores
//! - [`validation`]: field-scoped errors shared by every flow
//!
//! ## Example
//!
//! ```
//! use polyglot::auth::{AuthManager, PasswordHasher, RegisterRequest, TokenService};
//! use polyglot::db::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let auth = AuthManager::with_store(
//!     store,
//!     PasswordHasher::new("pepper"),
//!     TokenService::new("a_secret_that_is_long_enough_for_hs256"),
//! );
//!
//! let session = auth
//!     .register(RegisterRequest {
//!         username: "alice1234".to_string(),
//!         email: "a@a.com".to_string(),
//!         password: "longpassword".to_string(),
//!     })
//!     .await?;
//! assert_eq!(session.user.username, "alice1234");
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod db;
pub mod language;
pub mod validation;

pub use auth::{AuthManager, User};
pub use language::{Language, LanguageManager};
pub use validation::{FieldError, FieldErrors};
