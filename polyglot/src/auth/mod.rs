//! Authentication module providing registration, login and token checks.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - HS256 JWT session tokens (one hour expiry by default)
//! - Field-scoped validation and conflict errors
//!
//! ## Example
//!
//! ```no_run
//! use polyglot::auth::{AuthManager, LoginRequest, PasswordHasher, TokenService};
//! use polyglot::db::{Database, DatabaseConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::default()).await?;
//!     let auth = AuthManager::with_store(
//!         Arc::new(db.store()),
//!         PasswordHasher::new("secret_pepper"),
//!         TokenService::new("jwt_secret_jwt_secret_jwt_secret"),
//!     );
//!
//!     let session = auth
//!         .login(LoginRequest {
//!             username: "alice1234".to_string(),
//!             password: "longpassword".to_string(),
//!         })
//!         .await?;
//!     println!("Logged in as {}", session.user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use manager::{
    AuthManager, EMAIL_ALREADY_IN_USE, PASSWORD_NOT_MATCH, USERNAME_ALREADY_IN_USE,
    USERNAME_NOT_FOUND,
};
pub use models::{
    AuthSession, Credentials, DEFAULT_ROLE, LoginRequest, NewUser, RegisterRequest, Role, RoleId,
    SessionClaims, User, UserId,
};
pub use password::PasswordHasher;
pub use token::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, TokenService};
