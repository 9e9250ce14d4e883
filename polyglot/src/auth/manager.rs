//! Authentication manager implementation.

use std::sync::Arc;

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AuthSession, DEFAULT_ROLE, LoginRequest, NewUser, RegisterRequest, SessionClaims, User,
    },
    password::PasswordHasher,
    token::TokenService,
};
use crate::db::{RoleRepository, StoreError, UserRepository};
use crate::validation::{FieldError, FieldErrors, REQUIRED, char_len, is_valid_email};

pub const USERNAME_NOT_FOUND: &str = "username_not_found";
pub const PASSWORD_NOT_MATCH: &str = "password_not_match";
pub const USERNAME_ALREADY_IN_USE: &str = "username_already_in_use";
pub const EMAIL_ALREADY_IN_USE: &str = "email_already_in_use";

const USERNAME_MIN_LEN: usize = 4;
const USERNAME_MAX_LEN: usize = 20;
const PASSWORD_MIN_LEN: usize = 8;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Credential store
    /// * `roles` - Role lookup, used to assign the default role
    /// * `hasher` - Password hasher
    /// * `tokens` - Token signer/verifier
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            roles,
            hasher,
            tokens,
        }
    }

    /// Create a manager whose users and roles live in the same store
    pub fn with_store<S>(store: Arc<S>, hasher: PasswordHasher, tokens: TokenService) -> Self
    where
        S: UserRepository + RoleRepository + 'static,
    {
        Self::new(store.clone(), store, hasher, tokens)
    }

    /// Register a new user and open a session for it
    ///
    /// # Arguments
    ///
    /// * `request` - Registration request with username, email and password
    ///
    /// # Returns
    ///
    /// * `AuthResult<AuthSession>` - Created user and its token
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Malformed fields, all of them reported
    /// * `AuthError::Conflict` - Username and/or email already registered
    /// * `AuthError::DefaultRoleMissing` - The store has no default role
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthSession> {
        validate_registration(&request).map_err(AuthError::Validation)?;

        // Both checks always run so that both conflicts can be reported.
        let mut conflicts = FieldErrors::new();
        if self.users.username_exists(&request.username).await? {
            conflicts.push("username", USERNAME_ALREADY_IN_USE);
        }
        if self.users.email_exists(&request.email).await? {
            conflicts.push("email", EMAIL_ALREADY_IN_USE);
        }
        conflicts.into_result().map_err(AuthError::Conflict)?;

        let password_hash = self.hasher.hash(&request.password)?;

        let role = self
            .roles
            .find_role_by_name(DEFAULT_ROLE)
            .await?
            .ok_or_else(|| AuthError::DefaultRoleMissing(DEFAULT_ROLE.to_string()))?;

        let user = self
            .users
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                role_id: role.id,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                StoreError::UniqueViolation("username") => {
                    AuthError::Conflict(FieldError::new("username", USERNAME_ALREADY_IN_USE).into())
                }
                StoreError::UniqueViolation("email") => {
                    AuthError::Conflict(FieldError::new("email", EMAIL_ALREADY_IN_USE).into())
                }
                other => AuthError::Store(other),
            })?;

        log::info!("Registered user {} ({})", user.username, user.id);
        self.open_session(user)
    }

    /// Check credentials and open a session
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Username or password missing
    /// * `AuthError::InvalidCredentials` - `username_not_found` or `password_not_match`
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthSession> {
        let mut errors = FieldErrors::new();
        if request.username.is_empty() {
            errors.push("username", REQUIRED);
        }
        if request.password.is_empty() {
            errors.push("password", REQUIRED);
        }
        errors.into_result().map_err(AuthError::Validation)?;

        let credentials = self
            .users
            .find_credentials_by_username(&request.username)
            .await?
            .ok_or_else(|| {
                AuthError::InvalidCredentials(
                    FieldError::new("username", USERNAME_NOT_FOUND).into(),
                )
            })?;

        if !self
            .hasher
            .verify(&request.password, &credentials.password_hash)
        {
            return Err(AuthError::InvalidCredentials(
                FieldError::new("password", PASSWORD_NOT_MATCH).into(),
            ));
        }

        self.open_session(credentials.user)
    }

    /// Resolve a bearer token to the user it was issued for
    ///
    /// Returns `Ok(None)` when the token is invalid or expired, or when its
    /// user no longer exists. Only store failures are errors.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Option<User>> {
        let Some(claims) = self.verify_token(token) else {
            return Ok(None);
        };

        Ok(self.users.find_user_by_id(claims.sub).await?)
    }

    /// Verify a token without touching the store
    pub fn verify_token(&self, token: &str) -> Option<SessionClaims> {
        self.tokens.verify(token)
    }

    fn open_session(&self, user: User) -> AuthResult<AuthSession> {
        let token = self.tokens.issue(&SessionClaims { sub: user.id })?;
        Ok(AuthSession { user, token })
    }
}

/// Collect every registration rule violation
fn validate_registration(request: &RegisterRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let username_len = char_len(&request.username);
    if username_len == 0 {
        errors.push("username", REQUIRED);
    } else if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
        errors.push("username", "username_invalid_length");
    }

    if request.email.is_empty() {
        errors.push("email", REQUIRED);
    } else if !is_valid_email(&request.email) {
        errors.push("email", "email_invalid");
    }

    if request.password.is_empty() {
        errors.push("password", REQUIRED);
    } else if char_len(&request.password) < PASSWORD_MIN_LEN {
        errors.push("password", "password_too_short");
    }

    errors.into_result()
}
