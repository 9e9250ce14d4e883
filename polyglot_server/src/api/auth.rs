//! Authentication API handlers.
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8080/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice1234", "email": "a@a.com", "password": "longpassword"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice1234", "password": "longpassword"}'
//! ```
//!
//! Both return `{"user": {...}, "token": "..."}`; the token goes in an
//! `Authorization: Bearer` header or a `token` cookie on later requests.

use axum::{
    Json,
    extract::{Extension, State, rejection::JsonRejection},
    http::StatusCode,
};
use polyglot::{
    User,
    auth::{AuthError, AuthSession, LoginRequest, RegisterRequest},
};

use super::{
    AppState,
    errors::{ApiError, ApiResult},
    middleware::CurrentUser,
    request_id::RequestId,
};
use crate::{logging::log_security_event, metrics};

/// Register a new user account and open a session for it.
///
/// # Response
///
/// `201 Created` with the user (no password material) and a token.
///
/// # Errors
///
/// - `400 Bad Request`: malformed body or invalid fields, one entry per field
/// - `422 Unprocessable Entity`: `username_already_in_use` and/or `email_already_in_use`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    let Json(request) = payload?;

    match state.auth_manager.register(request).await {
        Ok(session) => {
            metrics::registrations_total(true);
            Ok((StatusCode::CREATED, Json(session)))
        }
        Err(e) => {
            metrics::registrations_total(false);
            Err(e.into())
        }
    }
}

/// Check credentials and open a session.
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, `username_not_found` or `password_not_match`
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthSession>> {
    let Json(request) = payload?;
    let username = request.username.clone();

    match state.auth_manager.login(request).await {
        Ok(session) => {
            metrics::login_attempts_total(true);
            Ok(Json(session))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            if let AuthError::InvalidCredentials(errors) = &e {
                log_security_event(
                    "failed_login",
                    Some(&username),
                    Some(request_id.as_str()),
                    &errors.to_string(),
                );
            }
            Err(ApiError::from(e))
        }
    }
}

/// Return the user the request was authenticated as.
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}
