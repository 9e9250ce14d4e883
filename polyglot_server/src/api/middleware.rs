//! Authentication middleware for protected endpoints.
//!
//! The middleware reads a session token from the `token` cookie or, failing
//! that, from the `Authorization: Bearer` header, resolves it to a user and
//! injects a [`CurrentUser`] into request extensions for downstream handlers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use polyglot_server::api::middleware::auth_middleware;
//! # use polyglot_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
//!     .with_state(state);
//! # let _ = protected_routes;
//! ```
//!
//! # Extracting the user
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use polyglot_server::api::middleware::CurrentUser;
//!
//! async fn protected_handler(Extension(current): Extension<CurrentUser>) -> String {
//!     format!("Authenticated as {}", current.user.username)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::Next,
    response::Response,
};
use polyglot::User;
use serde::Serialize;

use super::{AppState, errors::ApiError, request_id::RequestId};
use crate::{logging::log_security_event, metrics};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Identity attached to authenticated requests
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user: User,
    pub authenticated: bool,
}

/// Find the session token, the cookie taking precedence over the header
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that resolves the session token to a user.
///
/// # Behavior
///
/// - **Success**: injects [`CurrentUser`] and calls the next handler
/// - **Missing token**: `401 Unauthorized`
/// - **Invalid/expired token**: `401 Unauthorized`
/// - **Token for a deleted user**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_owned());

    let reject = |reason: &str| {
        metrics::rejected_requests_total();
        log_security_event("rejected_token", None, request_id.as_deref(), reason);
        ApiError::Unauthenticated
    };

    let Some(token) = extract_token(request.headers()) else {
        return Err(reject("No session token"));
    };

    let user = state
        .auth_manager
        .authenticate(token)
        .await
        .map_err(ApiError::from)?;

    let Some(user) = user else {
        return Err(reject("Invalid or expired session token"));
    };

    request.extensions_mut().insert(CurrentUser {
        user,
        authenticated: true,
    });
    Ok(next.run(request).await)
}
