//! HTTP API for the polyglot service.
//!
//! # Modules
//!
//! - [`auth`]: registration, login and the current user
//! - [`languages`]: language catalogue CRUD
//! - [`middleware`]: authentication middleware for protected endpoints
//! - [`request_id`]: request correlation, request logs and HTTP metrics
//! - [`errors`]: mapping of domain errors to status codes and bodies
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health            - Health check (public)
//! POST   /auth/register     - Register user (public)
//! POST   /auth/login        - Login (public)
//! GET    /auth/me           - Current user (auth required)
//! GET    /languages         - List languages (public)
//! GET    /languages/{id}    - Get language (public)
//! POST   /languages         - Create language (auth required)
//! PATCH  /languages/{id}    - Update language (auth required)
//! DELETE /languages/{id}    - Delete language (auth required)
//! ```
//!
//! Any other route answers `404 {"message": "not_found"}`.
//!
//! Language writes need a session. The earlier service accepted anonymous
//! create, update and delete calls; clients relying on that now get `401`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use polyglot::{
//!     auth::{AuthManager, PasswordHasher, TokenService},
//!     db::MemoryStore,
//!     language::LanguageManager,
//! };
//! use polyglot_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::with_store(
//!         store.clone(),
//!         PasswordHasher::new("pepper_pepper_pepper"),
//!         TokenService::new("a_secret_that_is_long_enough_for_hs256"),
//!     )),
//!     language_manager: Arc::new(LanguageManager::new(store)),
//!     database: None,
//! };
//!
//! let app = create_router(state, &[]);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod errors;
pub mod languages;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Json},
    routing::{get, post},
};
use polyglot::{AuthManager, LanguageManager, db::Database};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use errors::ApiError;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub language_manager: Arc<LanguageManager>,
    /// `None` when the managers run on the in-memory store
    pub database: Option<Database>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with managers
/// - `cors_origins`: Allowed origins; empty allows any origin
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/languages", get(languages::list_languages))
        .route("/languages/{id}", get(languages::get_language));

    // Same paths as the public reads, merged per method.
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/languages", post(languages::create_language))
        .route(
            "/languages/{id}",
            axum::routing::patch(languages::update_language)
                .delete(languages::delete_language),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.database {
        Some(db) => db.health_check().await.is_ok(),
        None => true,
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
