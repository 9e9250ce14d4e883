//! Mapping from domain errors to HTTP responses.
//!
//! | Error            | Status | Body                                  |
//! |------------------|--------|---------------------------------------|
//! | `Validation`     | 400    | `{"errors": [{"field", "reason"}]}`   |
//! | `Conflict`       | 422    | `{"errors": [{"field", "reason"}]}`   |
//! | `Unauthenticated`| 401    | `{"message": "unauthenticated"}`      |
//! | `NotFound`       | 404    | `{"message": "not_found"}`            |
//! | `Internal`       | 500    | `{"message": "server_error"}`         |

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use polyglot::{
    FieldError, FieldErrors,
    auth::AuthError,
    language::LanguageError,
    validation::INVALID_VALUE,
};
use serde::Serialize;

/// Every failure a handler can answer with
#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    Conflict(FieldErrors),
    Unauthenticated,
    NotFound,
    /// The message is logged, never returned
    Internal(String),
}

#[derive(Serialize)]
struct ErrorsBody<'a> {
    errors: &'a FieldErrors,
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) | ApiError::Conflict(errors) => {
                (status, Json(ErrorsBody { errors: &errors })).into_response()
            }
            ApiError::Unauthenticated => (
                status,
                Json(MessageBody {
                    message: "unauthenticated",
                }),
            )
                .into_response(),
            ApiError::NotFound => (
                status,
                Json(MessageBody {
                    message: "not_found",
                }),
            )
                .into_response(),
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "Request failed with an internal error");
                (
                    status,
                    Json(MessageBody {
                        message: "server_error",
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Login failures are input errors, not authentication state.
            AuthError::Validation(errors) | AuthError::InvalidCredentials(errors) => {
                ApiError::Validation(errors)
            }
            AuthError::Conflict(errors) => ApiError::Conflict(errors),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LanguageError> for ApiError {
    fn from(err: LanguageError) -> Self {
        match err {
            LanguageError::Validation(errors) => ApiError::Validation(errors),
            LanguageError::Conflict(errors) => ApiError::Conflict(errors),
            LanguageError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        ApiError::Validation(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        FieldError::new("body", INVALID_VALUE).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected query string");
        FieldError::new("query", INVALID_VALUE).into()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
