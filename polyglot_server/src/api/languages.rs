//! Language catalogue API handlers.
//!
//! Reads are public; writes sit behind the auth middleware. Ids in the path
//! must be UUIDs, otherwise the request fails with a field error on `id`.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use polyglot::language::{Language, LanguageFilter, LanguageInput, parse_language_id};

use super::{AppState, errors::ApiResult};

/// List languages ordered by name.
///
/// # Query Parameters
///
/// - `limit`, `offset`: non-negative integers
/// - `q`: case-sensitive substring of the name
pub async fn list_languages(
    State(state): State<AppState>,
    filter: Result<Query<LanguageFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Language>>> {
    let Query(filter) = filter?;
    Ok(Json(state.language_manager.list(filter).await?))
}

pub async fn get_language(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Language>> {
    let id = parse_language_id(&id)?;
    Ok(Json(state.language_manager.get(id).await?))
}

/// Create a language; the code is stored upper-case.
///
/// # Errors
///
/// - `400 Bad Request`: name or code missing or malformed
/// - `422 Unprocessable Entity`: `code_already_exists`
pub async fn create_language(
    State(state): State<AppState>,
    payload: Result<Json<LanguageInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Language>)> {
    let Json(input) = payload?;
    let language = state.language_manager.create(input).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// Replace the name and code of a language.
pub async fn update_language(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LanguageInput>, JsonRejection>,
) -> ApiResult<Json<Language>> {
    let id = parse_language_id(&id)?;
    let Json(input) = payload?;
    Ok(Json(state.language_manager.update(id, input).await?))
}

/// Delete a language and return it.
pub async fn delete_language(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Language>> {
    let id = parse_language_id(&id)?;
    Ok(Json(state.language_manager.delete(id).await?))
}
