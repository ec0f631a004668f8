use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::response::success;
use super::vehicles::find_vehicle;
use crate::models::Language;
use crate::services::preferences::is_valid_session;

#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub vehicle_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetLanguageRequest {
    pub language: String,
}

fn check_session(session: &str) -> ApiResult<()> {
    if !is_valid_session(session) {
        return Err(ApiError::BadRequest("Invalid session id".to_string()));
    }
    Ok(())
}

/// GET /api/favorites/:session
pub async fn get_favorites(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<impl IntoResponse> {
    check_session(&session)?;

    let favorites = state.preferences.favorites(&session).await
        .map_err(|e| {
            tracing::error!("Failed to load favorites: {}", e);
            ApiError::Database("Failed to load favorites".to_string())
        })?;

    Ok(success(json!({ "favorites": favorites })))
}

/// POST /api/favorites/:session
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<ToggleFavoriteRequest>,
) -> ApiResult<impl IntoResponse> {
    check_session(&session)?;
    let vehicle = find_vehicle(&state, payload.vehicle_id.trim()).await?;

    let toggle = state.preferences.toggle_favorite(&session, &vehicle.id).await
        .map_err(|e| {
            tracing::error!("Failed to toggle favorite: {}", e);
            ApiError::Database("Failed to update favorites".to_string())
        })?;

    Ok(success(toggle))
}

/// GET /api/preferences/:session/language
pub async fn get_language(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<impl IntoResponse> {
    check_session(&session)?;

    let language = state.preferences.language(&session).await
        .map_err(|e| {
            tracing::error!("Failed to load language: {}", e);
            ApiError::Database("Failed to load language".to_string())
        })?;

    Ok(success(json!({ "language": language })))
}

/// PUT /api/preferences/:session/language
pub async fn set_language(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<SetLanguageRequest>,
) -> ApiResult<impl IntoResponse> {
    check_session(&session)?;
    let language: Language = payload.language.parse().map_err(ApiError::Validation)?;

    state.preferences.set_language(&session, language).await
        .map_err(|e| {
            tracing::error!("Failed to save language: {}", e);
            ApiError::Database("Failed to save language".to_string())
        })?;

    Ok(success(json!({ "language": language })))
}
