use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::response::success;
use super::vehicles::{find_vehicle, LangParams};
use crate::models::Language;
use crate::services::seo;

/// GET /api/seo/pages/:slug
pub async fn page_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<LangParams>,
) -> ApiResult<impl IntoResponse> {
    let lang = Language::from_code_or_default(params.lang.as_deref());

    let metadata = seo::page_metadata(&state.config, &slug, lang)
        .ok_or_else(|| ApiError::NotFound(format!("Page {} not found", slug)))?;

    Ok(success(metadata))
}

/// GET /api/seo/vehicles/:id
pub async fn vehicle_seo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> ApiResult<impl IntoResponse> {
    let vehicle = find_vehicle(&state, &id).await?;
    let lang = Language::from_code_or_default(params.lang.as_deref());

    Ok(success(json!({
        "metadata": seo::vehicle_metadata(&state.config, &vehicle, lang),
        "schema": seo::vehicle_schema(&state.config, &vehicle, lang),
        "breadcrumbs": seo::vehicle_breadcrumbs(&state.config, &vehicle, lang),
    })))
}

/// GET /api/seo/organization
pub async fn organization(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    Ok(success(seo::organization_schema(&state.config)))
}

/// GET /sitemap.xml
pub async fn sitemap(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let fleet = state.catalog.fleet(None).await
        .map_err(|e| {
            tracing::error!("Failed to load fleet for sitemap: {}", e);
            ApiError::Database("Failed to build sitemap".to_string())
        })?;

    let xml = seo::sitemap_xml(&state.config, fleet.as_slice())
        .map_err(|e| {
            tracing::error!("Failed to write sitemap: {}", e);
            ApiError::Internal("Failed to build sitemap".to_string())
        })?;

    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}
