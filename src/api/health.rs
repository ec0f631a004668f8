use axum::{
    extract::State,
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::response::success;
use crate::services::indicators;

/// 健康检查端点
pub async fn health_check(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    // 检查数据库连接
    state.database.verify_integrity().await
        .map_err(|e| {
            tracing::error!("Health check failed: {}", e);
            ApiError::Database("Database connection failed".to_string())
        })?;

    let stats = state.database.get_stats().await
        .map_err(|e| ApiError::Internal(format!("Failed to get database stats: {}", e)))?;

    Ok(success(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "database": "connected",
        "vehicle_count": stats.vehicle_count,
        "database_size_mb": stats.database_size_mb(),
    })))
}

/// 今日访客数
pub async fn visitors() -> ApiResult<impl IntoResponse> {
    let today = chrono::Utc::now().date_naive();

    Ok(success(json!({
        "date": today,
        "visitors": indicators::visitor_count(today),
    })))
}
