use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::response::{accepted, success};

/// 表单中的文件字段名
const FILE_FIELD: &str = "file";

/// POST /api/uploads
///
/// 接受 multipart 表单中的 `file` 字段，返回任务 ID 供轮询。
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let data = field.bytes().await?;

        let job_id = state.uploads.start(data.to_vec(), original_name).await?;

        return Ok(accepted(json!({
            "job_id": job_id,
            "status_url": format!("/api/uploads/{}", job_id),
        })));
    }

    Err(ApiError::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD)))
}

/// GET /api/uploads/:id
pub async fn get_upload_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let status = state
        .uploads
        .status(&job_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Upload job {} not found", job_id)))?;

    Ok(success(status))
}
