use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::response::{created, success, success_message};
use crate::catalog::{normalize_page_size, SortOption};
use crate::models::{CreateVehicleRequest, Language, OperationState, Vehicle, VehicleKind, VehicleResponse};
use crate::services::booking::{quick_booking_url, quick_booking_url_for};
use crate::services::catalog_service::to_response;
use crate::services::indicators;
use crate::services::CatalogQuery;

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListParams {
    pub q: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub year: Option<i32>,
    pub class: Option<String>,
    pub kind: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub lang: Option<String>,
}

impl VehicleListParams {
    /// 解析为目录查询；无法识别的类型或排序返回 400
    fn into_query(self) -> ApiResult<CatalogQuery> {
        let kind = parse_kind(self.kind.as_deref())?;

        let sort = match non_empty(self.sort) {
            Some(sort) => sort.parse::<SortOption>().map_err(ApiError::BadRequest)?,
            None => SortOption::default(),
        };

        Ok(CatalogQuery {
            kind,
            search_text: non_empty(self.q),
            price_min: self.price_min,
            price_max: self.price_max,
            year: self.year,
            category: non_empty(self.class).map(|c| c.to_lowercase()),
            sort,
            page: self.page.unwrap_or(1),
            per_page: normalize_page_size(self.per_page),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct KindParams {
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LangParams {
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SetImageRequest {
    pub upload_id: String,
}

/// 车辆详情（列表条目同样使用），附带快速预订链接
#[derive(Debug, Serialize)]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: VehicleResponse,
    pub booking_url: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_kind(kind: Option<&str>) -> ApiResult<Option<VehicleKind>> {
    match kind.map(str::trim).filter(|k| !k.is_empty()) {
        Some(kind) => kind
            .to_lowercase()
            .parse::<VehicleKind>()
            .map(Some)
            .map_err(ApiError::BadRequest),
        None => Ok(None),
    }
}

/// 按 ID 或 slug 查找车辆，不存在时返回 404
pub(crate) async fn find_vehicle(state: &AppState, id_or_slug: &str) -> ApiResult<Vehicle> {
    state.catalog.get_vehicle(id_or_slug).await
        .map_err(|e| {
            tracing::error!("Failed to get vehicle {}: {}", id_or_slug, e);
            ApiError::Database("Failed to retrieve vehicle".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Vehicle {} not found", id_or_slug)))
}

/// GET /api/vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<VehicleListParams>,
) -> ApiResult<impl IntoResponse> {
    let lang = Language::from_code_or_default(params.lang.as_deref());
    let query = params.into_query()?;

    let page = state.catalog.list_page(&query).await
        .map_err(|e| {
            tracing::error!("Failed to list vehicles: {}", e);
            ApiError::Database("Failed to retrieve vehicles".to_string())
        })?;

    let booking_phone = &state.config.booking_phone;
    let page = page.map_items(|vehicle| VehicleDetail {
        booking_url: quick_booking_url_for(booking_phone, &vehicle.name, lang),
        vehicle,
    });

    Ok(success(page))
}

/// GET /api/vehicles/filters
pub async fn get_filter_options(
    State(state): State<AppState>,
    Query(params): Query<KindParams>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(params.kind.as_deref())?;

    let options = state.catalog.filter_options(kind).await
        .map_err(|e| {
            tracing::error!("Failed to get filter options: {}", e);
            ApiError::Database("Failed to retrieve filter options".to_string())
        })?;

    Ok(success(options))
}

/// GET /api/vehicles/:id
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> ApiResult<impl IntoResponse> {
    let vehicle = find_vehicle(&state, &id).await?;
    let lang = Language::from_code_or_default(params.lang.as_deref());
    let booking_url = quick_booking_url(&state.config.booking_phone, &vehicle, lang);

    Ok(success(VehicleDetail {
        vehicle: to_response(vehicle),
        booking_url,
    }))
}

/// POST /api/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> ApiResult<impl IntoResponse> {
    let vehicle = Vehicle::from_create_request(payload)?;

    let vehicle = state.catalog.create_vehicle(vehicle).await
        .map_err(|e| {
            tracing::error!("Failed to create vehicle: {}", e);
            if e.to_string().contains("UNIQUE") {
                ApiError::Conflict("Vehicle already exists".to_string())
            } else {
                ApiError::Database("Failed to create vehicle".to_string())
            }
        })?;

    Ok(created(to_response(vehicle), "Vehicle created"))
}

/// DELETE /api/vehicles/:id
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.catalog.delete_vehicle(&id).await
        .map_err(|e| {
            tracing::error!("Failed to delete vehicle {}: {}", id, e);
            ApiError::Database("Failed to delete vehicle".to_string())
        })?;

    if !deleted {
        return Err(ApiError::NotFound(format!("Vehicle {} not found", id)));
    }

    Ok(success_message("Vehicle deleted successfully"))
}

/// PUT /api/vehicles/:id/image
///
/// `upload_id` 可以是上传任务 ID，也可以是已保存图片的 ID。
pub async fn set_vehicle_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SetImageRequest>,
) -> ApiResult<impl IntoResponse> {
    let image = match state.uploads.status(&payload.upload_id).await {
        Some(OperationState::Success { data }) => data,
        Some(OperationState::Error { error }) => {
            return Err(ApiError::BadRequest(format!("Upload failed: {}", error)));
        }
        Some(OperationState::Idle | OperationState::Loading) => {
            return Err(ApiError::Conflict("Upload is still processing".to_string()));
        }
        None => state
            .storage()
            .get_image(&payload.upload_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Upload {} not found", payload.upload_id)))?,
    };

    let vehicle = find_vehicle(&state, &id).await?;

    state.catalog.set_vehicle_image(&vehicle.id, &image.public_url).await
        .map_err(|e| {
            tracing::error!("Failed to set image for vehicle {}: {}", vehicle.id, e);
            ApiError::Database("Failed to update vehicle image".to_string())
        })?;

    let updated = find_vehicle(&state, &vehicle.id).await?;
    Ok(success(to_response(updated)))
}

/// GET /api/vehicles/:id/availability
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<impl IntoResponse> {
    let vehicle = find_vehicle(&state, &id).await?;
    let date = params.date.unwrap_or_else(|| chrono::Utc::now().date_naive());

    Ok(success(indicators::availability(&vehicle.id, date)))
}
