use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;

use super::AppState;
use super::error::ApiResult;
use super::response::success;
use super::vehicles::{find_vehicle, LangParams};
use crate::models::Language;
use crate::services::booking::{booking_redirect_url, quick_booking_url, BookingRequest};

/// GET /api/vehicles/:id/book
///
/// 直接跳转到预订渠道（303）。
pub async fn quick_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LangParams>,
) -> ApiResult<Redirect> {
    let vehicle = find_vehicle(&state, &id).await?;
    let lang = Language::from_code_or_default(params.lang.as_deref());

    let url = quick_booking_url(&state.config.booking_phone, &vehicle, lang);
    Ok(Redirect::to(&url))
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate(chrono::Utc::now().date_naive())?;

    let vehicle = find_vehicle(&state, &payload.vehicle_id).await?;
    let redirect_url = booking_redirect_url(&state.config.booking_phone, &vehicle, &payload);

    tracing::info!(
        "Booking request for {} ({} days)",
        vehicle.display_name(),
        payload.rental_days()
    );

    Ok(success(json!({
        "redirect_url": redirect_url,
        "rental_days": payload.rental_days(),
        "estimated_total": vehicle.price_per_day * payload.rental_days(),
    })))
}
