use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use dosetrack_types::api::Claims;
use dosetrack_types::models::{ConsumptionView, LocationCount};

use super::created;
use crate::ApiError;
use crate::extract::{Fields, Id};
use crate::state::{AppState, blocking};

pub async fn list_consumptions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ConsumptionView>>, ApiError> {
    let views = blocking(&state, move |db| db.list_consumptions(claims.sub)).await?;
    Ok(Json(views))
}

/// GET /consumptions/recent — within the caller's days_back window.
pub async fn recent_consumptions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ConsumptionView>>, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let views = blocking(&state, move |db| db.recent_consumptions(claims.sub, now)).await?;
    Ok(Json(views))
}

pub async fn locations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<LocationCount>>, ApiError> {
    let counts = blocking(&state, move |db| db.location_counts(claims.sub)).await?;
    Ok(Json(counts))
}

pub async fn create_consumption(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<impl IntoResponse, ApiError> {
    let id = blocking(&state, move |db| db.create_consumption(claims.sub, &fields)).await?;
    Ok(created(id))
}

pub async fn get_consumption(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ConsumptionView>, ApiError> {
    let view = blocking(&state, move |db| db.consumption_view(claims.sub, id)).await?;
    Ok(Json(view))
}

pub async fn update_consumption(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.update_consumption(claims.sub, id, &fields)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_consumption(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.delete_consumption(claims.sub, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
