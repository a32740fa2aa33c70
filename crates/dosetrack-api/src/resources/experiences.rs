use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use dosetrack_types::api::Claims;
use dosetrack_types::models::{Experience, ExperienceView};

use super::created;
use crate::ApiError;
use crate::extract::{Fields, Id};
use crate::state::{AppState, blocking};

pub async fn list_experiences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Experience>>, ApiError> {
    let experiences = blocking(&state, move |db| db.list_experiences(claims.sub)).await?;
    Ok(Json(experiences))
}

pub async fn create_experience(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<impl IntoResponse, ApiError> {
    let id = blocking(&state, move |db| db.create_experience(claims.sub, &fields)).await?;
    Ok(created(id))
}

/// GET /experiences/{id} — the experience with its consumptions nested.
pub async fn get_experience(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ExperienceView>, ApiError> {
    let view = blocking(&state, move |db| db.experience_view(claims.sub, id)).await?;
    Ok(Json(view))
}

pub async fn update_experience(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.update_experience(claims.sub, id, &fields)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_experience(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.delete_experience(claims.sub, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
