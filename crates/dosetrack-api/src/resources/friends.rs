use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use dosetrack_types::api::Claims;
use dosetrack_types::models::Friend;

use super::created;
use crate::ApiError;
use crate::extract::{Fields, Id};
use crate::state::{AppState, blocking};

pub async fn list_friends(
    State(state): State<AppState>,
    Id(consumption_id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Friend>>, ApiError> {
    let friends = blocking(&state, move |db| db.list_friends(claims.sub, consumption_id)).await?;
    Ok(Json(friends))
}

pub async fn create_friend(
    State(state): State<AppState>,
    Id(consumption_id): Id,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<impl IntoResponse, ApiError> {
    let id = blocking(&state, move |db| {
        db.create_friend(claims.sub, consumption_id, &fields)
    })
    .await?;
    Ok(created(id))
}

pub async fn update_friend(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.update_friend(claims.sub, id, &fields)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_friend(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.delete_friend(claims.sub, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
