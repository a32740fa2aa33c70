use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use dosetrack_types::api::Claims;
use dosetrack_types::models::Method;

use super::created;
use crate::ApiError;
use crate::extract::{Fields, Id};
use crate::state::{AppState, blocking};

pub async fn list_methods(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Method>>, ApiError> {
    let methods = blocking(&state, move |db| db.list_methods(claims.sub)).await?;
    Ok(Json(methods))
}

pub async fn create_method(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<impl IntoResponse, ApiError> {
    let id = blocking(&state, move |db| db.create_method(claims.sub, &fields)).await?;
    Ok(created(id))
}

pub async fn get_method(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Method>, ApiError> {
    let method = blocking(&state, move |db| db.get_method(claims.sub, id)).await?;
    Ok(Json(method))
}

pub async fn update_method(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.update_method(claims.sub, id, &fields)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_method(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.delete_method(claims.sub, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
