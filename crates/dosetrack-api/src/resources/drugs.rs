use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use dosetrack_types::api::Claims;
use dosetrack_types::models::{Drug, DrugUsage};

use super::created;
use crate::ApiError;
use crate::extract::{Fields, Id};
use crate::state::{AppState, blocking};

/// GET /drugs — every drug with its use_count, by name.
pub async fn list_drugs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DrugUsage>>, ApiError> {
    let drugs = blocking(&state, move |db| db.list_drugs(claims.sub)).await?;
    Ok(Json(drugs))
}

pub async fn favorite_drugs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<DrugUsage>>, ApiError> {
    let drugs = blocking(&state, move |db| db.favorite_drugs(claims.sub)).await?;
    Ok(Json(drugs))
}

pub async fn create_drug(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<impl IntoResponse, ApiError> {
    let id = blocking(&state, move |db| db.create_drug(claims.sub, &fields)).await?;
    Ok(created(id))
}

pub async fn get_drug(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Drug>, ApiError> {
    let drug = blocking(&state, move |db| db.get_drug(claims.sub, id)).await?;
    Ok(Json(drug))
}

pub async fn update_drug(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.update_drug(claims.sub, id, &fields)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /drugs/{id} — 409 with the blocking consumptions while any
/// consumption still references the drug.
pub async fn delete_drug(
    State(state): State<AppState>,
    Id(id): Id,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.delete_drug(claims.sub, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
