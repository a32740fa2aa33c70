use axum::{Extension, Json, extract::State, http::StatusCode};

use dosetrack_types::api::Claims;
use dosetrack_types::models::UserProfile;

use crate::ApiError;
use crate::extract::Fields;
use crate::state::{AppState, blocking};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = blocking(&state, move |db| db.get_profile(claims.sub)).await?;
    Ok(Json(profile))
}

/// PUT /me — custom fields only (contacts, phone, days_back,
/// favorite_count). Any other key rejects the request.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Fields(fields): Fields,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |db| db.update_profile(claims.sub, &fields)).await?;
    Ok(StatusCode::NO_CONTENT)
}
