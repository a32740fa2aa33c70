//! Owner-scoped CRUD handlers. The owner id always comes from the verified
//! token claims, never from the path or body.

pub mod consumptions;
pub mod drugs;
pub mod experiences;
pub mod friends;
pub mod methods;

use axum::{Json, http::StatusCode, response::IntoResponse};

use dosetrack_types::api::CreatedResponse;

fn created(id: i64) -> impl IntoResponse {
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}
