use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use dosetrack_db::{DbError, FieldIssue};
use dosetrack_notify::NotifyError;
use dosetrack_types::models::Consumption;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldIssue>),

    #[error("not found")]
    NotFound,

    #[error("delete blocked by referencing consumptions")]
    Conflict(Vec<Consumption>),

    #[error("unauthorized")]
    Unauthorized,

    #[error("username taken")]
    UsernameTaken,

    #[error("no contacts")]
    NoContacts,

    #[error("notification to {recipient} failed")]
    NotificationFailed { recipient: String },

    /// Details are logged where the error is raised, never returned.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn invalid(field: &str, problem: &str) -> Self {
        Self::Validation(vec![FieldIssue::new(field, problem)])
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Validation(issues) => Self::Validation(issues),
            DbError::NotFound => Self::NotFound,
            DbError::Conflict(rows) => Self::Conflict(rows),
            DbError::Duplicate { .. } => Self::UsernameTaken,
            DbError::Storage(err) => {
                error!("Store failure: {}", err);
                Self::Internal
            }
            DbError::Lock => {
                error!("Store lock poisoned");
                Self::Internal
            }
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(e: NotifyError) -> Self {
        match e {
            NotifyError::NoContacts => Self::NoContacts,
            NotifyError::Dispatch { recipient, .. } => Self::NotificationFailed { recipient },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation", "fields": fields }),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "not found" })),
            Self::Conflict(blocking) => (
                StatusCode::CONFLICT,
                json!({ "error": "conflict", "blocking": blocking }),
            ),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" })),
            Self::UsernameTaken => (StatusCode::CONFLICT, json!({ "error": "username taken" })),
            Self::NoContacts => (StatusCode::BAD_REQUEST, json!({ "error": "no contacts" })),
            Self::NotificationFailed { recipient } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "notification failed", "recipient": recipient }),
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
