use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde_json::{Map, Value};

use crate::ApiError;

/// A create/update payload: any JSON object. Its keys are checked against
/// the kind's allow-list by the store, so a malformed body surfaces as the
/// same validation error as an unknown field.
pub struct Fields(pub Map<String, Value>);

impl<S> FromRequest<S> for Fields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| ApiError::invalid("*", "body must be a JSON object"))?;

        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::invalid("*", "body must be a JSON object")),
        }
    }
}

/// The `{id}` path segment. Anything other than an integer is reported as a
/// validation error on field `id`.
pub struct Id(pub i64);

impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid("id", "must be an integer"))?;
        Ok(Self(id))
    }
}
