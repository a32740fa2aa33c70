use std::sync::LazyLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use tracing::{error, info};

use dosetrack_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::ApiError;
use crate::state::{AppState, blocking};

/// Digest checked when the username is unknown, so both login failures
/// pay for one argon2 verification.
static DUMMY_DIGEST: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("dosetrack-unknown-user").ok());

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::Internal
        })
}

/// Unknown users and wrong passwords are both `Unauthorized`.
pub fn verify_password(password: &str, digest: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(digest).map_err(|e| {
        error!("Stored password digest is unreadable: {}", e);
        ApiError::Internal
    })?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized)
}

/// Burns one verification against [`DUMMY_DIGEST`] and yields the same
/// error a wrong password would.
fn reject_unknown_user(password: &str) -> ApiError {
    if let Some(digest) = DUMMY_DIGEST.as_deref() {
        let _ = verify_password(password, digest);
    }
    ApiError::Unauthorized
}

pub fn create_token(
    secret: &str,
    days: i64,
    user_id: i64,
    username: &str,
) -> Result<String, ApiError> {
    let expires = chrono::Duration::try_days(days)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| {
            error!("Token lifetime of {} days is out of range", days);
            ApiError::Internal
        })?;
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: expires.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Token encoding failed: {}", e);
        ApiError::Internal
    })
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::invalid("username", "must be 3 to 32 characters"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::invalid("password", "must be at least 8 characters"));
    }

    let password_hash = hash_password(&req.password)?;

    let username = req.username.clone();
    let user_id = blocking(&state, move |db| db.create_user(&username, &password_hash)).await?;
    info!("Registered user {} ({})", req.username, user_id);

    let token = create_token(&state.jwt_secret, state.token_days, user_id, &req.username)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let Some(user) = blocking(&state, move |db| db.get_user_by_username(&username)).await? else {
        return Err(reject_unknown_user(&req.password));
    };

    verify_password(&req.password, &user.password)?;

    let token = create_token(&state.jwt_secret, state.token_days, user.id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}
