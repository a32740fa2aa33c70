use axum::{Extension, Json, body::Bytes, extract::State};
use tracing::info;

use dosetrack_notify::fan_out;
use dosetrack_types::api::{Claims, EmergencyRequest, EmergencyResponse};
use dosetrack_types::models::UserProfile;

use crate::ApiError;
use crate::state::{AppState, blocking};

fn default_message(profile: &UserProfile) -> String {
    match &profile.phone {
        Some(phone) => format!(
            "{} has sent an emergency alert from dosetrack and may need help. Call them at {}.",
            profile.username, phone
        ),
        None => format!(
            "{} has sent an emergency alert from dosetrack and may need help.",
            profile.username
        ),
    }
}

/// POST /emergency — text every stored emergency contact. Responds once,
/// after all sends have finished.
pub async fn notify_contacts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<EmergencyResponse>, ApiError> {
    let req: EmergencyRequest = if body.is_empty() {
        EmergencyRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::invalid("*", "body must be {\"message\": string}"))?
    };

    let profile = blocking(&state, move |db| db.get_profile(claims.sub)).await?;
    let contacts = profile.contacts();
    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default_message(&profile));

    let report = fan_out(state.transport.as_ref(), &contacts, &message).await?;
    info!("Emergency alert from user {} reached {} contact(s)", profile.id, report.delivered);

    Ok(Json(EmergencyResponse {
        notified: report.delivered,
    }))
}
