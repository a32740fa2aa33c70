use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct TransportError {
    pub reason: String,
}

impl TransportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Delivers one message to one address. Implementations must be safe to
/// call concurrently, one call per recipient, and own any retry policy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), TransportError>;
}

/// Twilio Messages API.
pub struct SmsTransport {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
}

#[derive(Debug, Deserialize)]
struct SmsErrorBody {
    message: Option<String>,
}

impl SmsTransport {
    pub fn new(account_sid: String, auth_token: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl Transport for SmsTransport {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), TransportError> {
        let resp = self
            .client
            .post(self.endpoint())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", recipient), ("From", self.from.as_str()), ("Body", message)])
            .send()
            .await
            .map_err(|e| TransportError::new(format!("request failed: {}", e)))?;

        let status = resp.status();
        if status.is_success() {
            debug!("SMS accepted for {}", recipient);
            return Ok(());
        }

        let detail = resp
            .json::<SmsErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.to_string());
        Err(TransportError::new(detail))
    }
}

/// Writes messages to the log instead of sending them. Used when no SMS
/// credentials are configured.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), TransportError> {
        info!("[notify] to={} message={:?}", recipient, message);
        Ok(())
    }
}
