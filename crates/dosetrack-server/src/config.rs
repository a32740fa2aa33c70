use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

/// Accepted range for DOSETRACK_TOKEN_DAYS.
const TOKEN_DAYS: RangeInclusive<i64> = 1..=3650;

pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_days: i64,
    pub sms: Option<SmsConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("DOSETRACK_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("DOSETRACK_JWT_SECRET is unset or still a placeholder");
        }

        let token_days: i64 = try_load("DOSETRACK_TOKEN_DAYS", "30")?;
        check_token_days(token_days)?;

        Ok(Self {
            host: try_load("DOSETRACK_HOST", "0.0.0.0")?,
            port: try_load("DOSETRACK_PORT", "3000")?,
            db_path: try_load("DOSETRACK_DB_PATH", "dosetrack.db")?,
            jwt_secret,
            token_days,
            sms: sms_from_env(),
        })
    }
}

fn check_token_days(days: i64) -> Result<()> {
    if !TOKEN_DAYS.contains(&days) {
        bail!(
            "DOSETRACK_TOKEN_DAYS must be between {} and {}, got {days}",
            TOKEN_DAYS.start(),
            TOKEN_DAYS.end()
        );
    }
    Ok(())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid {key} value {raw:?}"))
}

fn sms_from_env() -> Option<SmsConfig> {
    match (
        env::var("TWILIO_ACCOUNT_SID"),
        env::var("TWILIO_AUTH_TOKEN"),
        env::var("TWILIO_FROM"),
    ) {
        (Ok(account_sid), Ok(auth_token), Ok(from)) => Some(SmsConfig {
            account_sid,
            auth_token,
            from,
        }),
        _ => {
            warn!("TWILIO_* not fully set, emergency alerts will only be logged");
            None
        }
    }
}
