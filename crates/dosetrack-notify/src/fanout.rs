use futures_util::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// Raised before any dispatch is attempted.
    #[error("no contacts")]
    NoContacts,

    /// At least one dispatch failed. Carries the first failure in recipient
    /// order; `failed` counts all of them.
    #[error("notifying {recipient} failed: {reason} ({failed} of {total} failed)")]
    Dispatch {
        recipient: String,
        reason: String,
        failed: usize,
        total: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
}

/// Send `message` to every recipient concurrently and resolve once, after
/// all dispatches have finished.
///
/// Each dispatch is a separate future; their outcomes are collected in
/// recipient order and reduced here, never inside a per-recipient handler.
/// Failed dispatches are not retried.
pub async fn fan_out(
    transport: &dyn Transport,
    recipients: &[String],
    message: &str,
) -> Result<FanOutReport, NotifyError> {
    if recipients.is_empty() {
        return Err(NotifyError::NoContacts);
    }

    let dispatches = recipients
        .iter()
        .map(|recipient| transport.send(recipient, message));
    let outcomes = join_all(dispatches).await;

    let mut first_failure = None;
    let mut failed = 0;
    for (recipient, outcome) in recipients.iter().zip(outcomes) {
        if let Err(e) = outcome {
            warn!("Notification to {} failed: {}", recipient, e);
            failed += 1;
            first_failure.get_or_insert((recipient.clone(), e.reason));
        }
    }

    match first_failure {
        None => {
            info!("Notified {} contact(s)", recipients.len());
            Ok(FanOutReport {
                delivered: recipients.len(),
            })
        }
        Some((recipient, reason)) => Err(NotifyError::Dispatch {
            recipient,
            reason,
            failed,
            total: recipients.len(),
        }),
    }
}
