use async_trait::async_trait;
use notify_core::types::{DeliveryOutcome, Subscription};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    /// The push service says this endpoint will never accept messages again.
    #[error("push endpoint is gone (HTTP {0})")]
    Gone(u16),

    #[error("push service rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not build push message: {0}")]
    Build(String),

    #[error("push attempt timed out after {0:?}")]
    Timeout(Duration),
}

impl PushError {
    /// Only a gone endpoint is permanent; everything else may succeed later.
    pub fn is_permanent(&self) -> bool {
        matches!(self, PushError::Gone(_))
    }
}

/// One attempt to hand a payload to a subscription's push service.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, subscription: &Subscription, payload: &[u8]) -> Result<(), PushError>;
}

pub fn classify(result: &Result<(), PushError>) -> DeliveryOutcome {
    match result {
        Ok(()) => DeliveryOutcome::Delivered,
        Err(err) if err.is_permanent() => DeliveryOutcome::Expired,
        Err(_) => DeliveryOutcome::Failed,
    }
}

/// Map a push service HTTP status to an attempt result.
pub fn check_status(status: u16, body: String) -> Result<(), PushError> {
    match status {
        200..=299 => Ok(()),
        404 | 410 => Err(PushError::Gone(status)),
        _ => Err(PushError::Rejected { status, body }),
    }
}
