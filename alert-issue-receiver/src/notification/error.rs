//! Notification decoding error types.

use thiserror::Error;

/// Errors that can occur while decoding an inbound webhook payload.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The body is not valid JSON or does not match the webhook schema.
    #[error("Malformed webhook payload: {0}")]
    Decode(#[from] serde_json::Error),
}
