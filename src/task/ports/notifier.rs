//! Outbound notification port.

use async_trait::async_trait;
use thiserror::Error;

/// Rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient addresses.
    pub recipients: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Errors raised while preparing or delivering a notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// The message could not be rendered.
    #[error("notification template failed: {0}")]
    Template(String),

    /// The transport rejected or failed to deliver the message.
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Delivers notifications. Delivery is best-effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `message` to all of its recipients.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] when delivery fails.
    async fn notify(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}
