//! Notifier that writes messages to the log instead of sending them.

use async_trait::async_trait;
use tracing::info;

use crate::task::ports::{EmailMessage, Notifier, NotifyError};

/// Logs each notification at `info` level.
///
/// Used where no mail transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        info!(
            recipients = ?message.recipients,
            subject = %message.subject,
            "notification"
        );
        Ok(())
    }
}
