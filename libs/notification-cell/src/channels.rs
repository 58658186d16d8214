use thiserror::Error;
use tracing::info;

use crate::models::Notification;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("channel not configured: {0}")]
    NotConfigured(String),
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Transport seam for one notification channel. Wire integrations (SMTP,
/// SMS gateways) plug in here; the bundled implementations log the
/// delivery and report success.
pub trait DeliveryChannel: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

pub struct LogEmailChannel;

impl DeliveryChannel for LogEmailChannel {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            "Email to {}: {} ({})",
            notification.recipient_id, notification.subject, notification.notification_id
        );
        Ok(())
    }
}

pub struct LogSmsChannel;

impl DeliveryChannel for LogSmsChannel {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            "SMS to {}: {} ({})",
            notification.recipient_id, notification.message, notification.notification_id
        );
        Ok(())
    }
}
