use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    AppointmentReminder,
    AppointmentConfirmation,
    AppointmentCancellation,
    AppointmentReschedule,
    PaymentReminder,
    GeneralMessage,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::AppointmentReminder => write!(f, "appointment_reminder"),
            NotificationType::AppointmentConfirmation => write!(f, "appointment_confirmation"),
            NotificationType::AppointmentCancellation => write!(f, "appointment_cancellation"),
            NotificationType::AppointmentReschedule => write!(f, "appointment_reschedule"),
            NotificationType::PaymentReminder => write!(f, "payment_reminder"),
            NotificationType::GeneralMessage => write!(f, "general_message"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationChannel::Email => write!(f, "email"),
            NotificationChannel::Sms => write!(f, "sms"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
    Cancelled,
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationStatus::Pending => write!(f, "pending"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Failed => write!(f, "failed"),
            NotificationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outbound message queued for delivery at `scheduled_time`. The sweep
/// retries failed deliveries up to `max_retries` times, half an hour apart,
/// before marking the notification failed for good.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub notification_id: String,
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub channel: NotificationChannel,
    pub subject: String,
    pub message: String,
    pub scheduled_time: DateTime<Utc>,
    pub sent_time: Option<DateTime<Utc>>,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub error_message: String,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Notification {
    pub fn new(
        notification_id: String,
        recipient_id: String,
        notification_type: NotificationType,
        channel: NotificationChannel,
        subject: String,
        message: String,
        scheduled_time: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            notification_id,
            recipient_id,
            notification_type,
            channel,
            subject,
            message,
            scheduled_time,
            sent_time: None,
            status: NotificationStatus::Pending,
            created_at: now,
            updated_at: now,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            error_message: String::new(),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NotificationStatus::Pending && self.scheduled_time <= now
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotificationRequest {
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub channel: NotificationChannel,
    pub subject: String,
    pub message: String,
    pub scheduled_time: Option<DateTime<Utc>>,
}
