use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_store::CollectionStore;

use crate::channels::{DeliveryChannel, LogEmailChannel, LogSmsChannel};
use crate::models::{
    Notification, NotificationChannel, NotificationStatus, NotificationType,
};

const RETRY_BACKOFF_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationStats {
    pub total_notifications: usize,
    pub status_distribution: BTreeMap<String, usize>,
    pub type_distribution: BTreeMap<String, usize>,
    pub channel_distribution: BTreeMap<String, usize>,
    pub pending_notifications: usize,
    pub failed_notifications: usize,
}

/// Pending-notification queue plus the delivery loop that drains it.
pub struct NotificationOutbox {
    store: Box<dyn CollectionStore<Notification>>,
    notifications: HashMap<String, Notification>,
    email: Box<dyn DeliveryChannel>,
    sms: Box<dyn DeliveryChannel>,
}

impl NotificationOutbox {
    pub fn new(store: Box<dyn CollectionStore<Notification>>) -> Self {
        Self::with_channels(store, Box::new(LogEmailChannel), Box::new(LogSmsChannel))
    }

    pub fn with_channels(
        store: Box<dyn CollectionStore<Notification>>,
        email: Box<dyn DeliveryChannel>,
        sms: Box<dyn DeliveryChannel>,
    ) -> Self {
        let notifications = store.load_all();
        info!("Loaded {} notifications", notifications.len());
        Self {
            store,
            notifications,
            email,
            sms,
        }
    }

    fn flush(&self) {
        self.store.save_all(&self.notifications);
    }

    fn next_id(&self) -> String {
        format!("N{:04}", self.notifications.len() + 1)
    }

    pub fn create(
        &mut self,
        recipient_id: String,
        notification_type: NotificationType,
        channel: NotificationChannel,
        subject: String,
        message: String,
        scheduled_time: DateTime<Utc>,
    ) -> Notification {
        let notification = Notification::new(
            self.next_id(),
            recipient_id,
            notification_type,
            channel,
            subject,
            message,
            scheduled_time,
        );
        self.notifications
            .insert(notification.notification_id.clone(), notification.clone());
        self.flush();
        notification
    }

    pub fn get(&self, notification_id: &str) -> Option<Notification> {
        self.notifications.get(notification_id).cloned()
    }

    pub fn all(&self) -> Vec<Notification> {
        let mut notifications: Vec<Notification> =
            self.notifications.values().cloned().collect();
        notifications.sort_by(|a, b| a.notification_id.cmp(&b.notification_id));
        notifications
    }

    pub fn pending(&self) -> Vec<Notification> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .values()
            .filter(|n| n.status == NotificationStatus::Pending)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
        notifications
    }

    pub fn cancel(&mut self, notification_id: &str) -> bool {
        match self.notifications.get_mut(notification_id) {
            Some(notification) if notification.status == NotificationStatus::Pending => {
                notification.status = NotificationStatus::Cancelled;
                notification.updated_at = Utc::now();
                self.flush();
                true
            }
            _ => false,
        }
    }

    /// Queue the standard reminder pair for an upcoming appointment: an
    /// email 24 hours ahead and, when a phone number is known, an SMS 12
    /// hours ahead. Lead times already in the past are skipped.
    pub fn schedule_appointment_reminders(
        &mut self,
        patient_id: &str,
        appointment_id: &str,
        appointment_date: DateTime<Utc>,
        patient_phone: Option<&str>,
    ) -> Vec<Notification> {
        let mut queued = Vec::new();
        let now = Utc::now();

        let email_time = appointment_date - Duration::hours(24);
        if email_time > now {
            let message = format!(
                "Dear Patient,\n\n\
                 This is a friendly reminder about your upcoming dental appointment:\n\n\
                 Date: {}\n\
                 Appointment ID: {}\n\n\
                 Please arrive 10 minutes before your scheduled time.\n\n\
                 If you need to reschedule or cancel, please call us at (555) 123-4567.\n\n\
                 Best regards,\n\
                 Bright Smile Dental Care",
                appointment_date.format("%B %d, %Y at %I:%M %p"),
                appointment_id
            );
            queued.push(self.create(
                patient_id.to_string(),
                NotificationType::AppointmentReminder,
                NotificationChannel::Email,
                "Appointment Reminder".to_string(),
                message,
                email_time,
            ));
        }

        if let Some(phone) = patient_phone.filter(|p| !p.is_empty()) {
            let sms_time = appointment_date - Duration::hours(12);
            if sms_time > now {
                debug!("Queueing SMS reminder for {phone}");
                let message = format!(
                    "Reminder: Your dental appointment is tomorrow at {}. Call (555) 123-4567 to reschedule.",
                    appointment_date.format("%I:%M %p")
                );
                queued.push(self.create(
                    patient_id.to_string(),
                    NotificationType::AppointmentReminder,
                    NotificationChannel::Sms,
                    "Appointment Reminder".to_string(),
                    message,
                    sms_time,
                ));
            }
        }

        queued
    }

    pub fn queue_appointment_confirmation(
        &mut self,
        patient_id: &str,
        appointment_id: &str,
        appointment_date: DateTime<Utc>,
    ) -> Notification {
        let message = format!(
            "Dear Patient,\n\n\
             Your dental appointment has been confirmed:\n\n\
             Date: {}\n\
             Appointment ID: {}\n\n\
             Please arrive 10 minutes before your scheduled time.\n\n\
             If you need to reschedule or cancel, please call us at (555) 123-4567.\n\n\
             Best regards,\n\
             Bright Smile Dental Care",
            appointment_date.format("%B %d, %Y at %I:%M %p"),
            appointment_id
        );
        self.create(
            patient_id.to_string(),
            NotificationType::AppointmentConfirmation,
            NotificationChannel::Email,
            "Appointment Confirmation".to_string(),
            message,
            Utc::now(),
        )
    }

    pub fn queue_payment_reminder(
        &mut self,
        patient_id: &str,
        invoice_id: &str,
        amount: f64,
        due_date: DateTime<Utc>,
    ) -> Notification {
        let message = format!(
            "Dear Patient,\n\n\
             This is a friendly reminder about your outstanding balance:\n\n\
             Invoice ID: {}\n\
             Amount Due: ${:.2}\n\
             Due Date: {}\n\n\
             Please contact us to arrange payment or if you have any questions.\n\n\
             Best regards,\n\
             Bright Smile Dental Care",
            invoice_id,
            amount,
            due_date.format("%B %d, %Y")
        );
        self.create(
            patient_id.to_string(),
            NotificationType::PaymentReminder,
            NotificationChannel::Email,
            "Payment Reminder".to_string(),
            message,
            Utc::now(),
        )
    }

    /// Deliver every due pending notification once. Failures back off half
    /// an hour and stay pending until the retry budget runs out.
    pub fn process_due(&mut self) -> usize {
        let now = Utc::now();
        let due_ids: Vec<String> = self
            .notifications
            .values()
            .filter(|n| n.is_due(now))
            .map(|n| n.notification_id.clone())
            .collect();

        let mut delivered = 0;
        for id in &due_ids {
            let notification = self
                .notifications
                .get(id)
                .expect("id collected from the map")
                .clone();
            let channel: &dyn DeliveryChannel = match notification.channel {
                NotificationChannel::Email => self.email.as_ref(),
                NotificationChannel::Sms => self.sms.as_ref(),
            };

            let outcome = channel.deliver(&notification);
            let entry = self
                .notifications
                .get_mut(id)
                .expect("id collected from the map");
            match outcome {
                Ok(()) => {
                    entry.status = NotificationStatus::Sent;
                    entry.sent_time = Some(Utc::now());
                    delivered += 1;
                }
                Err(e) => {
                    entry.retry_count += 1;
                    if entry.retry_count >= entry.max_retries {
                        entry.status = NotificationStatus::Failed;
                        entry.error_message = "Max retries exceeded".to_string();
                        warn!("Notification {} failed permanently: {}", id, e);
                    } else {
                        entry.error_message = e.to_string();
                        entry.scheduled_time =
                            Utc::now() + Duration::minutes(RETRY_BACKOFF_MINUTES);
                        debug!(
                            "Notification {} delivery failed ({}), retry {} of {}",
                            id, e, entry.retry_count, entry.max_retries
                        );
                    }
                }
            }
            entry.updated_at = Utc::now();
        }

        if !due_ids.is_empty() {
            self.flush();
        }
        delivered
    }

    pub fn statistics(&self) -> NotificationStats {
        let mut status_distribution = BTreeMap::new();
        let mut type_distribution = BTreeMap::new();
        let mut channel_distribution = BTreeMap::new();

        for notification in self.notifications.values() {
            *status_distribution
                .entry(notification.status.to_string())
                .or_insert(0) += 1;
            *type_distribution
                .entry(notification.notification_type.to_string())
                .or_insert(0) += 1;
            *channel_distribution
                .entry(notification.channel.to_string())
                .or_insert(0) += 1;
        }

        let pending_notifications = self
            .notifications
            .values()
            .filter(|n| n.status == NotificationStatus::Pending)
            .count();
        let failed_notifications = self
            .notifications
            .values()
            .filter(|n| n.status == NotificationStatus::Failed)
            .count();

        NotificationStats {
            total_notifications: self.notifications.len(),
            status_distribution,
            type_distribution,
            channel_distribution,
            pending_notifications,
            failed_notifications,
        }
    }
}

/// Periodic delivery loop, spawned once from the app entry point.
pub fn spawn_sweeper(outbox: Arc<RwLock<NotificationOutbox>>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let delivered = outbox.write().await.process_due();
            if delivered > 0 {
                info!("Delivered {delivered} notifications");
            }
        }
    });
}
