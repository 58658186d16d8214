use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use shared_models::{success, success_list, AppError, Pagination};

use crate::models::CreateNotificationRequest;
use crate::services::outbox::NotificationOutbox;

pub type NotificationState = Arc<RwLock<NotificationOutbox>>;

#[axum::debug_handler]
pub async fn list_notifications(
    State(outbox): State<NotificationState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let outbox = outbox.read().await;
    let notifications = outbox.all();
    let total = notifications.len();
    Ok(Json(success_list(page.apply(notifications), total)))
}

#[axum::debug_handler]
pub async fn create_notification(
    State(outbox): State<NotificationState>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.recipient_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing required field: recipient_id".to_string(),
        ));
    }

    let mut outbox = outbox.write().await;
    let notification = outbox.create(
        request.recipient_id,
        request.notification_type,
        request.channel,
        request.subject,
        request.message,
        request.scheduled_time.unwrap_or_else(Utc::now),
    );
    Ok((StatusCode::CREATED, Json(success(notification))))
}

#[axum::debug_handler]
pub async fn get_notification(
    State(outbox): State<NotificationState>,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let outbox = outbox.read().await;
    let notification = outbox
        .get(&notification_id)
        .ok_or_else(|| AppError::NotFound(format!("Notification {notification_id} not found")))?;
    Ok(Json(success(notification)))
}

#[axum::debug_handler]
pub async fn cancel_notification(
    State(outbox): State<NotificationState>,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let mut outbox = outbox.write().await;
    if outbox.get(&notification_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Notification {notification_id} not found"
        )));
    }
    if !outbox.cancel(&notification_id) {
        return Err(AppError::BadRequest(
            "Only pending notifications can be cancelled.".to_string(),
        ));
    }
    let notification = outbox
        .get(&notification_id)
        .expect("existence checked above");
    Ok(Json(success(notification)))
}

#[axum::debug_handler]
pub async fn pending_notifications(
    State(outbox): State<NotificationState>,
) -> Result<Json<Value>, AppError> {
    let outbox = outbox.read().await;
    let notifications = outbox.pending();
    let total = notifications.len();
    Ok(Json(success_list(notifications, total)))
}

/// Manual sweep trigger, same path the background task takes.
#[axum::debug_handler]
pub async fn process_due(
    State(outbox): State<NotificationState>,
) -> Result<Json<Value>, AppError> {
    let mut outbox = outbox.write().await;
    let delivered = outbox.process_due();
    Ok(Json(json!({
        "success": true,
        "delivered": delivered
    })))
}

#[axum::debug_handler]
pub async fn notification_statistics(
    State(outbox): State<NotificationState>,
) -> Result<Json<Value>, AppError> {
    let outbox = outbox.read().await;
    Ok(Json(success(outbox.statistics())))
}
