use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, NotificationState};

pub fn notification_routes(state: NotificationState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route("/pending", get(handlers::pending_notifications))
        .route("/process", post(handlers::process_due))
        .route("/statistics", get(handlers::notification_statistics))
        .route(
            "/{notification_id}",
            get(handlers::get_notification).delete(handlers::cancel_notification),
        )
        .with_state(state)
}
