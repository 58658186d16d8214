use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use notification_cell::router::notification_routes;
use notification_cell::services::outbox::NotificationOutbox;
use shared_store::MemoryStore;

fn test_app() -> Router {
    let outbox = NotificationOutbox::new(Box::new(MemoryStore::new()));
    notification_routes(Arc::new(RwLock::new(outbox)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn reminder(scheduled: &str) -> Value {
    json!({
        "recipient_id": "P0001",
        "notification_type": "appointment_reminder",
        "channel": "email",
        "subject": "Appointment Reminder",
        "message": "See you soon",
        "scheduled_time": scheduled
    })
}

#[tokio::test]
async fn create_returns_201_with_sequential_id() {
    let app = test_app();
    let (status, body) = send(&app, post_json("/", reminder("2030-06-12T10:00:00Z"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["notification_id"], json!("N0001"));
    assert_eq!(body["data"]["status"], json!("pending"));
    assert_eq!(body["data"]["max_retries"], json!(3));
}

#[tokio::test]
async fn process_delivers_due_notifications() {
    let app = test_app();
    send(&app, post_json("/", reminder("2020-01-01T10:00:00Z"))).await;
    send(&app, post_json("/", reminder("2099-01-01T10:00:00Z"))).await;

    let (status, body) = send(&app, post_json("/process", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], json!(1));

    let (_, first) = send(&app, get("/N0001")).await;
    assert_eq!(first["data"]["status"], json!("sent"));

    let (_, pending) = send(&app, get("/pending")).await;
    assert_eq!(pending["total"], json!(1));
    assert_eq!(pending["data"][0]["notification_id"], json!("N0002"));
}

#[tokio::test]
async fn cancel_is_limited_to_pending_notifications() {
    let app = test_app();
    send(&app, post_json("/", reminder("2020-01-01T10:00:00Z"))).await;

    let (status, body) = send(&app, delete("/N0001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("cancelled"));

    let (status, body) = send(&app, delete("/N0001")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("Only pending notifications can be cancelled.")
    );

    let (status, _) = send(&app, delete("/N9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_type_or_channel_is_a_client_error() {
    let app = test_app();
    let mut body = reminder("2030-06-12T10:00:00Z");
    body["channel"] = json!("pigeon");
    let (status, _) = send(&app, post_json("/", body)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn statistics_reflect_the_queue() {
    let app = test_app();
    send(&app, post_json("/", reminder("2020-01-01T10:00:00Z"))).await;
    send(&app, post_json("/process", json!({}))).await;

    let (status, body) = send(&app, get("/statistics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_notifications"], json!(1));
    assert_eq!(body["data"]["status_distribution"]["sent"], json!(1));
    assert_eq!(
        body["data"]["type_distribution"]["appointment_reminder"],
        json!(1)
    );
    assert_eq!(body["data"]["pending_notifications"], json!(0));
}
