use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use scheduling_cell::router::appointment_routes;
use scheduling_cell::services::engine::SchedulingEngine;
use shared_store::MemoryStore;

fn test_app() -> Router {
    let engine = SchedulingEngine::new(Box::new(MemoryStore::new()));
    appointment_routes(Arc::new(RwLock::new(engine)))
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

fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn booking_body(start: &str) -> Value {
    json!({
        "patient_id": "P0001",
        "appointment_type": "cleaning",
        "scheduled_date": start,
        "duration_minutes": 60
    })
}

#[tokio::test]
async fn create_returns_201_with_sequential_id() {
    let app = test_app();
    let (status, body) = send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["appointment_id"], json!("A0001"));
    assert_eq!(body["data"]["status"], json!("scheduled"));
}

#[tokio::test]
async fn conflicting_create_returns_409_with_message() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;
    let (status, body) = send(&app, post_json("/", booking_body("2030-06-12T10:30:00Z"))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"],
        json!("Appointment could not be created. Time slot may be unavailable.")
    );
}

#[tokio::test]
async fn get_unknown_appointment_returns_404() {
    let app = test_app();
    let (status, body) = send(&app, get("/A9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn list_applies_limit_and_offset() {
    let app = test_app();
    for start in [
        "2030-06-12T09:00:00Z",
        "2030-06-12T11:00:00Z",
        "2030-06-12T13:00:00Z",
    ] {
        send(&app, post_json("/", booking_body(start))).await;
    }

    let (status, body) = send(&app, get("/?limit=1&offset=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["appointment_id"], json!("A0002"));
}

#[tokio::test]
async fn available_slots_shrink_after_booking() {
    let app = test_app();

    let (status, body) = send(&app, get("/available-slots?date=2030-06-12")).await;
    assert_eq!(status, StatusCode::OK);
    let open_day = body["data"].as_array().unwrap().len();
    assert_eq!(open_day, 15);
    assert_eq!(body["data"][0], json!("2030-06-12T09:00:00Z"));

    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;
    let (_, body) = send(&app, get("/available-slots?date=2030-06-12")).await;
    let slots = body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 12);
    assert!(!slots.contains(&json!("2030-06-12T09:30:00Z")));
    assert!(!slots.contains(&json!("2030-06-12T10:00:00Z")));
    assert!(!slots.contains(&json!("2030-06-12T10:30:00Z")));
}

#[tokio::test]
async fn malformed_slot_date_returns_400() {
    let app = test_app();
    let (status, body) = send(&app, get("/available-slots?date=June-12")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid date format. Use YYYY-MM-DD"));
}

#[tokio::test]
async fn update_reschedules_and_confirms() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;

    let (status, body) = send(
        &app,
        put_json(
            "/A0001",
            json!({"status": "confirmed", "reschedule_to": "2030-06-12T14:00:00Z"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("confirmed"));
    assert_eq!(body["data"]["scheduled_date"], json!("2030-06-12T14:00:00Z"));
}

#[tokio::test]
async fn update_with_unknown_field_is_rejected() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;

    // Unknown fields fail body deserialization, which surfaces as 422.
    let (status, _) = send(&app, put_json("/A0001", json!({"patient_id": "P0002"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn reschedule_into_taken_slot_returns_409() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T09:00:00Z"))).await;
    send(&app, post_json("/", booking_body("2030-06-12T11:00:00Z"))).await;

    let (status, _) = send(
        &app,
        put_json("/A0001", json!({"reschedule_to": "2030-06-12T11:30:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn late_cancellation_returns_400() {
    let app = test_app();
    let soon = (Utc::now() + Duration::hours(3)).to_rfc3339();
    send(&app, post_json("/", booking_body(&soon))).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/A0001?reason=conflict")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("Appointment cannot be cancelled within 24 hours of the scheduled time.")
    );
}

#[tokio::test]
async fn early_cancellation_succeeds_and_records_reason() {
    let app = test_app();
    let far = (Utc::now() + Duration::hours(72)).to_rfc3339();
    send(&app, post_json("/", booking_body(&far))).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/A0001?reason=vacation")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("cancelled"));
    assert!(body["data"]["notes"]
        .as_str()
        .unwrap()
        .contains("Cancelled: vacation"));
}

#[tokio::test]
async fn treatment_note_appends() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;

    let (status, body) = send(
        &app,
        post_json(
            "/A0001/treatment-notes",
            json!({"note": "replaced filling", "dentist_id": "D0001"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["treatment_notes"][0]["note"], json!("replaced filling"));
    assert_eq!(body["data"]["status"], json!("scheduled"));
}

#[tokio::test]
async fn statistics_reflect_bookings() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;
    send(&app, post_json("/", booking_body("2030-06-12T13:00:00Z"))).await;

    let (status, body) = send(&app, get("/statistics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_appointments"], json!(2));
    assert_eq!(body["data"]["status_distribution"]["scheduled"], json!(2));
    assert_eq!(body["data"]["type_distribution"]["cleaning"], json!(2));
}

#[tokio::test]
async fn enum_listings_expose_string_codes() {
    let app = test_app();

    let (_, body) = send(&app, get("/types")).await;
    let types = body["data"].as_array().unwrap();
    assert_eq!(types.len(), 9);
    assert!(types.contains(&json!("root_canal")));

    let (_, body) = send(&app, get("/statuses")).await;
    let statuses = body["data"].as_array().unwrap();
    assert_eq!(statuses.len(), 6);
    assert!(statuses.contains(&json!("no_show")));
}

#[tokio::test]
async fn by_date_filters_on_calendar_day() {
    let app = test_app();
    send(&app, post_json("/", booking_body("2030-06-12T10:00:00Z"))).await;
    send(&app, post_json("/", booking_body("2030-06-13T10:00:00Z"))).await;

    let (status, body) = send(&app, get("/by-date/2030-06-12")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["data"][0]["scheduled_date"], json!("2030-06-12T10:00:00Z"));
}
