use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use shared_models::{success, success_list, AppError, Pagination};

use crate::models::{
    AppointmentStatus, AppointmentType, CreateAppointmentRequest, TreatmentNoteRequest,
    UpdateAppointmentRequest,
};
use crate::services::engine::SchedulingEngine;

/// Single-writer discipline: every mutation goes through this one lock, so
/// the engine's scan-then-insert conflict check cannot race itself.
pub type SchedulingState = Arc<RwLock<SchedulingEngine>>;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: String,
    pub duration_minutes: Option<i64>,
    pub dentist_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CancelParams {
    pub reason: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(engine): State<SchedulingState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let engine = engine.read().await;
    let appointments = engine.all();
    let total = appointments.len();
    Ok(Json(success_list(page.apply(appointments), total)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(engine): State<SchedulingState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut engine = engine.write().await;
    let appointment = engine
        .create(
            request.patient_id,
            request.appointment_type,
            request.scheduled_date,
            request.duration_minutes,
            request.dentist_id,
            request.notes,
        )
        .ok_or_else(|| {
            AppError::Conflict(
                "Appointment could not be created. Time slot may be unavailable.".to_string(),
            )
        })?;

    Ok((StatusCode::CREATED, Json(success(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(engine): State<SchedulingState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let engine = engine.read().await;
    let appointment = engine
        .get(&appointment_id)
        .ok_or_else(|| AppError::NotFound(format!("Appointment {appointment_id} not found")))?;
    Ok(Json(success(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(engine): State<SchedulingState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let mut engine = engine.write().await;
    if engine.get(&appointment_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Appointment {appointment_id} not found"
        )));
    }

    if let Some(new_start) = request.reschedule_to {
        if !engine.reschedule(&appointment_id, new_start) {
            return Err(AppError::Conflict(
                "Appointment could not be rescheduled. Time slot may be unavailable.".to_string(),
            ));
        }
    }
    if let Some(status) = request.status {
        engine.update_status(&appointment_id, status);
    }
    if let Some(notes) = request.notes {
        engine.set_notes(&appointment_id, notes);
    }

    let appointment = engine
        .get(&appointment_id)
        .expect("existence checked above");
    Ok(Json(success(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(engine): State<SchedulingState>,
    Path(appointment_id): Path<String>,
    Query(params): Query<CancelParams>,
) -> Result<Json<Value>, AppError> {
    let mut engine = engine.write().await;
    if engine.get(&appointment_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Appointment {appointment_id} not found"
        )));
    }

    let reason = params.reason.unwrap_or_default();
    if !engine.cancel(&appointment_id, &reason) {
        return Err(AppError::BadRequest(
            "Appointment cannot be cancelled within 24 hours of the scheduled time.".to_string(),
        ));
    }

    let appointment = engine
        .get(&appointment_id)
        .expect("existence checked above");
    Ok(Json(success(appointment)))
}

#[axum::debug_handler]
pub async fn available_slots(
    State(engine): State<SchedulingState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&query.date)?;
    let duration = query.duration_minutes.unwrap_or(60);
    if duration <= 0 {
        return Err(AppError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }

    let engine = engine.read().await;
    let slots = engine.available_slots(date, duration, query.dentist_id.as_deref());
    Ok(Json(json!({
        "success": true,
        "data": slots,
        "date": query.date,
        "duration_minutes": duration
    })))
}

#[axum::debug_handler]
pub async fn upcoming_appointments(
    State(engine): State<SchedulingState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Value>, AppError> {
    let hours = query.hours.unwrap_or(24);
    let engine = engine.read().await;
    let appointments = engine.upcoming(hours);
    let total = appointments.len();
    Ok(Json(success_list(appointments, total)))
}

#[axum::debug_handler]
pub async fn overdue_appointments(
    State(engine): State<SchedulingState>,
) -> Result<Json<Value>, AppError> {
    let engine = engine.read().await;
    let appointments = engine.overdue();
    let total = appointments.len();
    Ok(Json(success_list(appointments, total)))
}

#[axum::debug_handler]
pub async fn add_treatment_note(
    State(engine): State<SchedulingState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<TreatmentNoteRequest>,
) -> Result<Json<Value>, AppError> {
    let mut engine = engine.write().await;
    if !engine.add_treatment_note(&appointment_id, request.note, request.dentist_id) {
        return Err(AppError::NotFound(format!(
            "Appointment {appointment_id} not found"
        )));
    }

    let appointment = engine
        .get(&appointment_id)
        .expect("existence checked above");
    Ok(Json(success(appointment)))
}

#[axum::debug_handler]
pub async fn appointment_statistics(
    State(engine): State<SchedulingState>,
) -> Result<Json<Value>, AppError> {
    let engine = engine.read().await;
    Ok(Json(success(engine.statistics())))
}

#[axum::debug_handler]
pub async fn appointments_by_patient(
    State(engine): State<SchedulingState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let engine = engine.read().await;
    let appointments = engine.by_patient(&patient_id);
    let total = appointments.len();
    Ok(Json(success_list(appointments, total)))
}

#[axum::debug_handler]
pub async fn appointments_by_dentist(
    State(engine): State<SchedulingState>,
    Path(dentist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let engine = engine.read().await;
    let appointments = engine.by_dentist(&dentist_id);
    let total = appointments.len();
    Ok(Json(success_list(appointments, total)))
}

#[axum::debug_handler]
pub async fn appointments_by_date(
    State(engine): State<SchedulingState>,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&date)?;
    let engine = engine.read().await;
    let appointments = engine.by_date(date);
    let total = appointments.len();
    Ok(Json(success_list(appointments, total)))
}

#[axum::debug_handler]
pub async fn appointment_types() -> Json<Value> {
    let types: Vec<String> = AppointmentType::all()
        .iter()
        .map(ToString::to_string)
        .collect();
    Json(success(types))
}

#[axum::debug_handler]
pub async fn appointment_statuses() -> Json<Value> {
    let statuses: Vec<String> = AppointmentStatus::all()
        .iter()
        .map(ToString::to_string)
        .collect();
    Json(success(statuses))
}
