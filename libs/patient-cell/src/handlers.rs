use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use shared_models::{success, success_list, AppError, Pagination};

use crate::models::{
    CreatePatientRequest, MedicalHistoryRequest, NoteRequest, TreatmentRequest,
    UpdatePatientRequest,
};
use crate::services::directory::PatientDirectory;

pub type PatientState = Arc<RwLock<PatientDirectory>>;

#[derive(Debug, Deserialize)]
pub struct ListFilter {
    pub search: Option<String>,
    pub insurance_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required field: {field}"
        )));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn list_patients(
    State(directory): State<PatientState>,
    Query(filter): Query<ListFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let directory = directory.read().await;
    let patients = if let Some(search) = filter.search.filter(|s| !s.is_empty()) {
        directory.search(&search)
    } else if let Some(provider) = filter.insurance_provider.filter(|p| !p.is_empty()) {
        directory.by_insurance(&provider)
    } else {
        directory.all()
    };
    let total = patients.len();
    Ok(Json(success_list(page.apply(patients), total)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(directory): State<PatientState>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_non_empty(&request.first_name, "first_name")?;
    require_non_empty(&request.last_name, "last_name")?;
    require_non_empty(&request.email, "email")?;
    require_non_empty(&request.phone, "phone")?;

    let mut directory = directory.write().await;
    let patient = directory.create(
        request.first_name,
        request.last_name,
        request.email,
        request.phone,
        request.date_of_birth,
        request.insurance_provider,
        request.insurance_id,
    );
    Ok((StatusCode::CREATED, Json(success(patient))))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(directory): State<PatientState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = directory.read().await;
    let patient = directory
        .get(&patient_id)
        .ok_or_else(|| AppError::NotFound(format!("Patient {patient_id} not found")))?;
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(directory): State<PatientState>,
    Path(patient_id): Path<String>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let mut directory = directory.write().await;
    let patient = directory
        .update(&patient_id, request)
        .ok_or_else(|| AppError::NotFound(format!("Patient {patient_id} not found")))?;
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(directory): State<PatientState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let mut directory = directory.write().await;
    if !directory.delete(&patient_id) {
        return Err(AppError::NotFound(format!("Patient {patient_id} not found")));
    }
    Ok(Json(json!({
        "success": true,
        "message": "Patient deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(directory): State<PatientState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let q = query
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;

    let directory = directory.read().await;
    let patients = directory.search(&q);
    let total = patients.len();
    Ok(Json(success_list(patients, total)))
}

#[axum::debug_handler]
pub async fn patients_by_insurance(
    State(directory): State<PatientState>,
    Path(provider): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = directory.read().await;
    let patients = directory.by_insurance(&provider);
    let total = patients.len();
    Ok(Json(success_list(patients, total)))
}

#[axum::debug_handler]
pub async fn lookup_by_email(
    State(directory): State<PatientState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = directory.read().await;
    let patient = directory
        .by_email(&email)
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn lookup_by_phone(
    State(directory): State<PatientState>,
    Path(phone): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = directory.read().await;
    let patient = directory
        .by_phone(&phone)
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn add_medical_history(
    State(directory): State<PatientState>,
    Path(patient_id): Path<String>,
    Json(request): Json<MedicalHistoryRequest>,
) -> Result<Json<Value>, AppError> {
    require_non_empty(&request.condition, "condition")?;
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());

    let mut directory = directory.write().await;
    if !directory.add_medical_history(&patient_id, request.condition, date, request.notes) {
        return Err(AppError::NotFound(format!("Patient {patient_id} not found")));
    }
    let patient = directory.get(&patient_id).expect("existence checked above");
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn add_treatment(
    State(directory): State<PatientState>,
    Path(patient_id): Path<String>,
    Json(request): Json<TreatmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_non_empty(&request.treatment_type, "treatment_type")?;
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());

    let mut directory = directory.write().await;
    if !directory.add_treatment(
        &patient_id,
        request.treatment_type,
        date,
        request.cost,
        request.notes,
    ) {
        return Err(AppError::NotFound(format!("Patient {patient_id} not found")));
    }
    let patient = directory.get(&patient_id).expect("existence checked above");
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn add_note(
    State(directory): State<PatientState>,
    Path(patient_id): Path<String>,
    Json(request): Json<NoteRequest>,
) -> Result<Json<Value>, AppError> {
    require_non_empty(&request.note, "note")?;

    let mut directory = directory.write().await;
    if !directory.add_note(&patient_id, request.note, request.category) {
        return Err(AppError::NotFound(format!("Patient {patient_id} not found")));
    }
    let patient = directory.get(&patient_id).expect("existence checked above");
    Ok(Json(success(patient)))
}

#[axum::debug_handler]
pub async fn patient_statistics(
    State(directory): State<PatientState>,
) -> Result<Json<Value>, AppError> {
    let directory = directory.read().await;
    Ok(Json(success(directory.statistics())))
}
