use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use shared_models::{success, success_list, AppError, Pagination};

use crate::models::{CreateDentistRequest, DentistSpecialty, UpdateDentistRequest};
use crate::services::roster::DentistRoster;

pub type DentistState = Arc<RwLock<DentistRoster>>;

#[derive(Debug, Deserialize)]
pub struct ListFilter {
    pub specialty: Option<DentistSpecialty>,
}

#[axum::debug_handler]
pub async fn list_dentists(
    State(roster): State<DentistState>,
    Query(filter): Query<ListFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let roster = roster.read().await;
    let dentists = match filter.specialty {
        Some(specialty) => roster.by_specialty(specialty),
        None => roster.all(),
    };
    let total = dentists.len();
    Ok(Json(success_list(page.apply(dentists), total)))
}

#[axum::debug_handler]
pub async fn create_dentist(
    State(roster): State<DentistState>,
    Json(request): Json<CreateDentistRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(AppError::BadRequest("Dentist name is required".to_string()));
    }
    if request.license_number.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing required field: license_number".to_string(),
        ));
    }

    let mut roster = roster.write().await;
    let dentist = roster.create(request);
    Ok((StatusCode::CREATED, Json(success(dentist))))
}

#[axum::debug_handler]
pub async fn get_dentist(
    State(roster): State<DentistState>,
    Path(dentist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let roster = roster.read().await;
    let dentist = roster
        .get(&dentist_id)
        .ok_or_else(|| AppError::NotFound(format!("Dentist {dentist_id} not found")))?;
    Ok(Json(success(dentist)))
}

#[axum::debug_handler]
pub async fn update_dentist(
    State(roster): State<DentistState>,
    Path(dentist_id): Path<String>,
    Json(request): Json<UpdateDentistRequest>,
) -> Result<Json<Value>, AppError> {
    let mut roster = roster.write().await;
    let dentist = roster
        .update(&dentist_id, request)
        .ok_or_else(|| AppError::NotFound(format!("Dentist {dentist_id} not found")))?;
    Ok(Json(success(dentist)))
}

#[axum::debug_handler]
pub async fn dentist_specialties() -> Json<Value> {
    let specialties: Vec<String> = DentistSpecialty::all()
        .iter()
        .map(ToString::to_string)
        .collect();
    Json(success(specialties))
}
