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

use crate::models::{
    ClaimStatus, ClaimStatusRequest, CreateClaimRequest, CreateInvoiceRequest, InsuranceInfo,
    InsuranceInfoRequest, InvoiceItemRequest, PaymentRequest,
};
use crate::services::ledger::BillingLedger;

pub type BillingState = Arc<RwLock<BillingLedger>>;

#[derive(Debug, Deserialize)]
pub struct ClaimFilter {
    pub status: Option<ClaimStatus>,
}

#[axum::debug_handler]
pub async fn list_invoices(
    State(ledger): State<BillingState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let invoices = ledger.all();
    let total = invoices.len();
    Ok(Json(success_list(page.apply(invoices), total)))
}

#[axum::debug_handler]
pub async fn create_invoice(
    State(ledger): State<BillingState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.patient_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Missing required field: patient_id".to_string(),
        ));
    }
    let mut ledger = ledger.write().await;
    let invoice = ledger.create(request.patient_id, request.appointment_id);
    Ok((StatusCode::CREATED, Json(success(invoice))))
}

#[axum::debug_handler]
pub async fn get_invoice(
    State(ledger): State<BillingState>,
    Path(invoice_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let invoice = ledger
        .get(&invoice_id)
        .ok_or_else(|| AppError::NotFound(format!("Invoice {invoice_id} not found")))?;
    Ok(Json(success(invoice)))
}

#[axum::debug_handler]
pub async fn invoices_by_patient(
    State(ledger): State<BillingState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let invoices = ledger.by_patient(&patient_id);
    let total = invoices.len();
    Ok(Json(success_list(invoices, total)))
}

#[axum::debug_handler]
pub async fn overdue_invoices(
    State(ledger): State<BillingState>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let invoices = ledger.overdue();
    let total = invoices.len();
    Ok(Json(success_list(invoices, total)))
}

#[axum::debug_handler]
pub async fn add_invoice_item(
    State(ledger): State<BillingState>,
    Path(invoice_id): Path<String>,
    Json(request): Json<InvoiceItemRequest>,
) -> Result<Json<Value>, AppError> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }
    if request.unit_price < 0.0 {
        return Err(AppError::BadRequest(
            "unit_price cannot be negative".to_string(),
        ));
    }

    let mut ledger = ledger.write().await;
    if !ledger.add_item(
        &invoice_id,
        request.description,
        request.quantity,
        request.unit_price,
        request.service_code,
    ) {
        return Err(AppError::NotFound(format!("Invoice {invoice_id} not found")));
    }
    let invoice = ledger.get(&invoice_id).expect("existence checked above");
    Ok(Json(success(invoice)))
}

#[axum::debug_handler]
pub async fn record_payment(
    State(ledger): State<BillingState>,
    Path(invoice_id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Value>, AppError> {
    if request.amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be positive".to_string()));
    }

    let mut ledger = ledger.write().await;
    ledger
        .record_payment(
            &invoice_id,
            request.amount,
            request.payment_method,
            request.reference,
            request.notes,
        )
        .ok_or_else(|| AppError::NotFound(format!("Invoice {invoice_id} not found")))?;
    let invoice = ledger.get(&invoice_id).expect("existence checked above");
    Ok(Json(success(invoice)))
}

#[axum::debug_handler]
pub async fn set_insurance_info(
    State(ledger): State<BillingState>,
    Path(invoice_id): Path<String>,
    Json(request): Json<InsuranceInfoRequest>,
) -> Result<Json<Value>, AppError> {
    let info = InsuranceInfo {
        provider: request.provider,
        policy_number: request.policy_number,
        group_number: request.group_number,
        coverage_percentage: request.coverage_percentage,
    };

    let mut ledger = ledger.write().await;
    if !ledger.set_insurance_info(&invoice_id, info) {
        return Err(AppError::NotFound(format!("Invoice {invoice_id} not found")));
    }
    let invoice = ledger.get(&invoice_id).expect("existence checked above");
    Ok(Json(success(invoice)))
}

#[axum::debug_handler]
pub async fn list_claims(
    State(ledger): State<BillingState>,
    Query(filter): Query<ClaimFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let claims = match filter.status {
        Some(status) => ledger.claims_by_status(status),
        None => ledger.all_claims(),
    };
    let total = claims.len();
    Ok(Json(success_list(page.apply(claims), total)))
}

#[axum::debug_handler]
pub async fn create_claim(
    State(ledger): State<BillingState>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    for (value, field) in [
        (&request.patient_id, "patient_id"),
        (&request.invoice_id, "invoice_id"),
        (&request.insurance_provider, "insurance_provider"),
        (&request.policy_number, "policy_number"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required field: {field}"
            )));
        }
    }

    let mut ledger = ledger.write().await;
    let claim = ledger.create_claim(
        request.patient_id,
        request.invoice_id,
        request.insurance_provider,
        request.policy_number,
    );
    Ok((StatusCode::CREATED, Json(success(claim))))
}

#[axum::debug_handler]
pub async fn get_claim(
    State(ledger): State<BillingState>,
    Path(claim_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let claim = ledger
        .get_claim(&claim_id)
        .ok_or_else(|| AppError::NotFound(format!("Claim {claim_id} not found")))?;
    Ok(Json(success(claim)))
}

#[axum::debug_handler]
pub async fn claims_by_patient(
    State(ledger): State<BillingState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    let claims = ledger.claims_by_patient(&patient_id);
    let total = claims.len();
    Ok(Json(success_list(claims, total)))
}

#[axum::debug_handler]
pub async fn update_claim_status(
    State(ledger): State<BillingState>,
    Path(claim_id): Path<String>,
    Json(request): Json<ClaimStatusRequest>,
) -> Result<Json<Value>, AppError> {
    if request.approved_amount < 0.0 || request.denied_amount < 0.0 {
        return Err(AppError::BadRequest(
            "amounts cannot be negative".to_string(),
        ));
    }

    let mut ledger = ledger.write().await;
    let claim = ledger
        .update_claim_status(
            &claim_id,
            request.status,
            request.approved_amount,
            request.denied_amount,
            request.notes,
        )
        .ok_or_else(|| AppError::NotFound(format!("Claim {claim_id} not found")))?;
    Ok(Json(success(claim)))
}

#[axum::debug_handler]
pub async fn billing_statistics(
    State(ledger): State<BillingState>,
) -> Result<Json<Value>, AppError> {
    let ledger = ledger.read().await;
    Ok(Json(success(ledger.statistics())))
}
