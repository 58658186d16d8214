use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{self, BillingState};

pub fn billing_routes(state: BillingState) -> Router {
    Router::new()
        .route(
            "/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route("/invoices/overdue", get(handlers::overdue_invoices))
        .route(
            "/invoices/by-patient/{patient_id}",
            get(handlers::invoices_by_patient),
        )
        .route("/invoices/{invoice_id}", get(handlers::get_invoice))
        .route("/invoices/{invoice_id}/items", post(handlers::add_invoice_item))
        .route(
            "/invoices/{invoice_id}/payments",
            post(handlers::record_payment),
        )
        .route(
            "/invoices/{invoice_id}/insurance",
            post(handlers::set_insurance_info),
        )
        .route(
            "/claims",
            get(handlers::list_claims).post(handlers::create_claim),
        )
        .route(
            "/claims/by-patient/{patient_id}",
            get(handlers::claims_by_patient),
        )
        .route("/claims/{claim_id}", get(handlers::get_claim))
        .route("/claims/{claim_id}/status", put(handlers::update_claim_status))
        .route("/statistics", get(handlers::billing_statistics))
        .with_state(state)
}
