use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, PatientState};

pub fn patient_routes(state: PatientState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route("/search", get(handlers::search_patients))
        .route("/statistics", get(handlers::patient_statistics))
        .route("/by-insurance/{provider}", get(handlers::patients_by_insurance))
        .route("/lookup/email/{email}", get(handlers::lookup_by_email))
        .route("/lookup/phone/{phone}", get(handlers::lookup_by_phone))
        .route(
            "/{patient_id}",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route(
            "/{patient_id}/medical-history",
            post(handlers::add_medical_history),
        )
        .route("/{patient_id}/treatments", post(handlers::add_treatment))
        .route("/{patient_id}/notes", post(handlers::add_note))
        .with_state(state)
}
