use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, SchedulingState};

pub fn appointment_routes(state: SchedulingState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route("/available-slots", get(handlers::available_slots))
        .route("/upcoming", get(handlers::upcoming_appointments))
        .route("/overdue", get(handlers::overdue_appointments))
        .route("/statistics", get(handlers::appointment_statistics))
        .route("/types", get(handlers::appointment_types))
        .route("/statuses", get(handlers::appointment_statuses))
        .route("/by-patient/{patient_id}", get(handlers::appointments_by_patient))
        .route("/by-dentist/{dentist_id}", get(handlers::appointments_by_dentist))
        .route("/by-date/{date}", get(handlers::appointments_by_date))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::cancel_appointment),
        )
        .route(
            "/{appointment_id}/treatment-notes",
            post(handlers::add_treatment_note),
        )
        .with_state(state)
}
