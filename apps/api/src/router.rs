use axum::{routing::get, Router};

use billing_cell::router::billing_routes;
use dentist_cell::router::dentist_routes;
use notification_cell::router::notification_routes;
use patient_cell::router::patient_routes;
use scheduling_cell::router::appointment_routes;
use voice_cell::router::voice_routes;

pub struct AppState {
    pub engine: scheduling_cell::handlers::SchedulingState,
    pub directory: patient_cell::handlers::PatientState,
    pub roster: dentist_cell::handlers::DentistState,
    pub ledger: billing_cell::handlers::BillingState,
    pub outbox: notification_cell::handlers::NotificationState,
    pub voice: voice_cell::handlers::VoiceState,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental Practice API is running!" }))
        .nest("/appointments", appointment_routes(state.engine))
        .nest("/patients", patient_routes(state.directory))
        .nest("/dentists", dentist_routes(state.roster))
        .nest("/billing", billing_routes(state.ledger))
        .nest("/notifications", notification_routes(state.outbox))
        .nest("/voice", voice_routes(state.voice))
}
