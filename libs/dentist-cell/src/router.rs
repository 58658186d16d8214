use axum::{routing::get, Router};

use crate::handlers::{self, DentistState};

pub fn dentist_routes(state: DentistState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_dentists).post(handlers::create_dentist),
        )
        .route("/specialties", get(handlers::dentist_specialties))
        .route(
            "/{dentist_id}",
            get(handlers::get_dentist).put(handlers::update_dentist),
        )
        .with_state(state)
}
