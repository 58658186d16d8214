use axum::{routing::post, Router};

use crate::handlers::{self, VoiceState};

pub fn voice_routes(state: VoiceState) -> Router {
    Router::new()
        .route("/process", post(handlers::process_query))
        .with_state(state)
}
