use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::info;

use crate::models::{VoiceQueryRequest, VoiceQueryResult};
use crate::services::processor::VoiceProcessor;

pub type VoiceState = Arc<VoiceProcessor>;

/// Resolve one utterance. Unlike the data cells this returns the result
/// document directly rather than an envelope, because the result carries
/// its own `success` flag: a missing transcript is a failed query, not a
/// transport error.
#[axum::debug_handler]
pub async fn process_query(
    State(processor): State<VoiceState>,
    Json(request): Json<VoiceQueryRequest>,
) -> Json<VoiceQueryResult> {
    let result = processor.process(request.text.as_deref());
    if let Some(intent) = result.intent {
        info!("Voice query resolved to intent {}", intent);
    }
    Json(result)
}
