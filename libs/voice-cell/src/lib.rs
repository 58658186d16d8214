pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::voice_routes;
pub use services::processor::{Transcriber, VoiceProcessor};
