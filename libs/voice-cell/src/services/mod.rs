pub mod processor;

pub use processor::{Transcriber, VoiceProcessor};
