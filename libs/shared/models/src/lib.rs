pub mod api;
pub mod error;

pub use api::*;
pub use error::AppError;
