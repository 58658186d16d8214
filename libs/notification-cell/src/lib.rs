pub mod channels;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use channels::{DeliveryChannel, DeliveryError, LogEmailChannel, LogSmsChannel};
pub use models::*;
pub use router::notification_routes;
pub use services::outbox::{spawn_sweeper, NotificationOutbox};
