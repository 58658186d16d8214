pub mod outbox;

pub use outbox::{spawn_sweeper, NotificationOutbox};
