//! Payment notification domain: classification, parsing, persistence and
//! the batch endpoint.

mod endpoint;
mod event_code;
mod factory;
mod item;
mod log_sink;
mod memory_sink;
mod postgres_sink;
mod sink;

pub use endpoint::{AcknowledgmentResponse, BatchOutcome, NotificationEndpoint, ACCEPTED};
pub use event_code::EventCode;
pub use factory::create_notification_sink;
pub use item::{NotificationBatch, NotificationItem};
pub use log_sink::LogSink;
pub use memory_sink::{MemorySink, RecordedNotification};
pub use postgres_sink::PostgresSink;
pub use sink::{NotificationSink, RequestMetadata};
