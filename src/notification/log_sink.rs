//! Sink that writes every notification to the application log.

use async_trait::async_trait;

use super::sink::{NotificationSink, RequestMetadata};
use super::NotificationItem;

/// Timestamp layout used in the log record, e.g. `17-10-2026 09:15:02.123`
const RECEIVED_AT_FORMAT: &str = "%d-%m-%Y %H:%M:%S%.3f";

/// Logs the request headers and the notification body at `info`.
///
/// Nothing is retained, so every notification counts as recorded.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogSink {
    fn backend_type(&self) -> &'static str {
        "log"
    }

    async fn record(&self, metadata: &RequestMetadata, item: &NotificationItem) -> bool {
        let headers = metadata
            .headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join(", ");

        tracing::info!(
            request_id = %metadata.request_id,
            received_at = %metadata.received_at.format(RECEIVED_AT_FORMAT),
            event_code = %item.event_code(),
            headers = %headers,
            notification = %item.to_json(),
            "Received notification"
        );

        true
    }
}
