//! In-memory notification sink.
//!
//! Keeps notifications in arrival order up to a fixed capacity. Contents
//! are lost on restart; useful for local development and tests.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use super::sink::{NotificationSink, RequestMetadata};
use super::NotificationItem;

/// A notification together with the request it arrived in.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedNotification {
    pub metadata: RequestMetadata,
    pub item: NotificationItem,
}

/// In-memory sink with a hard capacity.
///
/// Once full, further notifications are refused (`record` returns
/// `false`) rather than evicting older ones, so the sender keeps retrying
/// until space is made with `clear`.
pub struct MemorySink {
    records: RwLock<Vec<RecordedNotification>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            capacity,
        }
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub async fn records(&self) -> Vec<RecordedNotification> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Remove all records, returning how many were dropped.
    pub async fn clear(&self) -> usize {
        let mut records = self.records.write().await;
        let count = records.len();
        records.clear();
        count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn record(&self, metadata: &RequestMetadata, item: &NotificationItem) -> bool {
        let mut records = self.records.write().await;

        if records.len() >= self.capacity {
            tracing::warn!(
                capacity = self.capacity,
                psp_reference = ?item.psp_reference(),
                "Memory sink full, notification not recorded"
            );
            return false;
        }

        records.push(RecordedNotification {
            metadata: metadata.clone(),
            item: item.clone(),
        });

        tracing::debug!(
            request_id = %metadata.request_id,
            stored = records.len(),
            "Notification stored in memory"
        );

        true
    }
}
