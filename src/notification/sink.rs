//! Persistence seam for received notifications.
//!
//! The endpoint hands every notification to a `NotificationSink`, which
//! decides how (and whether) it is stored. Implementations report the
//! outcome as a plain boolean so a storage hiccup never aborts the rest of
//! the batch.

use async_trait::async_trait;
use axum::http::{header, request::Parts};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::NotificationItem;

const REDACTED: &str = "<redacted>";

/// Information about the HTTP request a notification arrived in.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMetadata {
    /// Identifier generated for this request
    pub request_id: Uuid,

    /// When the request was received
    pub received_at: DateTime<Utc>,

    pub method: String,

    pub uri: String,

    /// Request headers in arrival order, with `Authorization` redacted
    pub headers: Vec<(String, String)>,
}

impl RequestMetadata {
    pub fn from_parts(parts: &Parts) -> Self {
        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if *name == header::AUTHORIZATION {
                    REDACTED.to_string()
                } else {
                    String::from_utf8_lossy(value.as_bytes()).into_owned()
                };
                (name.as_str().to_string(), value)
            })
            .collect();

        Self {
            request_id: Uuid::new_v4(),
            received_at: Utc::now(),
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Destination for received notifications.
///
/// # Thread Safety
///
/// Implementations are shared across concurrent requests and must be
/// `Send + Sync`.
///
/// # Error Handling
///
/// `record` never fails: `false` means "not stored", and the sender will
/// redeliver the whole batch. Implementations log the cause themselves.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Backend type identifier, e.g. `"log"` or `"postgres"`.
    fn backend_type(&self) -> &'static str;

    /// Store one notification. Returns `true` when it was recorded.
    async fn record(&self, metadata: &RequestMetadata, item: &NotificationItem) -> bool;
}
