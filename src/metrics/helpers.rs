//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::notification::EventCode;

use super::{
    BATCH_SIZE, ITEMS_FAILED_TOTAL, ITEMS_RECEIVED_TOTAL, ITEMS_RECORDED_TOTAL, REQUESTS_TOTAL,
    REQUEST_LATENCY,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// How a notification request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Accepted,
    NotAccepted,
    Unauthenticated,
    Forbidden,
    Malformed,
    Failed,
}

impl RequestOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::NotAccepted => "not_accepted",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::Malformed => "malformed",
            Self::Failed => "failed",
        }
    }
}

/// Helper struct for recording notification metrics
pub struct NotificationMetrics;

impl NotificationMetrics {
    /// Record the outcome and duration of one request
    pub fn record_request(outcome: RequestOutcome, elapsed: Duration) {
        REQUESTS_TOTAL.with_label_values(&[outcome.as_label()]).inc();
        REQUEST_LATENCY.observe(elapsed.as_secs_f64());
    }

    /// Record the number of items in a parsed batch
    pub fn record_batch_size(size: usize) {
        BATCH_SIZE.observe(size as f64);
    }

    /// Record one item by event code
    pub fn record_item_received(event_code: &EventCode) {
        ITEMS_RECEIVED_TOTAL
            .with_label_values(&[event_code.metric_label()])
            .inc();
    }

    /// Record the sink outcome for one item
    pub fn record_item_outcome(recorded: bool) {
        if recorded {
            ITEMS_RECORDED_TOTAL.inc();
        } else {
            ITEMS_FAILED_TOTAL.inc();
        }
    }
}
