//! Prometheus metrics for the notification receiver.
//!
//! - Request metrics (outcome of each inbound batch)
//! - Item metrics (received by event code, recorded, failed)
//! - Batch size and handling latency

mod helpers;

pub use helpers::{encode_metrics, NotificationMetrics, RequestOutcome};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "receiver";

lazy_static! {
    /// Inbound notification requests by outcome
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_requests_total", METRIC_PREFIX),
        "Total notification requests by outcome",
        &["outcome"]
    ).unwrap();

    /// Notification items received, by event code
    pub static ref ITEMS_RECEIVED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_items_received_total", METRIC_PREFIX),
        "Total notification items received by event code",
        &["event_code"]
    ).unwrap();

    /// Items the sink reported as recorded
    pub static ref ITEMS_RECORDED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_items_recorded_total", METRIC_PREFIX),
        "Total notification items recorded by the sink"
    ).unwrap();

    /// Items the sink failed to record
    pub static ref ITEMS_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_items_failed_total", METRIC_PREFIX),
        "Total notification items the sink failed to record"
    ).unwrap();

    /// Items per batch
    pub static ref BATCH_SIZE: Histogram = register_histogram!(
        format!("{}_batch_size", METRIC_PREFIX),
        "Distribution of notification items per request",
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]
    ).unwrap();

    /// Time spent handling one request
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        format!("{}_request_latency_seconds", METRIC_PREFIX),
        "Notification request handling latency in seconds",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).unwrap();
}
