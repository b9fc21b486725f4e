use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::notifications::receive_notifications;

/// Routes served by the receiver; `notification_path` is where the
/// payment provider posts its batches.
pub fn api_routes(notification_path: &str) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Provider callbacks
        .route(notification_path, post(receive_notifications))
}
