//! Notification sink factory

use std::sync::Arc;

use crate::config::SinkConfig;
use crate::postgres::PostgresPool;

use super::log_sink::LogSink;
use super::memory_sink::MemorySink;
use super::postgres_sink::PostgresSink;
use super::sink::NotificationSink;

/// Create a notification sink based on configuration.
///
/// Returns the appropriate implementation for the `backend` setting:
/// - `"postgres"`: a `PostgresSink` if a PostgreSQL pool is provided
/// - `"memory"`: a bounded `MemorySink`
/// - `"log"` (default): a `LogSink`
///
/// # Example
///
/// ```rust,ignore
/// let sink = create_notification_sink(&settings.sink, Some(pg_pool.clone()));
/// ```
pub fn create_notification_sink(
    settings: &SinkConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn NotificationSink> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL notification sink");
                Arc::new(PostgresSink::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL sink requested but no pool provided, falling back to log"
                );
                Arc::new(LogSink::new())
            }
        }
        "memory" => {
            tracing::info!(
                backend = "memory",
                capacity = settings.memory_capacity,
                "Creating memory notification sink"
            );
            Arc::new(MemorySink::new(settings.memory_capacity))
        }
        "log" => {
            tracing::info!(backend = "log", "Creating log notification sink");
            Arc::new(LogSink::new())
        }
        other => {
            tracing::warn!(backend = %other, "Unknown sink backend, falling back to log");
            Arc::new(LogSink::new())
        }
    }
}
