use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use payment_notification_receiver::config::Settings;
use payment_notification_receiver::notification::{create_notification_sink, PostgresSink};
use payment_notification_receiver::postgres::PostgresPool;
use payment_notification_receiver::server::{create_app, AppState};
use payment_notification_receiver::shutdown::shutdown_signal;
use payment_notification_receiver::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.logging, &settings.otel)?;
    tracing::info!(
        path = %settings.notification.path,
        sink = %settings.sink.backend,
        "Configuration loaded"
    );

    // Connect to PostgreSQL only when the sink needs it
    let postgres = match (&settings.database, settings.sink.backend.as_str()) {
        (Some(database), "postgres") => {
            let pool = PostgresPool::connect(database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            PostgresSink::new(pool.pool().clone())
                .ensure_schema()
                .await
                .context("Failed to prepare notification table")?;
            Some(Arc::new(pool))
        }
        (None, "postgres") => {
            tracing::warn!("Sink backend is postgres but no [database] section is configured");
            None
        }
        _ => None,
    };

    let sink = create_notification_sink(&settings.sink, postgres.clone());

    // Create application state
    let state = AppState::new(settings.clone(), sink, postgres.clone());
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = postgres {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
