use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::notification::{NotificationEndpoint, NotificationSink};
use crate::postgres::PostgresPool;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub endpoint: Arc<NotificationEndpoint>,
    pub postgres: Option<Arc<PostgresPool>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        settings: Settings,
        sink: Arc<dyn NotificationSink>,
        postgres: Option<Arc<PostgresPool>>,
    ) -> Self {
        let endpoint = Arc::new(NotificationEndpoint::from_config(&settings.notification, sink));

        Self {
            settings: Arc::new(settings),
            endpoint,
            postgres,
            started_at: Instant::now(),
        }
    }
}
