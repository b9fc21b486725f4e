mod settings;

pub use settings::{
    DatabaseConfig, LoggingConfig, NotificationConfig, OtelConfig, ServerConfig, Settings, SinkConfig,
};
