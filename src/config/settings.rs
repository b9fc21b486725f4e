use std::env;
use std::fmt;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub notification: NotificationConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Inbound notification endpoint settings.
///
/// `username` and `password` are the credentials the payment provider is
/// configured to send in the `Authorization` header.
#[derive(Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_path")]
    pub path: String,
    pub username: String,
    pub password: String,
    /// Upper bound on the request body read into memory
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkConfig {
    /// One of `log`, `memory` or `postgres`
    #[serde(default = "default_sink_backend")]
    pub backend: String,
    /// Maximum records held by the memory backend
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human readable ones
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_notification_path() -> String {
    "/notifications".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_sink_backend() -> String {
    "log".to_string()
}

fn default_memory_capacity() -> usize {
    10_000
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_idle_timeout() -> u64 {
    300 // 5 minutes
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "payment-notification-receiver".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("notification.path", default_notification_path())?
            .set_default("sink.backend", default_sink_backend())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // RECEIVER__NOTIFICATION__USERNAME, RECEIVER__DATABASE__URL, etc.
            .add_source(
                Environment::with_prefix("RECEIVER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Deserialize settings from an already assembled configuration.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl NotificationConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            path: default_notification_path(),
            username: username.into(),
            password: password.into(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("path", &self.path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            backend: default_sink_backend(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn settings_from_toml(toml: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Settings::from_config(config)
    }

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);

        let sink = SinkConfig::default();
        assert_eq!(sink.backend, "log");
        assert_eq!(sink.memory_capacity, 10_000);
    }

    #[test]
    fn test_minimal_settings() {
        let settings = settings_from_toml(
            r#"
            [notification]
            username = "TestUser"
            password = "TestPassword"
            "#,
        )
        .unwrap();

        assert_eq!(settings.notification.username, "TestUser");
        assert_eq!(settings.notification.password, "TestPassword");
        assert_eq!(settings.notification.path, "/notifications");
        assert_eq!(settings.notification.max_body_bytes, 1024 * 1024);
        assert_eq!(settings.sink.backend, "log");
        assert!(settings.database.is_none());
        assert!(!settings.otel.enabled);
        assert!(!settings.logging.json);
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_credentials_are_required() {
        let result = settings_from_toml(
            r#"
            [notification]
            username = "TestUser"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_database_section() {
        let settings = settings_from_toml(
            r#"
            [notification]
            username = "u"
            password = "p"

            [sink]
            backend = "postgres"

            [database]
            url = "postgres://localhost/notifications"
            pool_size = 4
            "#,
        )
        .unwrap();

        let database = settings.database.unwrap();
        assert_eq!(settings.sink.backend, "postgres");
        assert_eq!(database.pool_size, 4);
        assert_eq!(database.connect_timeout_seconds, 5);
        assert_eq!(database.idle_timeout_seconds, 300);
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = NotificationConfig::new("TestUser", "s3cret");
        let output = format!("{:?}", config);
        assert!(output.contains("TestUser"));
        assert!(!output.contains("s3cret"));
    }
}
