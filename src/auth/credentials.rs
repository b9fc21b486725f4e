use std::fmt;

use crate::config::NotificationConfig;

/// The username/password pair the payment provider must present.
#[derive(Clone, PartialEq, Eq)]
pub struct NotificationCredentials {
    username: String,
    password: String,
}

impl NotificationCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for NotificationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
