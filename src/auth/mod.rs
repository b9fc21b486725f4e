mod basic;
mod credentials;

pub use basic::{BasicAuthenticator, BasicCredentials};
pub use credentials::NotificationCredentials;
