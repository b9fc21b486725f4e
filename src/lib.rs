// Shared infrastructure
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
pub mod telemetry;

// Domain
pub mod notification;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod shutdown;
