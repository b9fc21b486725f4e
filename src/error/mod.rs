use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Challenge sent with 401 responses
const WWW_AUTHENTICATE_CHALLENGE: &str = "Basic realm=\"notifications\"";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// No usable credential material in the request
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Credentials were supplied but do not match
    #[error("Forbidden: credentials rejected")]
    Forbidden,

    /// Request body is not a valid notification batch
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, generic_message, log_message) = match self {
            // Auth failures carry no body, only the status.
            AppError::Unauthenticated(reason) => {
                tracing::warn!(reason = %reason, "Rejected unauthenticated notification request");
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_CHALLENGE)],
                )
                    .into_response();
            }
            AppError::Forbidden => {
                tracing::warn!("Rejected notification request with invalid credentials");
                return StatusCode::FORBIDDEN.into_response();
            }
            AppError::Config(e) => ("CONFIG_ERROR", "Configuration error", e.to_string()),
            AppError::MalformedPayload(msg) => ("MALFORMED_PAYLOAD", "Internal server error", msg),
            AppError::Internal(msg) => ("INTERNAL_ERROR", "Internal server error", msg),
        };
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "API error"
        );

        let client_message = if is_production() {
            generic_message.to_string()
        } else {
            log_message
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
