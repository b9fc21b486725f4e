//! Handling of one inbound notification batch.
//!
//! Flow: authenticate from headers, read and parse the body, hand every
//! item to the sink in order, then acknowledge only if all were recorded.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{BasicAuthenticator, NotificationCredentials};
use crate::config::NotificationConfig;
use crate::error::{AppError, Result};
use crate::metrics::{NotificationMetrics, RequestOutcome};

use super::sink::{NotificationSink, RequestMetadata};
use super::NotificationBatch;

/// Value the sender expects before it stops redelivering a batch
pub const ACCEPTED: &str = "[accepted]";

/// Body returned once every item of a batch has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgmentResponse {
    pub notification_response: String,
}

impl AcknowledgmentResponse {
    pub fn accepted() -> Self {
        Self {
            notification_response: ACCEPTED.to_string(),
        }
    }
}

/// Result of processing a batch that passed authentication and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every item was recorded; acknowledge.
    Accepted,
    /// At least one item was not recorded. Nothing is written back, and
    /// the sender redelivers the whole batch later.
    NotAccepted { recorded: usize, total: usize },
}

impl BatchOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl IntoResponse for BatchOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => Json(AcknowledgmentResponse::accepted()).into_response(),
            Self::NotAccepted { .. } => StatusCode::OK.into_response(),
        }
    }
}

/// Receives batched payment notifications.
pub struct NotificationEndpoint {
    authenticator: BasicAuthenticator,
    sink: Arc<dyn NotificationSink>,
    max_body_bytes: usize,
}

impl NotificationEndpoint {
    pub fn new(
        credentials: NotificationCredentials,
        sink: Arc<dyn NotificationSink>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            authenticator: BasicAuthenticator::new(credentials),
            sink,
            max_body_bytes,
        }
    }

    pub fn from_config(config: &NotificationConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self::new(
            NotificationCredentials::from_config(config),
            sink,
            config.max_body_bytes,
        )
    }

    pub fn sink(&self) -> &Arc<dyn NotificationSink> {
        &self.sink
    }

    /// Handle one request end to end.
    ///
    /// The body is not touched unless authentication succeeds.
    #[tracing::instrument(
        name = "notification.handle",
        skip(self, request),
        fields(method = %request.method(), uri = %request.uri())
    )]
    pub async fn handle(&self, request: Request<Body>) -> Result<BatchOutcome> {
        let start = Instant::now();
        let result = self.process(request).await;

        let outcome = match &result {
            Ok(BatchOutcome::Accepted) => RequestOutcome::Accepted,
            Ok(BatchOutcome::NotAccepted { .. }) => RequestOutcome::NotAccepted,
            Err(AppError::Unauthenticated(_)) => RequestOutcome::Unauthenticated,
            Err(AppError::Forbidden) => RequestOutcome::Forbidden,
            Err(AppError::MalformedPayload(_)) => RequestOutcome::Malformed,
            Err(_) => RequestOutcome::Failed,
        };
        NotificationMetrics::record_request(outcome, start.elapsed());

        result
    }

    async fn process(&self, request: Request<Body>) -> Result<BatchOutcome> {
        let (parts, body) = request.into_parts();

        self.authenticator.authenticate(&parts.headers)?;

        let bytes = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| AppError::MalformedPayload(format!("Failed to read body: {}", e)))?;
        let batch = NotificationBatch::from_slice(&bytes)?;
        let metadata = RequestMetadata::from_parts(&parts);

        Ok(self.record_batch(&metadata, &batch).await)
    }

    /// Classify and record every item in arrival order.
    ///
    /// A failed item never stops the ones after it.
    pub async fn record_batch(
        &self,
        metadata: &RequestMetadata,
        batch: &NotificationBatch,
    ) -> BatchOutcome {
        let total = batch.len();
        let mut recorded = 0;

        NotificationMetrics::record_batch_size(total);

        for (index, item) in batch.items().iter().enumerate() {
            let event_code = item.event_code();
            NotificationMetrics::record_item_received(&event_code);

            tracing::debug!(
                request_id = %metadata.request_id,
                index = index,
                event_code = %event_code,
                recognized = event_code.is_recognized(),
                psp_reference = ?item.psp_reference(),
                "Processing notification"
            );

            let saved = self.sink.record(metadata, item).await;
            NotificationMetrics::record_item_outcome(saved);

            if saved {
                recorded += 1;
            } else {
                tracing::warn!(
                    request_id = %metadata.request_id,
                    index = index,
                    event_code = %event_code,
                    psp_reference = ?item.psp_reference(),
                    sink = self.sink.backend_type(),
                    "Notification not recorded"
                );
            }
        }

        if recorded == total {
            tracing::info!(
                request_id = %metadata.request_id,
                items = total,
                "Notification batch accepted"
            );
            BatchOutcome::Accepted
        } else {
            tracing::warn!(
                request_id = %metadata.request_id,
                recorded = recorded,
                total = total,
                "Notification batch not accepted, sender will retry"
            );
            BatchOutcome::NotAccepted { recorded, total }
        }
    }
}
