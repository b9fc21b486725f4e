//! Payment provider notification callback.

use axum::extract::{Request, State};

use crate::error::Result;
use crate::notification::BatchOutcome;
use crate::server::AppState;

/// POST {notification.path} - receive a batch of payment notifications
///
/// Responds with `{"notificationResponse":"[accepted]"}` once every item is
/// recorded, and with an empty 200 otherwise so the provider retries.
pub async fn receive_notifications(
    State(state): State<AppState>,
    request: Request,
) -> Result<BatchOutcome> {
    state.endpoint.handle(request).await
}
