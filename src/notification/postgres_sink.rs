//! PostgreSQL-backed notification sink.
//!
//! Each notification becomes one row in `payment_notifications`. The
//! provider redelivers whole batches until it is acknowledged, so rows
//! are deduplicated on the notification's natural key and a repeated
//! delivery still counts as recorded.
//!
//! Key columns the item does not carry are stored as NULL. NULLs never
//! conflict, so notifications without a complete key are always inserted.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::sink::{NotificationSink, RequestMetadata};
use super::NotificationItem;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS payment_notifications (
    id                    UUID PRIMARY KEY,
    request_id            UUID NOT NULL,
    received_at           TIMESTAMPTZ NOT NULL,
    event_code            TEXT NOT NULL,
    psp_reference         TEXT,
    success               TEXT,
    event_date            TEXT,
    original_reference    TEXT,
    merchant_reference    TEXT,
    merchant_account_code TEXT,
    live                  TEXT,
    payload               JSONB NOT NULL,
    headers               JSONB NOT NULL,
    UNIQUE (psp_reference, event_code, success, event_date)
)
"#;

const INSERT_SQL: &str = r#"
INSERT INTO payment_notifications (
    id, request_id, received_at, event_code, psp_reference, success, event_date,
    original_reference, merchant_reference, merchant_account_code, live, payload, headers
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
ON CONFLICT (psp_reference, event_code, success, event_date) DO NOTHING
"#;

/// PostgreSQL notification sink.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the notifications table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        tracing::info!("payment_notifications table ready");
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for PostgresSink {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn record(&self, metadata: &RequestMetadata, item: &NotificationItem) -> bool {
        let row = NotificationRow::from_item(item);

        let result = sqlx::query(INSERT_SQL)
            .bind(Uuid::new_v4())
            .bind(metadata.request_id)
            .bind(metadata.received_at)
            .bind(&row.event_code)
            .bind(&row.psp_reference)
            .bind(&row.success)
            .bind(&row.event_date)
            .bind(item.original_reference())
            .bind(item.merchant_reference())
            .bind(item.merchant_account_code())
            .bind(item.live().map(scalar_text))
            .bind(Json(item.fields()))
            .bind(Json(headers_object(metadata)))
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                if done.rows_affected() == 0 {
                    tracing::debug!(
                        psp_reference = ?row.psp_reference,
                        event_code = %row.event_code,
                        "Duplicate notification ignored"
                    );
                }
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    request_id = %metadata.request_id,
                    psp_reference = ?row.psp_reference,
                    event_code = %row.event_code,
                    "Failed to store notification in PostgreSQL"
                );
                false
            }
        }
    }
}

/// Natural-key columns; absent values stay `None` and bind as NULL.
struct NotificationRow {
    event_code: String,
    psp_reference: Option<String>,
    success: Option<String>,
    event_date: Option<String>,
}

impl NotificationRow {
    fn from_item(item: &NotificationItem) -> Self {
        Self {
            event_code: item.event_code_raw(),
            psp_reference: item.psp_reference().map(str::to_string),
            success: item
                .success()
                .filter(|value| !value.is_null())
                .map(scalar_text),
            event_date: item.event_date().map(str::to_string),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn headers_object(metadata: &RequestMetadata) -> Map<String, Value> {
    metadata
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect()
}
