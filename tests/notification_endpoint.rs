//! Router-level tests for the notification callback.
//!
//! The sink is replaced by a spy that remembers call order and can be told
//! to refuse specific calls, so every acknowledgment rule is observable
//! without a database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde_json::{json, Value};
use tower::ServiceExt;

use payment_notification_receiver::config::{
    LoggingConfig, NotificationConfig, OtelConfig, ServerConfig, Settings, SinkConfig,
};
use payment_notification_receiver::notification::{
    MemorySink, NotificationItem, NotificationSink, RequestMetadata,
};
use payment_notification_receiver::server::{create_app, AppState};

const USERNAME: &str = "TestUser";
const PASSWORD: &str = "TestPassword";
const PATH: &str = "/notifications";

/// Sink that records the order of calls and refuses the listed call indices
#[derive(Default)]
struct SpySink {
    calls: Mutex<Vec<String>>,
    refuse: HashSet<usize>,
}

impl SpySink {
    fn refusing(indices: &[usize]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            refuse: indices.iter().copied().collect(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for SpySink {
    fn backend_type(&self) -> &'static str {
        "spy"
    }

    async fn record(&self, _metadata: &RequestMetadata, item: &NotificationItem) -> bool {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(item.psp_reference().unwrap_or_default().to_string());
        !self.refuse.contains(&index)
    }
}

fn create_settings() -> Settings {
    let mut notification = NotificationConfig::new(USERNAME, PASSWORD);
    notification.path = PATH.to_string();

    Settings {
        server: ServerConfig::default(),
        notification,
        sink: SinkConfig::default(),
        database: None,
        logging: LoggingConfig::default(),
        otel: OtelConfig::default(),
    }
}

fn create_router(sink: Arc<dyn NotificationSink>) -> Router {
    create_app(AppState::new(create_settings(), sink, None))
}

fn create_router_with_body_limit(
    sink: Arc<dyn NotificationSink>,
    max_body_bytes: usize,
) -> Router {
    let mut settings = create_settings();
    settings.notification.max_body_bytes = max_body_bytes;
    create_app(AppState::new(settings, sink, None))
}

fn encoded_credentials(user: &str, password: &str) -> String {
    BASE64_STANDARD.encode(format!("{}:{}", user, password))
}

fn batch(items: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(event_code, psp_reference)| {
            json!({
                "NotificationRequestItem": {
                    "live": "false",
                    "eventCode": event_code,
                    "pspReference": psp_reference,
                    "merchantAccountCode": "TestMerchant",
                    "merchantReference": "order-42",
                    "eventDate": "2026-10-17T09:15:02+02:00",
                    "success": "true",
                    "paymentMethod": "visa",
                    "operations": ["CANCEL", "CAPTURE", "REFUND"],
                    "reason": "",
                    "currency": "EUR"
                }
            })
        })
        .collect();
    json!({ "live": "false", "notificationItems": items })
}

fn post(authorization: Option<String>, body: Body) -> Request<Body> {
    let mut builder = Request::post(PATH).header(header::CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(body).unwrap()
}

fn authorized(body: &Value) -> Request<Body> {
    post(
        Some(format!("Basic {}", encoded_credentials(USERNAME, PASSWORD))),
        Body::from(serde_json::to_vec(body).unwrap()),
    )
}

/// Body that flips `polled` the first time anything reads it
fn spy_body(polled: Arc<AtomicBool>, payload: Value) -> Body {
    let stream = futures::stream::once(async move {
        polled.store(true, Ordering::SeqCst);
        Ok::<_, std::io::Error>(Bytes::from(serde_json::to_vec(&payload).unwrap()))
    });
    Body::from_stream(stream)
}

async fn body_bytes(response: axum::response::Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

// =============================================================================
// Authentication
// =============================================================================

mod authentication_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_header_is_401_without_reading_body() {
        let sink = Arc::new(SpySink::default());
        let polled = Arc::new(AtomicBool::new(false));

        let response = create_router(sink.clone())
            .oneshot(post(None, spy_body(polled.clone(), batch(&[("CAPTURE", "p1")]))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!polled.load(Ordering::SeqCst));
        assert!(body_bytes(response).await.is_empty());
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_credentials_are_403_without_reading_body() {
        let sink = Arc::new(SpySink::default());
        let polled = Arc::new(AtomicBool::new(false));
        let header = format!("Basic {}", encoded_credentials(USERNAME, "wrong"));

        let response = create_router(sink.clone())
            .oneshot(post(
                Some(header),
                spy_body(polled.clone(), batch(&[("CAPTURE", "p1")])),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!polled.load(Ordering::SeqCst));
        assert!(body_bytes(response).await.is_empty());
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_username_is_403() {
        let header = format!("Basic {}", encoded_credentials("testuser", PASSWORD));

        let response = create_router(Arc::new(SpySink::default()))
            .oneshot(post(Some(header), Body::from("{}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_header_is_401() {
        for header in [
            "Basic".to_string(),
            "Basic %%%".to_string(),
            format!("Basic {}", BASE64_STANDARD.encode("no-colon-here")),
        ] {
            let response = create_router(Arc::new(SpySink::default()))
                .oneshot(post(Some(header.clone()), Body::from("{}")))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header: {}", header);
        }
    }
}

// =============================================================================
// Acknowledgment
// =============================================================================

mod acknowledgment_tests {
    use super::*;

    #[tokio::test]
    async fn test_all_recorded_returns_accepted() {
        let sink = Arc::new(SpySink::default());
        let payload = batch(&[("AUTHORISATION", "p1"), ("CAPTURE", "p2")]);

        let response = create_router(sink.clone())
            .oneshot(authorized(&payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({ "notificationResponse": "[accepted]" }));
        assert_eq!(sink.calls(), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_any_single_failure_withholds_acknowledgment() {
        let payload = batch(&[("AUTHORISATION", "p1"), ("CAPTURE", "p2"), ("REFUND", "p3")]);

        for failing in 0..3 {
            let sink = Arc::new(SpySink::refusing(&[failing]));

            let response = create_router(sink.clone())
                .oneshot(authorized(&payload))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert!(body_bytes(response).await.is_empty(), "failing index {}", failing);
            // Items after the failure are still attempted
            assert_eq!(sink.calls(), vec!["p1", "p2", "p3"]);
        }
    }

    #[tokio::test]
    async fn test_items_recorded_in_arrival_order() {
        let sink = Arc::new(SpySink::default());
        let references: Vec<String> = (0..20).map(|i| format!("psp-{:02}", i)).collect();
        let items: Vec<(&str, &str)> = references
            .iter()
            .map(|r| ("AUTHORISATION", r.as_str()))
            .collect();

        let response = create_router(sink.clone())
            .oneshot(authorized(&batch(&items)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.calls(), references);
    }

    #[tokio::test]
    async fn test_empty_batch_is_accepted() {
        let sink = Arc::new(SpySink::default());

        let response = create_router(sink.clone())
            .oneshot(authorized(&json!({ "notificationItems": [] })))
            .await
            .unwrap();

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["notificationResponse"], "[accepted]");
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_event_codes_are_accepted() {
        let sink = Arc::new(SpySink::default());
        let payload = batch(&[("SOMETHING_NEW", "p1"), ("CHARGEBACK", "p2")]);

        let response = create_router(sink.clone())
            .oneshot(authorized(&payload))
            .await
            .unwrap();

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["notificationResponse"], "[accepted]");
        assert_eq!(sink.calls(), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_resubmission_gives_same_outcome() {
        let sink = Arc::new(SpySink::default());
        let router = create_router(sink.clone());
        let payload = batch(&[("REFUND", "p1")]);

        let first = router.clone().oneshot(authorized(&payload)).await.unwrap();
        let second = router.oneshot(authorized(&payload)).await.unwrap();

        assert_eq!(first.status(), second.status());
        assert_eq!(body_bytes(first).await, body_bytes(second).await);
    }

    #[tokio::test]
    async fn test_memory_sink_end_to_end() {
        let sink = Arc::new(MemorySink::new(1));
        let router = create_router(sink.clone());

        let accepted = router
            .clone()
            .oneshot(authorized(&batch(&[("CAPTURE", "p1")])))
            .await
            .unwrap();
        assert!(!body_bytes(accepted).await.is_empty());

        // Sink is now full, so the next batch is left for redelivery
        let refused = router
            .oneshot(authorized(&batch(&[("CAPTURE", "p2")])))
            .await
            .unwrap();
        assert!(body_bytes(refused).await.is_empty());

        let records = sink.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item.psp_reference(), Some("p1"));
        assert_eq!(records[0].metadata.header("authorization"), Some("<redacted>"));
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let sink = Arc::new(SpySink::default());
        let router = create_router(sink.clone());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = router.clone();
                tokio::spawn(async move {
                    let reference = format!("p{}", i);
                    let payload = batch(&[("CAPTURE", reference.as_str())]);
                    let response = router.oneshot(authorized(&payload)).await.unwrap();
                    body_bytes(response).await
                })
            })
            .collect();

        for handle in handles {
            let body: Value = serde_json::from_slice(&handle.await.unwrap()).unwrap();
            assert_eq!(body["notificationResponse"], "[accepted]");
        }
        assert_eq!(sink.calls().len(), 8);
    }
}

// =============================================================================
// Malformed payloads
// =============================================================================

mod payload_tests {
    use super::*;

    async fn send_raw(sink: Arc<SpySink>, body: &'static str) -> axum::response::Response {
        create_router(sink)
            .oneshot(post(
                Some(format!("Basic {}", encoded_credentials(USERNAME, PASSWORD))),
                Body::from(body),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_json_is_server_error() {
        let sink = Arc::new(SpySink::default());

        let response = send_raw(sink.clone(), "{\"notificationItems\": [").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(response).await;
        assert!(!String::from_utf8_lossy(&body).contains("[accepted]"));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_items_key_is_server_error() {
        let sink = Arc::new(SpySink::default());

        let response = send_raw(sink.clone(), "{\"live\": \"false\"}").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bad_item_rejects_whole_batch() {
        let sink = Arc::new(SpySink::default());

        let response = send_raw(
            sink.clone(),
            r#"{"notificationItems": [
                {"NotificationRequestItem": {"eventCode": "CAPTURE", "pspReference": "p1"}},
                {"NotificationRequestItem": {"pspReference": "p2"}}
            ]}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_root_is_server_error() {
        let sink = Arc::new(SpySink::default());

        let response = send_raw(sink.clone(), "[]").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(response).await;
        assert!(!String::from_utf8_lossy(&body).contains("[accepted]"));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_is_server_error() {
        let sink = Arc::new(SpySink::default());
        let payload = batch(&[("AUTHORISATION", "p1"), ("CAPTURE", "p2")]);
        let size = serde_json::to_vec(&payload).unwrap().len();

        let response = create_router_with_body_limit(sink.clone(), size - 1)
            .oneshot(authorized(&payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_bytes(response).await;
        assert!(!String::from_utf8_lossy(&body).contains("[accepted]"));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn test_body_at_limit_is_accepted() {
        let sink = Arc::new(SpySink::default());
        let payload = batch(&[("CAPTURE", "p1")]);
        let size = serde_json::to_vec(&payload).unwrap().len();

        let response = create_router_with_body_limit(sink.clone(), size)
            .oneshot(authorized(&payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.calls(), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_object_event_code_is_recorded_as_unrecognized() {
        let sink = Arc::new(SpySink::default());

        let response = send_raw(
            sink.clone(),
            r#"{"notificationItems": [
                {"NotificationRequestItem": {"eventCode": {"x": 1}, "pspReference": "p1"}}
            ]}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({ "notificationResponse": "[accepted]" }));
        assert_eq!(sink.calls(), vec!["p1"]);
    }
}

// =============================================================================
// Operational endpoints
// =============================================================================

mod operational_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let response = create_router(Arc::new(SpySink::default()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["sink"], "spy");
        assert!(body.get("postgres").is_none());
    }

    #[tokio::test]
    async fn test_metrics_after_request() {
        let router = create_router(Arc::new(SpySink::default()));
        router
            .clone()
            .oneshot(authorized(&batch(&[("CAPTURE", "p1")])))
            .await
            .unwrap();

        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(text.contains("receiver_requests_total"));
    }

    #[tokio::test]
    async fn test_get_on_notification_path_is_rejected() {
        let response = create_router(Arc::new(SpySink::default()))
            .oneshot(Request::get(PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
