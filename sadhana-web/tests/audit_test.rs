//! Audit hook tests
//!
//! The hook must report the final status, only for interesting statuses,
//! and never on the response path itself.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sadhana_core::SadhanaResult;
use sadhana_web::audit::{AuditRecord, AuditSink};
use sadhana_web::{create_app, AppState, WebConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;

struct CapturingSink(Arc<Mutex<Vec<AuditRecord>>>);

#[async_trait]
impl AuditSink for CapturingSink {
    async fn record(&self, record: AuditRecord) -> SadhanaResult<()> {
        self.0.lock().await.push(record);
        Ok(())
    }
}

/// Sink that always fails; deliveries must be swallowed
struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn record(&self, _record: AuditRecord) -> SadhanaResult<()> {
        Err(sadhana_core::SadhanaError::Internal(
            "sink unavailable".to_string(),
        ))
    }
}

async fn spawn_app_with_sink(sink: Arc<dyn AuditSink>) -> axum::Router {
    let state = AppState::new(WebConfig::default())
        .unwrap()
        .with_audit_sink(sink);
    state.seed_demo_data().await;
    create_app(state)
}

fn admin_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "admin")
        .header("x-user-role", "ADMIN")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_successful_request_is_audited() {
    let records = Arc::new(Mutex::new(Vec::new()));
    let app = spawn_app_with_sink(Arc::new(CapturingSink(records.clone()))).await;

    let response = app
        .oneshot(admin_request("GET", "/api/users"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delivery is fire-and-forget; give the spawned task a beat.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let records = records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actor_id, "admin");
    assert_eq!(records[0].resource, "user");
    assert_eq!(records[0].action, "GET user");
    assert_eq!(records[0].path, "/api/users");
    assert_eq!(records[0].status, 200);
}

#[tokio::test]
async fn test_forbidden_outcome_is_audited() {
    let records = Arc::new(Mutex::new(Vec::new()));
    let app = spawn_app_with_sink(Arc::new(CapturingSink(records.clone()))).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users")
                .header("x-user-id", "gita")
                .header("x-user-role", "GUEST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let records = records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 403);
}

#[tokio::test]
async fn test_uninteresting_status_is_not_audited() {
    let records = Arc::new(Mutex::new(Vec::new()));
    let app = spawn_app_with_sink(Arc::new(CapturingSink(records.clone()))).await;

    let response = app
        .oneshot(admin_request("GET", "/api/users/nobody"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(records.lock().await.is_empty());
}

#[tokio::test]
async fn test_anonymous_requests_are_not_audited() {
    let records = Arc::new(Mutex::new(Vec::new()));
    let app = spawn_app_with_sink(Arc::new(CapturingSink(records.clone()))).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(records.lock().await.is_empty());
}

#[tokio::test]
async fn test_failing_sink_never_touches_the_response() {
    let app = spawn_app_with_sink(Arc::new(FailingSink)).await;

    let response = app
        .oneshot(admin_request("GET", "/api/users"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
