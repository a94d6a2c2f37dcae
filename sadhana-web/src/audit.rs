//! Audit hook
//!
//! Runs after the response is finalized so it reports the actual outcome,
//! then forwards interesting results to an external sink. Delivery is
//! fire-and-forget: a slow or failing sink must never touch the response
//! path.

use crate::actor::CurrentUser;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use sadhana_core::SadhanaResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Status classes worth auditing: successes and authorization denials
const AUDITED_STATUSES: [StatusCode; 4] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::FORBIDDEN,
    StatusCode::UNAUTHORIZED,
];

/// One audited request outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor_id: String,
    /// Method plus resource label, e.g. `"PUT user"`
    pub action: String,
    pub resource: String,
    pub path: String,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
}

/// Destination for audit records. Storage and transport are external;
/// this crate only defines the record shape.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> SadhanaResult<()>;
}

/// Default sink that emits records to the tracing pipeline
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> SadhanaResult<()> {
        info!(
            target: "audit",
            actor_id = %record.actor_id,
            action = %record.action,
            resource = %record.resource,
            path = %record.path,
            status = record.status,
            "audit"
        );
        Ok(())
    }
}

/// Audit middleware for one resource label. Attach with
/// `middleware::from_fn_with_state((state, resource), audit_hook)`.
pub async fn audit_hook(
    State((state, resource)): State<(AppState, &'static str)>,
    request: Request,
    next: Next,
) -> Response {
    let actor = request.extensions().get::<CurrentUser>().cloned();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let Some(actor) = actor else {
        return response;
    };

    let status = response.status();
    if AUDITED_STATUSES.contains(&status) {
        let record = AuditRecord {
            actor_id: actor.id,
            action: format!("{} {}", method, resource),
            resource: resource.to_string(),
            path,
            status: status.as_u16(),
            timestamp: Utc::now(),
        };

        let sink = state.audit.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.record(record).await {
                debug!("audit sink failed: {}", e);
            }
        });
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Sink that captures records for assertions
    pub struct CapturingSink(pub Arc<Mutex<Vec<AuditRecord>>>);

    #[async_trait]
    impl AuditSink for CapturingSink {
        async fn record(&self, record: AuditRecord) -> SadhanaResult<()> {
            self.0.lock().await.push(record);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_record_serializes_with_full_shape() {
        let record = AuditRecord {
            actor_id: "asha".to_string(),
            action: "GET sadhana".to_string(),
            resource: "sadhana".to_string(),
            path: "/api/sadhanas".to_string(),
            status: 200,
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        for field in ["actor_id", "action", "resource", "path", "status", "timestamp"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
    }

    #[tokio::test]
    async fn test_capturing_sink_receives_records() {
        let records = Arc::new(Mutex::new(Vec::new()));
        let sink = CapturingSink(records.clone());
        sink.record(AuditRecord {
            actor_id: "asha".to_string(),
            action: "PUT user".to_string(),
            resource: "user".to_string(),
            path: "/api/users/ravi/role".to_string(),
            status: 403,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();
        assert_eq!(records.lock().await.len(), 1);
    }

    #[test]
    fn test_interesting_statuses() {
        assert!(AUDITED_STATUSES.contains(&StatusCode::OK));
        assert!(AUDITED_STATUSES.contains(&StatusCode::FORBIDDEN));
        assert!(!AUDITED_STATUSES.contains(&StatusCode::NOT_FOUND));
        assert!(!AUDITED_STATUSES.contains(&StatusCode::INTERNAL_SERVER_ERROR));
    }
}
