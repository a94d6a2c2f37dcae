//! Application state
//!
//! Holds the immutable access registry, the engine built over it, the
//! audit sink, and a small in-memory demo store standing in for the
//! persistence collaborator.

use crate::audit::{AuditSink, TracingAuditSink};
use crate::WebConfig;
use sadhana_access::{AccessRegistry, RbacEngine, Role, Visibility};
use sadhana_core::SadhanaResult;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A stored practice record; ownership and visibility drive the filters
#[derive(Debug, Clone, serde::Serialize)]
pub struct SadhanaRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub visibility: Visibility,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Immutable access-control catalog
    pub registry: Arc<AccessRegistry>,
    /// Decision engine over the registry
    pub engine: RbacEngine,
    /// Audit sink for the post-response hook
    pub audit: Arc<dyn AuditSink>,
    /// In-memory user records keyed by id
    pub users: Arc<RwLock<HashMap<String, Value>>>,
    /// In-memory practice records keyed by id
    pub sadhanas: Arc<RwLock<HashMap<String, SadhanaRecord>>>,
}

impl AppState {
    /// Create application state over the builtin catalog
    pub fn new(config: WebConfig) -> SadhanaResult<Self> {
        let registry = Arc::new(AccessRegistry::builtin());
        let engine = RbacEngine::new(registry.clone());

        let state = Self {
            config,
            registry,
            engine,
            audit: Arc::new(TracingAuditSink),
            users: Arc::new(RwLock::new(HashMap::new())),
            sadhanas: Arc::new(RwLock::new(HashMap::new())),
        };

        info!("application state initialized");
        Ok(state)
    }

    /// Replace the audit sink
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Seed the in-memory store with demonstration records
    pub async fn seed_demo_data(&self) {
        let mut users = self.users.write().await;
        users.insert(
            "asha".to_string(),
            json!({
                "id": "asha",
                "display_name": "Asha",
                "role": Role::User,
                "bio": "practices daily",
                "email": "asha@example.com",
                "created_at": "2025-01-10T06:00:00Z",
                "ip_history": ["10.0.0.4"],
                "suspicious_activity": false,
            }),
        );
        users.insert(
            "ravi".to_string(),
            json!({
                "id": "ravi",
                "display_name": "Ravi",
                "role": Role::Mentor,
                "bio": "guides the morning group",
                "email": "ravi@example.com",
                "created_at": "2024-11-02T06:00:00Z",
                "ip_history": ["10.0.0.9"],
                "suspicious_activity": false,
            }),
        );

        let mut sadhanas = self.sadhanas.write().await;
        for record in [
            SadhanaRecord {
                id: "s1".to_string(),
                owner_id: "asha".to_string(),
                title: "Morning japa".to_string(),
                visibility: Visibility::Public,
            },
            SadhanaRecord {
                id: "s2".to_string(),
                owner_id: "asha".to_string(),
                title: "Evening reflection".to_string(),
                visibility: Visibility::Private,
            },
            SadhanaRecord {
                id: "s3".to_string(),
                owner_id: "ravi".to_string(),
                title: "Pranayama".to_string(),
                visibility: Visibility::Followers,
            },
        ] {
            sadhanas.insert(record.id.clone(), record);
        }
    }
}
