//! Sadhana Web Server
//!
//! Adapts the access-control engine to an axum request pipeline: guards
//! that short-circuit requests, a capability object for ad-hoc checks in
//! handlers, and an audit hook that reports final outcomes. No
//! authorization logic lives in this crate; every decision is delegated
//! to `sadhana-access`.

pub mod actor;
pub mod audit;
pub mod capability;
pub mod guards;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use server::SadhanaServer;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        // Disabled accounts are cut off before any permission logic runs.
        .layer(middleware::from_fn(guards::disabled_guard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capability::attach_capabilities,
        ))
        .layer(middleware::from_fn(actor::resolve_actor))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SADHANA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("SADHANA_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            dev_mode: std::env::var("SADHANA_DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

