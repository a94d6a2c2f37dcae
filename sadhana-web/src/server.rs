//! Sadhana Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig};
use axum::serve;
use sadhana_core::{SadhanaError, SadhanaResult};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main sadhana web server
pub struct SadhanaServer {
    config: WebConfig,
    state: AppState,
}

impl SadhanaServer {
    /// Create a new server
    pub fn new(config: WebConfig) -> SadhanaResult<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> SadhanaResult<()> {
        let address = self.config.address();

        info!("Starting sadhana web server on http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        if self.config.dev_mode {
            self.state.seed_demo_data().await;
            info!("Seeded demonstration records");
        }

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(SadhanaError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(SadhanaError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for SadhanaServer
pub struct SadhanaServerBuilder {
    config: WebConfig,
}

impl SadhanaServerBuilder {
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    pub fn build(self) -> SadhanaResult<SadhanaServer> {
        SadhanaServer::new(self.config)
    }
}

impl Default for SadhanaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
