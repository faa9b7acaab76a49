//! Dashboard server implementation
//!
//! Owns the shared state behind the routes: the trends client, the
//! single-submission gate and the last presentation offered for download.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use handlebars::Handlebars;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::flow::{PresentSettings, Presentation};
use crate::trends::TrendsApi;

use super::api::create_router;
use super::config::DashboardConfig;
use super::templates;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Trends API used by submissions
    pub api: Arc<dyn TrendsApi>,

    /// Chart and language settings of presentations
    pub settings: Arc<PresentSettings>,

    /// Page templates
    pub templates: Arc<Handlebars<'static>>,

    /// Held for the duration of one submission
    pub gate: Arc<Mutex<()>>,

    /// Last successful presentation, served by the download routes
    pub latest: Arc<RwLock<Option<Arc<Presentation>>>>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Language of pages and messages
    pub fn locale(&self) -> &'static str {
        self.settings.locale
    }
}

// ============================================================================
// Dashboard Server
// ============================================================================

/// Interactive trends dashboard
pub struct DashboardServer {
    config: DashboardConfig,
    state: AppState,
}

impl DashboardServer {
    /// Create a new dashboard server
    pub fn new(config: DashboardConfig, api: Arc<dyn TrendsApi>) -> Result<Self, ServerError> {
        config.validate().map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let templates =
            Arc::new(templates::registry().map_err(|e| ServerError::InitError(e.to_string()))?);

        let state = AppState {
            api,
            settings: Arc::new(PresentSettings::new(config.chart.clone(), &config.locale)),
            templates,
            gate: Arc::new(Mutex::new(())),
            latest: Arc::new(RwLock::new(None)),
            start_time: Instant::now(),
        };

        Ok(Self { config, state })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!("Starting dashboard on http://{} (with graceful shutdown)", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Dashboard shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            locale: self.state.locale(),
            chart_size: (self.config.chart.width, self.config.chart.height),
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub locale: &'static str,
    pub chart_size: (u32, u32),
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Trends Dashboard\n\
             {:-<40}\n\
             URL: http://{}\n\
             Language: {}\n\
             Chart: {}x{}\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            self.locale,
            self.chart_size.0,
            self.chart_size.1,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
