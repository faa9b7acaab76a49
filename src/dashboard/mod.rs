//! Web dashboard for trend queries
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │              Trends Dashboard             │
//! │                                           │
//! │  GET  /                      form         │
//! │  POST /query                 results page │
//! │  GET  /download/tendencias.png            │
//! │  GET  /download/tendencias.csv            │
//! │  POST /api/query             JSON results │
//! │  GET  /api/health                         │
//! └───────────────────────────────────────────┘
//! ```
//!
//! Only one submission runs at a time; a concurrent one is answered with
//! `409 Conflict`.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tendencia::dashboard::{DashboardConfig, DashboardServer};
//! use tendencia::trends::GoogleTrendsClient;
//!
//! let api = Arc::new(GoogleTrendsClient::new("es-ES", 360)?);
//! let server = DashboardServer::new(DashboardConfig::default(), api)?;
//! server.start_with_shutdown(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

pub mod api;
pub mod config;
pub mod server;
pub mod templates;

pub use config::DashboardConfig;
pub use server::{AppState, DashboardServer, ServerError};
