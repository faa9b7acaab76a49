//! tendencia - Search interest dashboard
//!
//! Queries the public Google Trends web API for up to five keywords and
//! presents interest over time as a table, a line chart and downloadable
//! PNG/CSV files, together with the top related queries of each keyword.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`normalize`] - Keyword parsing and region selection from raw input
//! - [`trends`] - Trends web API client and response decoding
//! - [`present`] - Tabular view and chart model of an interest table
//! - [`export`] - PNG and CSV encoding of presentations
//! - [`flow`] - Submission state machine tying the steps together
//! - [`dashboard`] - Web dashboard and JSON API
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//!
//! # Example
//!
//! ```no_run
//! use tendencia::flow::{submit, PresentSettings};
//! use tendencia::normalize::QueryForm;
//! use tendencia::trends::GoogleTrendsClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GoogleTrendsClient::new("es-ES", 360)?;
//!     let report = submit(&client, &QueryForm::default(), &PresentSettings::default()).await;
//!     println!("{:?}", report.final_state());
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod flow;
pub mod i18n;
pub mod models;
pub mod normalize;
pub mod present;
pub mod trends;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, TendenciaErrorTrait};
    pub use crate::flow::{submit, FlowState, PresentSettings, SubmissionOutcome};
    pub use crate::models::{Country, InterestTable, QueryRequest, RelatedQueries, Timeframe};
    pub use crate::normalize::{normalize, QueryForm};
    pub use crate::trends::{GoogleTrendsClient, TrendsApi};
}

// Direct re-exports for convenience
pub use models::{Country, InterestTable, QueryRequest, Timeframe};
