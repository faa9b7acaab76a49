//! Configuration management for the trends dashboard
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::trends::client::DEFAULT_BASE_URL;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trends API client configuration
    pub trends: TrendsConfig,

    /// Dashboard server configuration
    pub server: ServerConfig,

    /// Chart rendering configuration
    pub chart: ChartConfig,

    /// User interface configuration
    pub ui: UiConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trends API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Base URL of the trends web API
    pub base_url: String,

    /// Host language sent with every request
    pub hl: String,

    /// Timezone offset in minutes
    pub tz: i32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hl: String::from("es-ES"),
            tz: 360,
            request_timeout_secs: 30,
            user_agent: format!("tendencia/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Dashboard server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the dashboard listens on
    pub bind_address: SocketAddr,

    /// Enable CORS for the JSON API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8501)),
            enable_cors: false,
            enable_request_logging: true,
        }
    }
}

/// Chart rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// TrueType font for chart text; common system fonts are tried when unset
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            font_path: None,
        }
    }
}

/// User interface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Language of user-facing text (en, es)
    pub locale: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: String::from("en"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("TENDENCIA_BASE_URL").unwrap_or(defaults.trends.base_url);

        let hl = std::env::var("TENDENCIA_HL").unwrap_or(defaults.trends.hl);

        let tz = std::env::var("TENDENCIA_TZ")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults.trends.tz);

        let request_timeout_secs = std::env::var("TENDENCIA_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.trends.request_timeout_secs);

        let user_agent =
            std::env::var("TENDENCIA_USER_AGENT").unwrap_or(defaults.trends.user_agent);

        let bind_address = match std::env::var("TENDENCIA_BIND") {
            Ok(addr) => addr
                .parse()
                .with_context(|| format!("Invalid TENDENCIA_BIND address: {addr}"))?,
            Err(_) => defaults.server.bind_address,
        };

        let font_path = std::env::var("TENDENCIA_FONT_PATH").ok().map(PathBuf::from);

        let locale = std::env::var("TENDENCIA_LANG").unwrap_or(defaults.ui.locale);

        let log_level = std::env::var("TENDENCIA_LOG_LEVEL").unwrap_or(defaults.logging.level);

        let log_format = std::env::var("TENDENCIA_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            trends: TrendsConfig {
                base_url,
                hl,
                tz,
                request_timeout_secs,
                user_agent,
            },
            server: ServerConfig {
                bind_address,
                ..defaults.server
            },
            chart: ChartConfig {
                font_path,
                ..defaults.chart
            },
            ui: UiConfig { locale },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from a file when given, otherwise from the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.trends.base_url)
            .with_context(|| format!("Invalid trends base_url: {}", self.trends.base_url))?;

        if self.trends.hl.trim().is_empty() {
            anyhow::bail!("hl must not be empty");
        }

        if self.trends.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.chart.width < 200 || self.chart.height < 100 {
            anyhow::bail!("chart must be at least 200x100 pixels");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging format must be text or json");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.trends.request_timeout_secs)
    }

    /// Supported language selected for the UI
    #[must_use]
    pub fn locale(&self) -> &'static str {
        crate::i18n::normalize_locale(&self.ui.locale)
    }
}
