//! Dashboard configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::config::{ChartConfig, Config};

/// Configuration for the dashboard server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable CORS for the JSON API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Chart rendering settings
    pub chart: ChartConfig,

    /// Language of the pages (en, es)
    pub locale: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8501)),
            enable_cors: false,
            enable_request_logging: true,
            chart: ChartConfig::default(),
            locale: String::from("en"),
        }
    }
}

impl From<&Config> for DashboardConfig {
    fn from(config: &Config) -> Self {
        Self {
            bind_address: config.server.bind_address,
            enable_cors: config.server.enable_cors,
            enable_request_logging: config.server.enable_request_logging,
            chart: config.chart.clone(),
            locale: config.ui.locale.clone(),
        }
    }
}

impl DashboardConfig {
    /// Create a new config builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chart.width < 200 || self.chart.height < 100 {
            return Err(ConfigError::InvalidValue {
                field: "chart".to_string(),
                reason: "Chart must be at least 200x100 pixels".to_string(),
            });
        }

        if self.locale.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "locale".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    bind_address: Option<SocketAddr>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
    chart: Option<ChartConfig>,
    locale: Option<String>,
}

impl DashboardConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(addr.parse().map_err(|_| ConfigError::InvalidValue {
            field: "bind_address".to_string(),
            reason: format!("Invalid address: {}", addr),
        })?);
        Ok(self)
    }

    /// Enable/disable CORS
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Set chart rendering settings
    pub fn chart(mut self, chart: ChartConfig) -> Self {
        self.chart = Some(chart);
        self
    }

    /// Set page language
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Build the config
    pub fn build(self) -> Result<DashboardConfig, ConfigError> {
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            bind_address: self.bind_address.unwrap_or(defaults.bind_address),
            enable_cors: self.enable_cors.unwrap_or(defaults.enable_cors),
            enable_request_logging: self
                .enable_request_logging
                .unwrap_or(defaults.enable_request_logging),
            chart: self.chart.unwrap_or(defaults.chart),
            locale: self.locale.unwrap_or(defaults.locale),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue { field: String, reason: String },
    MissingField { field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            Self::MissingField { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
