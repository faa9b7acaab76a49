//! Error types for the trends client
//!
//! This module defines the transport and protocol errors raised while
//! talking to the trends API.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered 429 Too Many Requests
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Successful status but not a JSON payload (consent page, captcha, ...)
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether a later, identical request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimit | Self::Timeout => true,
            Self::ServerError(status) => *status >= 500,
            Self::UnexpectedContentType(_) | Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors raised by a trends query
#[derive(Error, Debug)]
pub enum QueryError {
    /// Transport failure
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The explore response carried no widget of the expected kind
    #[error("Missing {0} widget in explore response")]
    MissingWidget(&'static str),

    /// The response JSON did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
