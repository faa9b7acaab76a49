//! Unified error handling for the tendencia crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`TendenciaErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use tendencia::error::{Error, TendenciaErrorTrait};
//!
//! fn banner(err: &Error, locale: &str) -> String {
//!     format!("{}: {}", err.category().localized_desc(locale), err.localized_desc(locale))
//! }
//! ```

use thiserror::Error;

use crate::i18n::t;

// Re-export domain-specific errors for convenience
pub use crate::export::ExportError;
pub use crate::present::PresentError;
pub use crate::utils::error::{FetchError, QueryError};

/// Common trait for all tendencia error types
///
/// This trait provides a unified interface for turning failures into
/// user-visible messages.
pub trait TendenciaErrorTrait: std::error::Error {
    /// Check if a later, identical submission could succeed
    fn is_recoverable(&self) -> bool;

    /// Get a localized description for user-facing messages
    fn localized_desc(&self, locale: &str) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Response parsing and data extraction errors
    Parsing,
    /// Chart and export encoding errors
    Rendering,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self, locale: &str) -> String {
        match self {
            Self::Network => t!("errors.category.network", locale = locale).to_string(),
            Self::Parsing => t!("errors.category.parsing", locale = locale).to_string(),
            Self::Rendering => t!("errors.category.rendering", locale = locale).to_string(),
        }
    }
}

impl TendenciaErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        self.is_transient()
    }

    fn localized_desc(&self, locale: &str) -> String {
        match self {
            Self::RateLimit => t!("errors.fetch.rate_limit", locale = locale).to_string(),
            Self::Timeout => t!("errors.fetch.timeout", locale = locale).to_string(),
            Self::ServerError(status) => {
                t!("errors.fetch.server", locale = locale, status = status).to_string()
            }
            Self::UnexpectedContentType(_) => {
                t!("errors.fetch.content_type", locale = locale).to_string()
            }
            Self::Http(e) => format!("{}: {e}", t!("errors.fetch.transport", locale = locale)),
            Self::Decode(msg) | Self::InvalidUrl(msg) => {
                format!("{}: {msg}", t!("errors.http", locale = locale))
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

impl TendenciaErrorTrait for QueryError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::MissingWidget(_) | Self::MalformedResponse(_) => false,
        }
    }

    fn localized_desc(&self, locale: &str) -> String {
        match self {
            Self::Fetch(e) => e.localized_desc(locale),
            Self::MissingWidget(_) | Self::MalformedResponse(_) => {
                format!("{} ({self})", t!("errors.query.malformed", locale = locale))
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::MissingWidget(_) | Self::MalformedResponse(_) => ErrorCategory::Parsing,
        }
    }
}

/// Unified error type for the tendencia crate
///
/// Wraps the failures a submission can end in: the trends query, building
/// the presentation and encoding the downloads.
#[derive(Error, Debug)]
pub enum Error {
    /// Trends query errors (protocol and transport)
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Presentation errors
    #[error("Present error: {0}")]
    Present(#[from] PresentError),

    /// PNG/CSV export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl TendenciaErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Query(e) => e.is_recoverable(),
            Self::Present(_) | Self::Export(_) => false,
        }
    }

    fn localized_desc(&self, locale: &str) -> String {
        match self {
            Self::Query(e) => e.localized_desc(locale),
            Self::Present(PresentError::MissingColumn(keyword)) => {
                t!("errors.missing_column", locale = locale, keyword = keyword).to_string()
            }
            Self::Export(ExportError::Csv(_) | ExportError::InvalidCsv(_)) => {
                t!("errors.csv", locale = locale).to_string()
            }
            Self::Export(e) => format!("{}: {e}", t!("errors.render", locale = locale)),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Query(e) => e.category(),
            Self::Present(_) | Self::Export(_) => ErrorCategory::Rendering,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Query(QueryError::Fetch(FetchError::Timeout));
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let query_err = Error::Query(QueryError::MalformedResponse("bad".to_string()));
        assert_eq!(query_err.category(), ErrorCategory::Parsing);

        let present_err = Error::Present(PresentError::MissingColumn("x".to_string()));
        assert_eq!(present_err.category(), ErrorCategory::Rendering);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::Query(QueryError::Fetch(FetchError::Timeout)).is_recoverable());
        assert!(Error::Query(QueryError::Fetch(FetchError::ServerError(503))).is_recoverable());
        assert!(!Error::Query(QueryError::Fetch(FetchError::ServerError(400))).is_recoverable());
        assert!(!Error::Query(QueryError::MissingWidget("TIMESERIES")).is_recoverable());
    }

    #[test]
    fn test_localized_desc() {
        let err = Error::Query(QueryError::Fetch(FetchError::RateLimit));
        assert_eq!(err.localized_desc("en"), "Too many requests to the trends service");
        assert_eq!(
            err.localized_desc("es"),
            "Demasiadas solicitudes al servicio de tendencias"
        );

        let err = Error::Query(QueryError::Fetch(FetchError::ServerError(502)));
        assert_eq!(
            err.localized_desc("en"),
            "The trends service answered with status 502"
        );
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = QueryError::MissingWidget("TIMESERIES").into();
        assert!(matches!(unified, Error::Query(_)));

        let unified: Error = PresentError::MissingColumn("a".to_string()).into();
        assert!(matches!(unified, Error::Present(_)));
    }

    #[test]
    fn test_export_error_desc() {
        let err = Error::Export(ExportError::InvalidCsv("bad header".to_string()));
        assert_eq!(err.category(), ErrorCategory::Rendering);
        assert!(!err.is_recoverable());
        assert_eq!(err.localized_desc("en"), "Could not encode the data as CSV");
    }

    #[test]
    fn test_error_category_localized() {
        assert_eq!(ErrorCategory::Network.localized_desc("en"), "Network error");
        assert_eq!(ErrorCategory::Rendering.localized_desc("es"), "Error de renderizado");
    }
}
