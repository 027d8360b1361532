//! Error type definitions for the M3U curator
//!
//! Only the fetch, configuration and persistence collaborators produce
//! errors. The core pipeline stages never fail: a bad record or a failed
//! probe shrinks the working set instead of surfacing here.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source fetching errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors while reading config or writing outputs
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failures
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config parse failures
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML config render failures
    #[error("Config render error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while retrieving playlist documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Transport-level failure (DNS, refused, timeout) after all attempts
    #[error("Fetch failed: {url} - {message}")]
    FetchFailed { url: String, message: String },

    /// Server answered with a non-success status
    #[error("HTTP error: {status} - {url}")]
    HttpStatus { url: String, status: u16 },

    /// Document was retrieved but contained no channel records
    #[error("No channels parsed from {origin}")]
    ParseEmpty { origin: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a fetch failed error
    pub fn fetch_failed<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an empty-parse error for a document
    pub fn parse_empty<O: Into<String>>(origin: O) -> Self {
        Self::ParseEmpty {
            origin: origin.into(),
        }
    }

    /// Stable diagnostic code for this failure
    pub fn code(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } | Self::HttpStatus { .. } => "FETCH_FAILED",
            Self::ParseEmpty { .. } => "PARSE_EMPTY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_codes() {
        assert_eq!(
            SourceError::fetch_failed("http://a", "refused").code(),
            "FETCH_FAILED"
        );
        assert_eq!(
            SourceError::HttpStatus {
                url: "http://a".to_string(),
                status: 404
            }
            .code(),
            "FETCH_FAILED"
        );
        assert_eq!(SourceError::parse_empty("http://a").code(), "PARSE_EMPTY");
    }

    #[test]
    fn test_source_error_converts_into_app_error() {
        let err: AppError = SourceError::parse_empty("local.m3u").into();
        assert_eq!(
            err.to_string(),
            "Source error: No channels parsed from local.m3u"
        );
    }
}
