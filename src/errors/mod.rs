//! Centralized error handling for the M3U curator
//!
//! # Error Categories
//!
//! - **Source Errors**: playlist retrieval failures (`FETCH_FAILED`, `PARSE_EMPTY`)
//! - **Configuration Errors**: unreadable or invalid config files
//! - **I/O Errors**: writing generated playlists, stats and logs
//!
//! Probe failures are not errors; they are classified into
//! [`crate::models::ReasonCode`] values.
//!
//! # Usage
//!
//! ```rust
//! use m3u_curator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("missing sources"))
//! }
//! assert!(example_function().is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
