//! Utility modules for the m3u-curator application
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod http_client;
pub mod jitter;
pub mod status_code_matcher;
pub mod url;

// Re-export commonly used types for convenience
pub use http_client::HttpClientFactory;
pub use status_code_matcher::{is_status_acceptable, REACHABLE_STATUS_CODES};
pub use url::UrlUtils;
