//! Shared `reqwest` client construction
//!
//! One client is built per role (source fetching, reachability probing) and
//! cloned into every task that needs it; clones share the connection pool.

use reqwest::{redirect, Client};
use std::time::Duration;

use crate::errors::AppResult;

/// Maximum redirects followed by either client
pub const MAX_REDIRECTS: usize = 10;

/// Builder for the crate's HTTP clients
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    user_agent: String,
    connect_timeout: Option<Duration>,
}

impl HttpClientFactory {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Client that follows redirects. Request timeouts are set per request so
    /// callers can apply their own budget.
    pub fn build(&self) -> AppResult<Client> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
    }
}
