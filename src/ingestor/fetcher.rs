//! Sequential playlist retrieval
//!
//! Primary sources are fetched in list order; backup sources are only tried
//! when no primary source produced a document. Failures never abort the run,
//! a failed source simply contributes no content.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::observability::{EventSink, PipelineEvent};
use crate::utils::jitter::with_jitter;
use crate::utils::{HttpClientFactory, UrlUtils};

/// Retrieves the raw text of one playlist document
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> SourceResult<String>;
}

/// Raw document for one source; `content` is `None` when the fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    pub origin: String,
    pub content: Option<String>,
}

impl FetchedSource {
    pub fn new(origin: impl Into<String>, content: Option<String>) -> Self {
        Self {
            origin: origin.into(),
            content,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub documents: Vec<FetchedSource>,
    pub attempted: usize,
    pub successful: usize,
    pub used_backup: bool,
}

/// GET over HTTP with a per-request timeout
pub struct HttpPlaylistFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPlaylistFetcher {
    pub fn new(config: &FetchConfig) -> AppResult<Self> {
        let client = HttpClientFactory::new(config.user_agent.clone())
            .with_connect_timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn fetch(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                SourceError::fetch_failed(&safe_url, UrlUtils::obfuscate_credentials(&e.to_string()))
            })?;

        if response.status() != StatusCode::OK {
            return Err(SourceError::HttpStatus {
                url: safe_url,
                status: response.status().as_u16(),
            });
        }

        // Playlists are UTF-8 regardless of what the server claims
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::fetch_failed(&safe_url, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Drives a [`PlaylistFetcher`] over the configured source lists
pub struct SourceFetcher<F> {
    fetcher: F,
    attempts: u32,
    retry_delay: Duration,
    pause_between: Duration,
}

impl<F: PlaylistFetcher> SourceFetcher<F> {
    pub fn new(fetcher: F, config: &FetchConfig) -> Self {
        Self {
            fetcher,
            attempts: config.attempts.max(1),
            retry_delay: config.retry_delay,
            pause_between: config.pause_between,
        }
    }

    pub async fn fetch_all(
        &self,
        primary: &[String],
        backup: &[String],
        sink: &dyn EventSink,
    ) -> FetchReport {
        let mut report = FetchReport::default();
        self.fetch_list(primary, sink, &mut report).await;

        if report.successful == 0 && !backup.is_empty() {
            sink.emit(PipelineEvent::BackupFallback {
                backups: backup.len(),
            });
            report.used_backup = true;
            self.fetch_list(backup, sink, &mut report).await;
        }

        report
    }

    async fn fetch_list(&self, urls: &[String], sink: &dyn EventSink, report: &mut FetchReport) {
        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.pause_between.is_zero() {
                tokio::time::sleep(self.pause_between).await;
            }

            report.attempted += 1;
            sink.emit(PipelineEvent::SourceFetching {
                origin: UrlUtils::obfuscate_credentials(url),
            });

            match self.fetch_with_retry(url).await {
                Ok(content) => {
                    report.successful += 1;
                    report
                        .documents
                        .push(FetchedSource::new(url.clone(), Some(content)));
                }
                Err(e) => {
                    sink.emit(PipelineEvent::SourceFailed {
                        origin: UrlUtils::obfuscate_credentials(url),
                        code: e.code(),
                        message: e.to_string(),
                    });
                    report.documents.push(FetchedSource::new(url.clone(), None));
                }
            }
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> SourceResult<String> {
        let mut attempt = 1;
        loop {
            match self.fetcher.fetch(url).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < self.attempts && is_retryable(&e) => {
                    warn!(
                        "Fetch attempt {}/{} failed for {}: {}",
                        attempt,
                        self.attempts,
                        UrlUtils::obfuscate_credentials(url),
                        e
                    );
                    tokio::time::sleep(with_jitter(self.retry_delay)).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("Giving up on {} after {} attempts", UrlUtils::obfuscate_credentials(url), attempt);
                    return Err(e);
                }
            }
        }
    }
}

/// Transport failures and server errors are worth another try; client errors are not
fn is_retryable(error: &SourceError) -> bool {
    match error {
        SourceError::FetchFailed { .. } => true,
        SourceError::HttpStatus { status, .. } => *status >= 500,
        SourceError::ParseEmpty { .. } => false,
    }
}
