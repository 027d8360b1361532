//! Reachability probing for a single stream locator
//!
//! A probe is one header-only request. There are no retries here; a failed
//! probe is final for the run.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::trace;

use crate::config::ValidationConfig;
use crate::errors::AppResult;
use crate::models::{ChannelRecord, ReasonCode, ValidationOutcome};
use crate::utils::{is_status_acceptable, HttpClientFactory, UrlUtils, REACHABLE_STATUS_CODES};

/// Platforms whose endpoints reject lightweight probes; locators on these
/// hosts (or their subdomains) are assumed reachable without a request.
pub const TRUSTED_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "twitch.tv"];

#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    /// Probe one record. Never fails: every failure mode maps to a [`ReasonCode`].
    async fn probe(&self, record: &ChannelRecord, timeout: Duration) -> ValidationOutcome;
}

/// Outcome decided without touching the network, if any
pub fn classify_without_request(record: &ChannelRecord) -> Option<ValidationOutcome> {
    let Some(url) = UrlUtils::parse_well_formed(&record.stream_locator) else {
        return Some(ValidationOutcome::new(
            record.clone(),
            false,
            ReasonCode::MalformedUrl,
        ));
    };

    let trusted = url
        .host_str()
        .is_some_and(|host| UrlUtils::host_matches(host, &TRUSTED_HOSTS));
    if trusted {
        return Some(ValidationOutcome::new(
            record.clone(),
            true,
            ReasonCode::SkippedTrusted,
        ));
    }

    None
}

/// Map a transport failure onto a reason code. Timeouts are checked first
/// because a connect that times out reports both.
pub fn classify_error(error: &reqwest::Error) -> ReasonCode {
    if error.is_timeout() {
        ReasonCode::Timeout
    } else if error.is_connect() {
        ReasonCode::ConnectionError
    } else {
        ReasonCode::UnknownError
    }
}

/// HEAD-request prober sharing one connection pool across all probes
#[derive(Debug, Clone)]
pub struct HttpReachabilityProber {
    client: Client,
}

impl HttpReachabilityProber {
    pub fn new(config: &ValidationConfig) -> AppResult<Self> {
        let client = HttpClientFactory::new(config.user_agent.clone())
            .with_connect_timeout(config.probe_timeout)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReachabilityProber for HttpReachabilityProber {
    async fn probe(&self, record: &ChannelRecord, timeout: Duration) -> ValidationOutcome {
        if let Some(outcome) = classify_without_request(record) {
            return outcome;
        }

        let result = self
            .client
            .head(record.stream_locator.trim())
            .timeout(timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                trace!(
                    "HEAD {} -> {}",
                    UrlUtils::obfuscate_credentials(&record.stream_locator),
                    status
                );
                if is_status_acceptable(&status, &REACHABLE_STATUS_CODES) {
                    ValidationOutcome::new(record.clone(), true, ReasonCode::Ok)
                } else {
                    ValidationOutcome::new(record.clone(), false, ReasonCode::BadStatus)
                        .with_detail(status.as_u16().to_string())
                }
            }
            Err(e) => {
                let code = classify_error(&e);
                let outcome = ValidationOutcome::new(record.clone(), false, code);
                if code == ReasonCode::UnknownError {
                    outcome.with_detail(UrlUtils::obfuscate_credentials(&e.to_string()))
                } else {
                    outcome
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(locator: &str) -> ChannelRecord {
        ChannelRecord::new("Test", "#EXTINF:-1,Test", locator, "unit")
    }

    #[rstest]
    #[case("not a url")]
    #[case("http://")]
    #[case("/relative/path.m3u8")]
    #[case("")]
    fn test_malformed_locators(#[case] locator: &str) {
        let outcome = classify_without_request(&record(locator)).unwrap();
        assert!(!outcome.reachable);
        assert_eq!(outcome.reason_code, ReasonCode::MalformedUrl);
    }

    #[rstest]
    #[case("https://www.youtube.com/watch?v=abc")]
    #[case("https://youtu.be/abc")]
    #[case("https://twitch.tv/somechannel")]
    #[case("https://player.TWITCH.tv/?channel=x")]
    fn test_trusted_hosts_skip_request(#[case] locator: &str) {
        let outcome = classify_without_request(&record(locator)).unwrap();
        assert!(outcome.reachable);
        assert_eq!(outcome.reason_code, ReasonCode::SkippedTrusted);
    }

    #[rstest]
    #[case("http://example.com/live.m3u8")]
    #[case("https://notyoutube.com/live")]
    #[case("rtmp://media.example.org/live/stream")]
    fn test_other_hosts_need_a_request(#[case] locator: &str) {
        assert!(classify_without_request(&record(locator)).is_none());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_unknown_error() {
        let prober = HttpReachabilityProber::new(&ValidationConfig::default()).unwrap();
        let outcome = prober
            .probe(
                &record("rtsp://127.0.0.1:1/stream"),
                Duration::from_millis(500),
            )
            .await;
        assert!(!outcome.reachable);
        assert_eq!(outcome.reason_code, ReasonCode::UnknownError);
        assert!(outcome.detail.is_some());
    }
}
