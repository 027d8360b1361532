use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One playlist entry: a `#EXTINF` metadata line paired with its stream locator.
///
/// Records are built once by the parser and never mutated afterwards.
/// Equality for deduplication purposes is the `stream_locator` alone, see
/// [`crate::pipeline::dedup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub display_name: String,
    pub metadata_line: String,
    pub stream_locator: String,
    pub source_origin: String,
}

impl ChannelRecord {
    pub fn new(
        display_name: impl Into<String>,
        metadata_line: impl Into<String>,
        stream_locator: impl Into<String>,
        source_origin: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            metadata_line: metadata_line.into(),
            stream_locator: stream_locator.into(),
            source_origin: source_origin.into(),
        }
    }
}

/// Classification of a single reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Locator lacks a scheme or host; no request was made
    MalformedUrl,
    /// Host belongs to a platform that rejects lightweight probes; assumed reachable
    SkippedTrusted,
    /// Status 200, 301 or 302
    Ok,
    /// Any other HTTP status
    BadStatus,
    /// Probe exceeded its timeout
    Timeout,
    /// DNS, refused connection, TLS handshake
    ConnectionError,
    /// Anything else; the failure text is kept in `ValidationOutcome::detail`
    UnknownError,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedUrl => "MALFORMED_URL",
            Self::SkippedTrusted => "SKIPPED_TRUSTED",
            Self::Ok => "OK",
            Self::BadStatus => "BAD_STATUS",
            Self::Timeout => "TIMEOUT",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub record: ChannelRecord,
    pub reachable: bool,
    pub reason_code: ReasonCode,
    /// Status code or original failure description, when there is one
    pub detail: Option<String>,
}

impl ValidationOutcome {
    pub fn new(record: ChannelRecord, reachable: bool, reason_code: ReasonCode) -> Self {
        Self {
            record,
            reachable,
            reason_code,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn to_diagnostic(&self) -> DiagnosticEntry {
        DiagnosticEntry {
            channel: self.record.display_name.clone(),
            url: self.record.stream_locator.clone(),
            valid: self.reachable,
            reason_code: self.reason_code,
            message: self.detail.clone(),
        }
    }
}

/// Serialized form of a probe outcome, written to `validation_details.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub channel: String,
    pub url: String,
    pub valid: bool,
    pub reason_code: ReasonCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Fixed category labels assigned after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cctv,
    Satellite,
    Local,
    Hongkong,
    Other,
}

impl Category {
    /// All categories in bucket order
    pub const ALL: [Category; 5] = [
        Category::Cctv,
        Category::Satellite,
        Category::Local,
        Category::Hongkong,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cctv => "cctv",
            Self::Satellite => "satellite",
            Self::Local => "local",
            Self::Hongkong => "hongkong",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated records grouped by category; order inside a bucket is the
/// order records were pushed (validation-completion order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBuckets {
    buckets: BTreeMap<Category, Vec<ChannelRecord>>,
}

impl CategoryBuckets {
    pub fn new() -> Self {
        let buckets = Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        Self { buckets }
    }

    pub fn push(&mut self, category: Category, record: ChannelRecord) {
        self.buckets.entry(category).or_default().push(record);
    }

    pub fn get(&self, category: Category) -> &[ChannelRecord] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate every bucket, empty ones included, in [`Category::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[ChannelRecord])> {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    pub fn counts(&self) -> BTreeMap<Category, usize> {
        self.iter().map(|(c, records)| (c, records.len())).collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Counters and timings for one pipeline run, written to `stats.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub update_time: String,
    pub duration_seconds: f64,
    pub validation_seconds: f64,
    pub sources_attempted: usize,
    pub sources_successful: usize,
    pub parsed_channels: usize,
    pub total_channels: usize,
    pub quality_channels: usize,
    pub valid_channels: usize,
    pub validity_ratio: f64,
    pub categories: BTreeMap<Category, usize>,
}

/// `validated / quality_filtered`, or 0 when nothing reached validation
pub fn validity_ratio(validated: usize, quality_filtered: usize) -> f64 {
    if quality_filtered == 0 {
        0.0
    } else {
        validated as f64 / quality_filtered as f64
    }
}

/// Round to two decimals for the persisted summary
pub fn round_secs(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
