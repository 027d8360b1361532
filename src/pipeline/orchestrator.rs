//! Wires parsing, deduplication, filtering, validation and categorization
//! into one run over a set of fetched documents.

use chrono::Local;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

use crate::errors::SourceError;
use crate::ingestor::fetcher::FetchReport;
use crate::ingestor::m3u_parser::parse_m3u;
use crate::models::{
    round_secs, validity_ratio, Category, CategoryBuckets, ChannelRecord, DiagnosticEntry,
    RunSummary,
};
use crate::observability::{EventSink, PipelineEvent};
use crate::pipeline::dedup::deduplicate;
use crate::pipeline::quality_filter::QualityFilter;
use crate::proxy::generator::{
    category_title, PlaylistGenerator, RAW_PLAYLIST_TITLE, VALIDATED_PLAYLIST_TITLE,
};
use crate::services::concurrent_validator::ConcurrentValidator;

/// Everything a run hands to persistence and reporting
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Deduplicated, unfiltered, unvalidated
    pub raw_playlist: String,
    pub validated_playlist: String,
    /// Only non-empty buckets get a playlist
    pub category_playlists: BTreeMap<Category, String>,
    pub diagnostics: Vec<DiagnosticEntry>,
    pub buckets: CategoryBuckets,
    pub summary: RunSummary,
}

pub struct PipelineRunner {
    validator: ConcurrentValidator,
    quality_filter: QualityFilter,
    generator: PlaylistGenerator,
}

impl PipelineRunner {
    pub fn new(validator: ConcurrentValidator) -> Self {
        Self {
            validator,
            quality_filter: QualityFilter::new(),
            generator: PlaylistGenerator::new(),
        }
    }

    /// Run every stage. Never fails; missing or empty sources just shrink the
    /// working set, down to empty outputs.
    pub async fn run(&self, fetched: &FetchReport, sink: &dyn EventSink) -> PipelineOutput {
        let started = Instant::now();
        sink.emit(PipelineEvent::RunStarted);

        let parsed = parse_documents(fetched, sink);
        let parsed_count = parsed.len();

        let unique = deduplicate(parsed);
        sink.emit(PipelineEvent::Deduplicated {
            before: parsed_count,
            after: unique.len(),
        });
        let raw_playlist = self.generator.generate(&unique, RAW_PLAYLIST_TITLE);
        let total_channels = unique.len();

        let filtered = self.quality_filter.filter(unique);
        let quality_channels = filtered.kept.len();
        sink.emit(PipelineEvent::QualityFiltered {
            before: total_channels,
            after: quality_channels,
            advisory: filtered.advisory,
        });

        let report = self.validator.validate(filtered.kept, sink).await;

        let buckets = CategoryBuckets::from_records(&report.reachable);
        let mut category_playlists = BTreeMap::new();
        for (category, records) in buckets.iter() {
            sink.emit(PipelineEvent::Categorized {
                category: category.as_str(),
                count: records.len(),
            });
            if !records.is_empty() {
                let title = category_title(category.as_str());
                category_playlists.insert(category, self.generator.generate(records, &title));
            }
        }

        let validated_playlist = self
            .generator
            .generate(&report.reachable, VALIDATED_PLAYLIST_TITLE);
        let diagnostics: Vec<DiagnosticEntry> =
            report.outcomes.iter().map(|o| o.to_diagnostic()).collect();

        let valid_channels = report.reachable_count();
        let elapsed = started.elapsed();
        let summary = RunSummary {
            update_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_seconds: round_secs(elapsed.as_secs_f64()),
            validation_seconds: round_secs(report.elapsed.as_secs_f64()),
            sources_attempted: fetched.attempted,
            sources_successful: fetched.successful,
            parsed_channels: parsed_count,
            total_channels,
            quality_channels,
            valid_channels,
            validity_ratio: validity_ratio(valid_channels, quality_channels),
            categories: buckets.counts(),
        };

        sink.emit(PipelineEvent::RunFinished {
            validated: valid_channels,
            quality: quality_channels,
            elapsed,
        });

        PipelineOutput {
            raw_playlist,
            validated_playlist,
            category_playlists,
            diagnostics,
            buckets,
            summary,
        }
    }
}

/// Parse every fetched document in order; a document that yields nothing is
/// reported as `PARSE_EMPTY` and contributes zero records.
fn parse_documents(fetched: &FetchReport, sink: &dyn EventSink) -> Vec<ChannelRecord> {
    let mut records = Vec::new();

    for document in &fetched.documents {
        let Some(content) = document.content.as_deref() else {
            debug!("No content for {}", document.origin);
            continue;
        };

        let parsed = parse_m3u(content, &document.origin);
        if parsed.is_empty() {
            let error = SourceError::parse_empty(document.origin.clone());
            sink.emit(PipelineEvent::SourceFailed {
                origin: document.origin.clone(),
                code: error.code(),
                message: error.to_string(),
            });
            continue;
        }

        sink.emit(PipelineEvent::SourceParsed {
            origin: document.origin.clone(),
            records: parsed.len(),
            orphaned: parsed.orphaned_locators,
        });
        records.extend(parsed.records);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestor::fetcher::FetchedSource;
    use crate::models::{ReasonCode, ValidationOutcome};
    use crate::observability::RecordingSink;
    use crate::services::reachability_prober::ReachabilityProber;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct AlwaysReachable;

    #[async_trait]
    impl ReachabilityProber for AlwaysReachable {
        async fn probe(&self, record: &ChannelRecord, _timeout: Duration) -> ValidationOutcome {
            ValidationOutcome::new(record.clone(), true, ReasonCode::Ok)
        }
    }

    fn runner() -> PipelineRunner {
        PipelineRunner::new(ConcurrentValidator::new(
            Arc::new(AlwaysReachable),
            2,
            Duration::from_secs(1),
        ))
    }

    #[tokio::test]
    async fn test_no_sources_still_produces_outputs() {
        let sink = RecordingSink::new();
        let output = runner().run(&FetchReport::default(), &sink).await;

        assert!(output.raw_playlist.contains("# Total Channels: 0"));
        assert!(output.validated_playlist.contains("# Title: 已验证直播源"));
        assert!(output.category_playlists.is_empty());
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.summary.valid_channels, 0);
        assert_eq!(output.summary.validity_ratio, 0.0);
        assert_eq!(output.summary.categories.len(), Category::ALL.len());
    }

    #[tokio::test]
    async fn test_empty_and_missing_documents_are_reported() {
        let fetched = FetchReport {
            documents: vec![
                FetchedSource::new("http://gone", None),
                FetchedSource::new("http://junk", Some("<html>not a playlist</html>".to_string())),
                FetchedSource::new(
                    "http://good",
                    Some("#EXTM3U\n#EXTINF:-1,CCTV-1\nhttp://x/1\n".to_string()),
                ),
            ],
            attempted: 3,
            successful: 2,
            used_backup: false,
        };
        let sink = RecordingSink::new();

        let output = runner().run(&fetched, &sink).await;

        assert_eq!(output.summary.parsed_channels, 1);
        assert_eq!(output.summary.sources_attempted, 3);
        assert_eq!(output.summary.sources_successful, 2);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            PipelineEvent::SourceFailed { code: "PARSE_EMPTY", origin, .. } if origin == "http://junk"
        )));
        assert_eq!(output.category_playlists.len(), 1);
        assert!(output.category_playlists[&Category::Cctv].contains("# Title: cctv频道"));
    }
}
