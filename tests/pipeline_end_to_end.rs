use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use m3u_curator::ingestor::m3u_parser::parse_m3u;
use m3u_curator::ingestor::{FetchReport, FetchedSource};
use m3u_curator::models::{Category, ChannelRecord, ReasonCode, ValidationOutcome};
use m3u_curator::observability::{NullSink, PipelineEvent, RecordingSink};
use m3u_curator::pipeline::PipelineRunner;
use m3u_curator::services::{ConcurrentValidator, ReachabilityProber};
use m3u_curator::storage::OutputWriter;

const FIRST_SOURCE: &str = r#"#EXTM3U
#EXTINF:-1 tvg-id="cctv1" group-title="央视",CCTV-1 综合
http://streams.example.com/cctv1.m3u8
#EXTINF:-1 group-title="卫视",湖南卫视
http://streams.example.com/hunan.m3u8
#EXTINF:-1,Demo Channel
http://streams.example.com/demo.m3u8

#EXTINF:-1,城市都市频道
http://down.example.com/dushi.m3u8
#EXTINF:-1,Random Channel
http://down.example.com/random.m3u8
"#;

const SECOND_SOURCE: &str = r#"#EXTM3U
#EXTINF:-1,CCTV1 (mirror)
http://streams.example.com/cctv1.m3u8
http://orphan.example.com/no-metadata.m3u8
#EXTINF:-1,湖南卫视 HD
http://streams.example.com/hunan.m3u8
#EXTINF:-1 tvg-logo="https://img.example.com/tvb.png",TVB翡翠台
http://streams.example.com/tvb.m3u8
"#;

/// Everything on `down.example.com` is unreachable
struct HostDownProber;

#[async_trait]
impl ReachabilityProber for HostDownProber {
    async fn probe(&self, record: &ChannelRecord, _timeout: Duration) -> ValidationOutcome {
        tokio::time::sleep(Duration::from_millis(2)).await;
        if record.stream_locator.contains("down.example.com") {
            ValidationOutcome::new(record.clone(), false, ReasonCode::ConnectionError)
        } else {
            ValidationOutcome::new(record.clone(), true, ReasonCode::Ok)
        }
    }
}

fn fetched() -> FetchReport {
    FetchReport {
        documents: vec![
            FetchedSource::new("http://first.example.com/a.m3u", Some(FIRST_SOURCE.to_string())),
            FetchedSource::new("http://second.example.com/b.m3u", Some(SECOND_SOURCE.to_string())),
            FetchedSource::new("http://third.example.com/c.m3u", None),
        ],
        attempted: 3,
        successful: 2,
        used_backup: false,
    }
}

fn runner(workers: usize) -> PipelineRunner {
    PipelineRunner::new(
        ConcurrentValidator::new(Arc::new(HostDownProber), workers, Duration::from_secs(1))
            .with_progress_interval(2),
    )
}

#[tokio::test]
async fn test_two_sources_end_to_end() {
    let sink = RecordingSink::new();
    let output = runner(3).run(&fetched(), &sink).await;
    let summary = &output.summary;

    assert_eq!(summary.parsed_channels, 8);
    assert_eq!(summary.total_channels, 6);
    assert_eq!(summary.quality_channels, 5);
    assert_eq!(summary.valid_channels, 3);
    assert!((summary.validity_ratio - 0.6).abs() < f64::EPSILON);
    assert_eq!(summary.categories.values().sum::<usize>(), 3);
    assert_eq!(summary.categories[&Category::Cctv], 1);
    assert_eq!(summary.categories[&Category::Satellite], 1);
    assert_eq!(summary.categories[&Category::Hongkong], 1);

    // Earlier source wins on duplicate locators
    let raw = parse_m3u(&output.raw_playlist, "raw").records;
    assert_eq!(raw.len(), 6);
    assert_eq!(raw[0].display_name, "CCTV-1 综合");
    assert_eq!(raw[1].display_name, "湖南卫视");
    assert!(raw.iter().any(|r| r.display_name == "Demo Channel"));

    let validated = parse_m3u(&output.validated_playlist, "validated").records;
    assert_eq!(validated.len(), 3);
    assert!(validated.iter().all(|r| !r.stream_locator.contains("down.example.com")));

    assert_eq!(output.diagnostics.len(), 5);
    assert_eq!(
        output
            .diagnostics
            .iter()
            .filter(|d| d.reason_code == ReasonCode::ConnectionError)
            .count(),
        2
    );
    assert!(output.diagnostics.iter().all(|d| d.channel != "Demo Channel"));

    let categories: Vec<Category> = output.category_playlists.keys().copied().collect();
    assert_eq!(
        categories,
        vec![Category::Cctv, Category::Satellite, Category::Hongkong]
    );
    assert!(output.category_playlists[&Category::Hongkong].contains("TVB翡翠台"));

    let events = sink.events();
    assert!(matches!(events.first(), Some(PipelineEvent::RunStarted)));
    assert!(events.iter().any(|e| matches!(
        e,
        PipelineEvent::SourceParsed { records: 3, orphaned: 1, .. }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, PipelineEvent::Deduplicated { before: 8, after: 6 })));
    assert!(matches!(
        events.last(),
        Some(PipelineEvent::RunFinished {
            validated: 3,
            quality: 5,
            ..
        })
    ));
}

#[tokio::test]
async fn test_sequential_and_wide_pools_agree() {
    let sequential = runner(1).run(&fetched(), &NullSink).await;
    let wide = runner(64).run(&fetched(), &NullSink).await;

    assert_eq!(sequential.summary.valid_channels, 3);
    assert_eq!(wide.summary.valid_channels, 3);
    assert_eq!(sequential.summary.categories, wide.summary.categories);
}

#[tokio::test]
async fn test_outputs_written_to_disk() {
    let temp = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let output = runner(2).run(&fetched(), &sink).await;

    let writer = OutputWriter::new(temp.path().join("outputs"), temp.path().join("logs"));
    writer.write_all(&output, &sink.lines()).await.unwrap();

    for file in ["full_raw.m3u", "full_validated.m3u", "cctv.m3u", "satellite.m3u", "hongkong.m3u", "stats.json"] {
        assert!(temp.path().join("outputs").join(file).exists(), "missing {file}");
    }
    assert!(!temp.path().join("outputs/local.m3u").exists());
    assert!(!temp.path().join("outputs/other.m3u").exists());

    let stats: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp.path().join("outputs/stats.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stats["valid_channels"], 3);
    assert_eq!(stats["categories"]["cctv"], 1);

    let log = std::fs::read_to_string(temp.path().join("logs/latest_update.log")).unwrap();
    assert!(log.contains("Deduplicated channels: 6 (from 8)"));
}
