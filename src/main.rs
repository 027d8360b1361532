use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_curator::{
    config::Config,
    ingestor::{HttpPlaylistFetcher, SourceFetcher},
    models::round_secs,
    observability::{RecordingSink, TracingSink},
    pipeline::PipelineRunner,
    report::ReadmeReport,
    services::{ConcurrentValidator, HttpReachabilityProber},
    storage::OutputWriter,
};

#[derive(Parser)]
#[command(name = "m3u-curator")]
#[command(version)]
#[command(about = "Fetch M3U playlists, validate stream reachability and emit curated playlists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Concurrent reachability probes (overrides config file)
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Per-probe timeout, e.g. "3s" or "500ms" (overrides config file)
    #[arg(short, long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Directory for generated playlists and stats (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Do not touch the README even if one is configured
    #[arg(long)]
    no_readme: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_curator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting m3u-curator v{}", env!("CARGO_PKG_VERSION"));
    let started = Instant::now();

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(workers) = cli.workers {
        config.validation.workers = workers;
    }
    if let Some(timeout) = cli.timeout {
        config.validation.probe_timeout = timeout;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output.output_dir = output_dir;
    }
    if cli.no_readme {
        config.report.readme_path = None;
    }
    config.validate()?;

    let sink = RecordingSink::forwarding_to(Arc::new(TracingSink));

    let (primary, backup) = config.sources.resolve();
    info!(
        "Using {} primary and {} backup sources",
        primary.len(),
        backup.len()
    );
    let fetcher = SourceFetcher::new(HttpPlaylistFetcher::new(&config.fetch)?, &config.fetch);
    let fetched = fetcher.fetch_all(&primary, &backup, &sink).await;
    if fetched.successful == 0 {
        warn!("No source could be fetched; writing empty outputs");
    }

    let prober = Arc::new(HttpReachabilityProber::new(&config.validation)?);
    let validator = ConcurrentValidator::from_config(prober, &config.validation);
    let mut output = PipelineRunner::new(validator).run(&fetched, &sink).await;
    output.summary.duration_seconds = round_secs(started.elapsed().as_secs_f64());

    let writer = OutputWriter::from_config(&config.output);
    writer.write_all(&output, &sink.lines()).await?;

    if let Some(readme_path) = &config.report.readme_path {
        let report = ReadmeReport::new(config.report.resolve_base_url())?;
        if let Err(e) = report.update(readme_path, &output.summary).await {
            warn!("Failed to update README {}: {}", readme_path.display(), e);
        }
    }

    info!(
        "Done: {}/{} channels valid ({:.1}%) in {:.1}s",
        output.summary.valid_channels,
        output.summary.quality_channels,
        output.summary.validity_ratio * 100.0,
        output.summary.duration_seconds
    );
    Ok(())
}
