//! Persistence of generated playlists, the run summary and diagnostics

use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::errors::AppResult;
use crate::models::Category;
use crate::pipeline::orchestrator::PipelineOutput;

pub const RAW_PLAYLIST_FILE: &str = "full_raw.m3u";
pub const VALIDATED_PLAYLIST_FILE: &str = "full_validated.m3u";
pub const SUMMARY_FILE: &str = "stats.json";
pub const DIAGNOSTICS_FILE: &str = "validation_details.json";
pub const RUN_LOG_FILE: &str = "latest_update.log";

pub fn category_file_name(category: Category) -> String {
    format!("{}.m3u", category.as_str())
}

/// Writes run artifacts under the configured output and log directories
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    log_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            log_dir: log_dir.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.output_dir.clone(), config.log_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Write every artifact of a run and return the paths written
    pub async fn write_all(&self, output: &PipelineOutput, run_log: &[String]) -> AppResult<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::create_dir_all(&self.log_dir).await?;

        let mut written = self.write_playlists(output).await?;
        written.push(
            self.write_json(self.output_dir.join(SUMMARY_FILE), &output.summary)
                .await?,
        );
        written.push(
            self.write_json(self.log_dir.join(DIAGNOSTICS_FILE), &output.diagnostics)
                .await?,
        );

        let log_path = self.log_dir.join(RUN_LOG_FILE);
        let mut log_text = run_log.join("\n");
        if !log_text.is_empty() {
            log_text.push('\n');
        }
        tokio::fs::write(&log_path, log_text).await?;
        written.push(log_path);

        info!(
            "Wrote {} files to {} and {}",
            written.len(),
            self.output_dir.display(),
            self.log_dir.display()
        );
        Ok(written)
    }

    /// Full playlists plus one file per non-empty category. Category files
    /// left over from an earlier run whose bucket is now empty are removed.
    pub async fn write_playlists(&self, output: &PipelineOutput) -> AppResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        let raw_path = self.output_dir.join(RAW_PLAYLIST_FILE);
        tokio::fs::write(&raw_path, &output.raw_playlist).await?;
        written.push(raw_path);

        let validated_path = self.output_dir.join(VALIDATED_PLAYLIST_FILE);
        tokio::fs::write(&validated_path, &output.validated_playlist).await?;
        written.push(validated_path);

        for category in Category::ALL {
            let path = self.output_dir.join(category_file_name(category));
            match output.category_playlists.get(&category) {
                Some(text) => {
                    tokio::fs::write(&path, text).await?;
                    written.push(path);
                }
                None => remove_if_exists(&path).await?,
            }
        }

        Ok(written)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: PathBuf, value: &T) -> AppResult<PathBuf> {
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

async fn remove_if_exists(path: &Path) -> AppResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
