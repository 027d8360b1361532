use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Playlist documents to ingest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Tried in order on every run
    #[serde(default = "default_primary_sources")]
    pub primary: Vec<String>,
    /// Tried in order only when no primary source could be fetched
    #[serde(default = "default_backup_sources")]
    pub backup: Vec<String>,
    /// Optional JSON list (`{"sources": [...], "backup_sources": [...]}`)
    /// that replaces the lists above when it can be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub timeout: Duration,
    /// Attempts per source, including the first one
    #[serde(default = "default_fetch_attempts")]
    pub attempts: u32,
    #[serde(default = "default_fetch_retry_delay", with = "duration_serde")]
    pub retry_delay: Duration,
    /// Pause between consecutive sources in a list
    #[serde(default = "default_fetch_pause", with = "duration_serde")]
    pub pause_between: Duration,
    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum concurrent probes
    #[serde(default = "default_validation_workers")]
    pub workers: usize,
    #[serde(default = "default_probe_timeout", with = "duration_serde")]
    pub probe_timeout: Duration,
    /// Emit a progress event every N completed probes (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default = "default_probe_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// README to update with the live-sources section; disabled when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_path: Option<PathBuf>,
    /// Base URL the generated playlists are published under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Shape of the standalone sources list file
#[derive(Debug, Clone, Deserialize)]
struct SourcesFile {
    sources: Vec<String>,
    #[serde(default)]
    backup_sources: Vec<String>,
}

fn default_primary_sources() -> Vec<String> {
    DEFAULT_PRIMARY_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_backup_sources() -> Vec<String> {
    DEFAULT_BACKUP_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_fetch_attempts() -> u32 {
    DEFAULT_FETCH_ATTEMPTS
}

fn default_fetch_retry_delay() -> Duration {
    Duration::from_millis(DEFAULT_FETCH_RETRY_DELAY_MS)
}

fn default_fetch_pause() -> Duration {
    Duration::from_millis(DEFAULT_FETCH_PAUSE_MS)
}

fn default_fetch_user_agent() -> String {
    DEFAULT_FETCH_USER_AGENT.to_string()
}

fn default_validation_workers() -> usize {
    DEFAULT_VALIDATION_WORKERS
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
}

fn default_progress_interval() -> usize {
    DEFAULT_PROGRESS_INTERVAL
}

fn default_probe_user_agent() -> String {
    DEFAULT_PROBE_USER_AGENT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_sources(),
            backup: default_backup_sources(),
            sources_file: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            attempts: default_fetch_attempts(),
            retry_delay: default_fetch_retry_delay(),
            pause_between: default_fetch_pause(),
            user_agent: default_fetch_user_agent(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            workers: default_validation_workers(),
            probe_timeout: default_probe_timeout(),
            progress_interval: default_progress_interval(),
            user_agent: default_probe_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl SourcesConfig {
    /// Primary and backup lists, taken from `sources_file` when it is set and
    /// readable, otherwise from the inline lists.
    pub fn resolve(&self) -> (Vec<String>, Vec<String>) {
        if let Some(path) = &self.sources_file {
            match Self::read_sources_file(path) {
                Ok(file) => return (file.sources, file.backup_sources),
                Err(e) => warn!(
                    "Failed to load sources list {}: {}. Using configured lists",
                    path.display(),
                    e
                ),
            }
        }
        (self.primary.clone(), self.backup.clone())
    }

    fn read_sources_file(path: &Path) -> AppResult<SourcesFile> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ReportConfig {
    /// Configured base URL, or one derived from the GitHub Actions repository
    /// variables. Owner and repository fall back to their defaults separately.
    pub fn resolve_base_url(&self) -> String {
        if let Some(base) = &self.base_url {
            return base.trim_end_matches('/').to_string();
        }
        raw_outputs_url(
            std::env::var("GITHUB_REPOSITORY_OWNER").ok(),
            std::env::var("GITHUB_REPOSITORY").ok(),
        )
    }
}

/// Raw-content URL of the outputs directory; `repository` may be `owner/name`
fn raw_outputs_url(owner: Option<String>, repository: Option<String>) -> String {
    let owner = owner
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| DEFAULT_REPOSITORY_OWNER.to_string());
    let repo = repository
        .as_deref()
        .and_then(|r| r.rsplit('/').next())
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REPOSITORY_NAME);
    format!("https://raw.githubusercontent.com/{owner}/{repo}/main/outputs")
}

impl Config {
    /// Read `config_file`, or write the defaults there and return them when it
    /// does not exist yet.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.validation.workers == 0 {
            return Err(AppError::configuration(
                "validation.workers must be at least 1",
            ));
        }
        if self.validation.probe_timeout.is_zero() {
            return Err(AppError::configuration(
                "validation.probe_timeout must be greater than zero",
            ));
        }
        if self.fetch.attempts == 0 {
            return Err(AppError::configuration("fetch.attempts must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[validation]
workers = 12
probe_timeout = "750ms"
"#,
        )
        .unwrap();

        assert_eq!(config.validation.workers, 12);
        assert_eq!(config.validation.probe_timeout, Duration::from_millis(750));
        assert_eq!(config.validation.progress_interval, 20);
        assert_eq!(config.fetch.timeout, Duration::from_secs(15));
        assert_eq!(config.sources.primary.len(), 2);
        assert_eq!(config.output.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_load_writes_default_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.validation.workers, DEFAULT_VALIDATION_WORKERS);

        let reloaded = Config::load_from_file(path_str).unwrap();
        assert_eq!(reloaded.validation.probe_timeout, Duration::from_secs(3));
        assert_eq!(reloaded.sources.backup, config.sources.backup);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config: Config = toml::from_str("[validation]\nworkers = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_sources_file_overrides_inline_lists() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("sources_list.json");
        std::fs::write(
            &list,
            r#"{"sources": ["http://one/a.m3u"], "backup_sources": ["http://two/b.m3u"]}"#,
        )
        .unwrap();

        let sources = SourcesConfig {
            sources_file: Some(list),
            ..SourcesConfig::default()
        };
        let (primary, backup) = sources.resolve();
        assert_eq!(primary, vec!["http://one/a.m3u"]);
        assert_eq!(backup, vec!["http://two/b.m3u"]);
    }

    #[test]
    fn test_unreadable_sources_file_falls_back() {
        let sources = SourcesConfig {
            primary: vec!["http://inline/a.m3u".to_string()],
            backup: vec![],
            sources_file: Some(PathBuf::from("/nonexistent/sources_list.json")),
        };
        let (primary, backup) = sources.resolve();
        assert_eq!(primary, vec!["http://inline/a.m3u"]);
        assert!(backup.is_empty());
    }

    #[test]
    fn test_explicit_base_url_is_trimmed() {
        let report = ReportConfig {
            readme_path: None,
            base_url: Some("https://cdn.example.com/out/".to_string()),
        };
        assert_eq!(report.resolve_base_url(), "https://cdn.example.com/out");
    }

    #[rstest]
    #[case(None, None, "mymsnn/DailyIPTV")]
    #[case(Some("alice"), None, "alice/DailyIPTV")]
    #[case(None, Some("bob/Repo"), "mymsnn/Repo")]
    #[case(Some("carol"), Some("carol/Channels"), "carol/Channels")]
    fn test_repository_parts_default_separately(
        #[case] owner: Option<&str>,
        #[case] repository: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            raw_outputs_url(owner.map(str::to_string), repository.map(str::to_string)),
            format!("https://raw.githubusercontent.com/{expected}/main/outputs")
        );
    }
}
