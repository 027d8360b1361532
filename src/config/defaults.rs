/// Configuration default values
///
/// All default values for configuration options live here so they can be
/// changed in one place.
// Source defaults
pub const DEFAULT_PRIMARY_SOURCES: [&str; 2] = [
    "https://raw.githubusercontent.com/iptv-org/iptv/master/index.m3u",
    "https://raw.githubusercontent.com/fanmingming/live/main/tv/m3u/global.m3u",
];
pub const DEFAULT_BACKUP_SOURCES: [&str; 1] = ["https://gitlab.com/iptv-org/iptv/-/raw/master/index.m3u"];

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 2;
pub const DEFAULT_FETCH_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_FETCH_PAUSE_MS: u64 = 1000;
pub const DEFAULT_FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// Validation defaults
pub const DEFAULT_VALIDATION_WORKERS: usize = 5;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 20;
pub const DEFAULT_PROBE_USER_AGENT: &str = "Mozilla/5.0";

// Output defaults
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_LOG_DIR: &str = "logs";

// Report defaults
pub const DEFAULT_REPOSITORY_OWNER: &str = "mymsnn";
pub const DEFAULT_REPOSITORY_NAME: &str = "DailyIPTV";
