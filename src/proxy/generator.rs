use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

use crate::models::ChannelRecord;

pub const RAW_PLAYLIST_TITLE: &str = "原始直播源";
pub const VALIDATED_PLAYLIST_TITLE: &str = "已验证直播源";

/// Title used for a per-category playlist
pub fn category_title(category: &str) -> String {
    format!("{category}频道")
}

/// Renders record sequences back into M3U text
#[derive(Debug, Clone, Default)]
pub struct PlaylistGenerator;

impl PlaylistGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, records: &[ChannelRecord], title: &str) -> String {
        self.generate_at(records, title, Utc::now())
    }

    /// Same as [`generate`](Self::generate) with a fixed generation time
    pub fn generate_at(&self, records: &[ChannelRecord], title: &str, now: DateTime<Utc>) -> String {
        let local = now.with_timezone(&Local);
        let mut m3u = String::with_capacity(256 + records.len() * 128);

        m3u.push_str("#EXTM3U\n");
        m3u.push_str("#EXTENC: UTF-8\n");
        let _ = writeln!(m3u, "# Generated: {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(m3u, "# Updated: {}", local.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(m3u, "# Title: {title}");
        let _ = writeln!(m3u, "# Total Channels: {}", records.len());
        m3u.push_str("# For personal testing only.\n\n");

        for record in records {
            m3u.push_str(&record.metadata_line);
            m3u.push('\n');
            m3u.push_str(&record.stream_locator);
            m3u.push('\n');
        }

        m3u
    }
}
