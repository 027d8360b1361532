//! M3U playlist parsing
//!
//! Turns raw playlist text into an ordered list of [`ChannelRecord`]s. Parsing
//! never fails: malformed sections are skipped and counted so the caller can
//! report them.

use tracing::{debug, trace};

use crate::models::ChannelRecord;

/// Line prefix that opens a channel entry
pub const EXTINF_MARKER: &str = "#EXTINF";

/// Locator prefixes accepted as the closing line of an entry
pub const TRANSPORT_SCHEMES: [&str; 4] = ["http://", "https://", "rtsp://", "rtmp://"];

/// Records parsed from one document plus counters for what was skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    pub records: Vec<ChannelRecord>,
    /// Locator lines seen with no pending `#EXTINF`
    pub orphaned_locators: usize,
    /// `#EXTINF` lines replaced by another one, or left open at end of input
    pub unterminated_entries: usize,
}

impl ParsedPlaylist {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse playlist text into channel records, tagging each with `source_origin`.
///
/// Placeholder names (`Unknown_<n>`) use the record's ordinal within this call,
/// so they are stable across repeated parses of the same text.
pub fn parse_m3u(content: &str, source_origin: &str) -> ParsedPlaylist {
    let mut parsed = ParsedPlaylist::default();
    let mut pending: Option<String> = None;

    for (line_num, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTINF_MARKER) {
            if pending.replace(line.to_string()).is_some() {
                parsed.unterminated_entries += 1;
                trace!("EXTINF at line {} replaced an open entry", line_num + 1);
            }
        } else if is_transport_line(line) {
            match pending.take() {
                Some(metadata_line) => {
                    let display_name = extract_display_name(&metadata_line)
                        .unwrap_or_else(|| format!("Unknown_{}", parsed.records.len()));
                    parsed.records.push(ChannelRecord {
                        display_name,
                        metadata_line,
                        stream_locator: line.to_string(),
                        source_origin: source_origin.to_string(),
                    });
                }
                None => {
                    parsed.orphaned_locators += 1;
                    debug!(
                        "Skipping stream URL without EXTINF metadata at line {}: {}",
                        line_num + 1,
                        line
                    );
                }
            }
        }
    }

    if pending.is_some() {
        parsed.unterminated_entries += 1;
    }

    debug!(
        "Parsed {} channels from {} ({} orphaned, {} unterminated)",
        parsed.records.len(),
        source_origin,
        parsed.orphaned_locators,
        parsed.unterminated_entries
    );
    parsed
}

fn is_transport_line(line: &str) -> bool {
    TRANSPORT_SCHEMES.iter().any(|scheme| {
        line.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Text after the last comma that is neither backslash-escaped nor inside a
/// double-quoted attribute value. `None` if there is no such comma or the
/// remaining text is blank.
pub fn extract_display_name(metadata_line: &str) -> Option<String> {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut last_comma = None;

    for (idx, ch) in metadata_line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last_comma = Some(idx),
            _ => {}
        }
    }

    let name = metadata_line[last_comma? + 1..].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
