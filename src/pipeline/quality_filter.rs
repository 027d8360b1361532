//! Name-based quality filtering

use crate::models::ChannelRecord;

/// Names containing any of these are test or placeholder entries
pub const EXCLUDED_KEYWORDS: [&str; 5] = ["test", "example", "demo", "无效", "测试"];

/// Known-good broadcaster terms. Matching records are currently kept exactly
/// like unmatched ones; see [`QualityVerdict::AdvisoryMatch`].
pub const ADVISORY_KEYWORDS: [&str; 19] = [
    "cctv", "央视", "卫视", "湖南", "浙江", "江苏", "北京", "上海", "广东", "viutv", "无线新闻",
    "hoy", "now", "香港", "凤凰", "翡翠", "明珠", "tvb", "rthk",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityVerdict {
    Excluded,
    /// Name hits the advisory set. Kept, with no other effect.
    AdvisoryMatch,
    Neutral,
}

impl QualityVerdict {
    pub fn keeps(&self) -> bool {
        !matches!(self, Self::Excluded)
    }
}

/// Records that survived plus counters for the run log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterResult {
    pub kept: Vec<ChannelRecord>,
    pub excluded: usize,
    pub advisory: usize,
}

#[derive(Debug, Clone, Default)]
pub struct QualityFilter;

impl QualityFilter {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, display_name: &str) -> QualityVerdict {
        let name = display_name.to_lowercase();
        if contains_any(&name, &EXCLUDED_KEYWORDS) {
            QualityVerdict::Excluded
        } else if contains_any(&name, &ADVISORY_KEYWORDS) {
            QualityVerdict::AdvisoryMatch
        } else {
            QualityVerdict::Neutral
        }
    }

    pub fn filter(&self, records: Vec<ChannelRecord>) -> FilterResult {
        let mut result = FilterResult {
            kept: Vec::with_capacity(records.len()),
            ..FilterResult::default()
        };

        for record in records {
            match self.assess(&record.display_name) {
                QualityVerdict::Excluded => {
                    result.excluded += 1;
                    continue;
                }
                QualityVerdict::AdvisoryMatch => {
                    // Intentionally no-op: inclusion is already the default
                    result.advisory += 1;
                }
                QualityVerdict::Neutral => {}
            }
            result.kept.push(record);
        }

        result
    }
}

/// `haystack` must already be lowercase
pub(crate) fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|keyword| haystack.contains(keyword.to_lowercase().as_str()))
}
