//! Locator-keyed deduplication

use std::collections::HashSet;

use crate::models::ChannelRecord;

/// Drop records whose `stream_locator` was already seen. The earliest record
/// for a locator wins and first-seen order is kept.
pub fn deduplicate<I>(records: I) -> Vec<ChannelRecord>
where
    I: IntoIterator<Item = ChannelRecord>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.stream_locator.clone()))
        .collect()
}
