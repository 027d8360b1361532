//! Keyword classification of validated channels

use crate::models::{Category, CategoryBuckets, ChannelRecord};
use crate::pipeline::quality_filter::contains_any;

/// Rule sets in priority order; the first set with a match decides.
/// The sets are disjoint, but a name can still hit several of them.
pub const CATEGORY_RULES: [(Category, &[&str]); 4] = [
    (Category::Cctv, &["cctv", "央视", "中央"]),
    (Category::Satellite, &["卫视", "凤凰", "湖南", "浙江", "江苏", "北京"]),
    (Category::Local, &["都市", "新闻", "民生", "公共", "教育", "少儿", "体育"]),
    (
        Category::Hongkong,
        &["tvb", "viutv", "无线新闻", "hoy", "now", "翡翠", "明珠", "rthk"],
    ),
];

pub fn categorize(display_name: &str) -> Category {
    let name = display_name.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&name, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

impl CategoryBuckets {
    /// Bucket records by [`categorize`], keeping their relative order
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ChannelRecord>,
    {
        let mut buckets = Self::new();
        for record in records {
            buckets.push(categorize(&record.display_name), record.clone());
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("CCTV-1 综合", Category::Cctv)]
    #[case("cctv5 体育", Category::Cctv)]
    #[case("央视新闻", Category::Cctv)]
    #[case("湖南卫视", Category::Satellite)]
    #[case("凤凰中文", Category::Satellite)]
    #[case("北京卫视 CCTV", Category::Cctv)]
    #[case("深圳都市频道", Category::Local)]
    #[case("TVB翡翠台", Category::Hongkong)]
    #[case("ViuTV", Category::Hongkong)]
    #[case("RTHK 31", Category::Hongkong)]
    #[case("Random Channel", Category::Other)]
    #[case("", Category::Other)]
    fn test_categorize(#[case] name: &str, #[case] expected: Category) {
        assert_eq!(categorize(name), expected);
    }

    #[test]
    fn test_rule_sets_are_disjoint() {
        for (i, (_, left)) in CATEGORY_RULES.iter().enumerate() {
            for (_, right) in CATEGORY_RULES.iter().skip(i + 1) {
                assert!(left.iter().all(|k| !right.contains(k)));
            }
        }
    }

    #[test]
    fn test_every_record_lands_in_one_bucket() {
        let records: Vec<ChannelRecord> = ["CCTV-1", "湖南卫视", "Random", "TVB", "少儿频道", "Other"]
            .iter()
            .map(|name| ChannelRecord::new(*name, format!("#EXTINF:-1,{name}"), format!("http://x/{name}"), "unit"))
            .collect();

        let buckets = CategoryBuckets::from_records(&records);

        assert_eq!(buckets.total(), records.len());
        assert_eq!(buckets.get(Category::Other).len(), 2);
        assert_eq!(buckets.get(Category::Local)[0].display_name, "少儿频道");
    }
}
