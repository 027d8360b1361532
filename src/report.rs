//! README "live sources" section

use regex::{NoExpand, Regex};
use std::path::Path;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::{Category, RunSummary};
use crate::storage::{category_file_name, VALIDATED_PLAYLIST_FILE};

pub const SECTION_HEADING: &str = "## 📡 直播源地址";

/// Categories linked from the section, with their display labels
const LINKED_CATEGORIES: [(Category, &str); 4] = [
    (Category::Cctv, "央视"),
    (Category::Satellite, "卫视"),
    (Category::Local, "地方"),
    (Category::Hongkong, "港台"),
];

pub struct ReadmeReport {
    base_url: String,
    section_pattern: Regex,
}

impl ReadmeReport {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let pattern = format!(r"(?s){}.*?---", regex::escape(SECTION_HEADING));
        let section_pattern = Regex::new(&pattern)
            .map_err(|e| AppError::internal(format!("invalid README section pattern: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            section_pattern,
        })
    }

    pub fn render(&self, summary: &RunSummary) -> String {
        let base = &self.base_url;
        let validated = format!("{base}/{VALIDATED_PLAYLIST_FILE}");

        let mut section = String::new();
        section.push_str(SECTION_HEADING);
        section.push_str("\n\n");
        section.push_str(&format!("最后更新: {}\n\n", summary.update_time));

        section.push_str("### ✅ 已验证列表\n");
        section.push_str(&format!("- **完整列表**: [{validated}]({validated})\n"));
        section.push_str(&format!("- 有效频道: {} 个\n", summary.valid_channels));
        section.push_str(&format!("- 有效性: {:.1}%\n\n", summary.validity_ratio * 100.0));

        section.push_str("### 📺 分类频道\n");
        for (category, label) in LINKED_CATEGORIES {
            let url = format!("{base}/{}", category_file_name(category));
            let count = summary.categories.get(&category).copied().unwrap_or(0);
            section.push_str(&format!("- **{label}**: [{url}]({url}) ({count}个)\n"));
        }
        section.push('\n');

        section.push_str("### 📊 统计信息\n");
        section.push_str(&format!("- 总频道: {} 个\n", summary.total_channels));
        section.push_str(&format!("- 验证耗时: {} 秒\n", summary.validation_seconds));
        section.push_str(&format!("- 更新时间: {}\n\n", summary.update_time));
        section.push_str("---");
        section
    }

    /// Replace an existing section, or insert one after the first top-level
    /// heading (at the very top when there is none). A README that has the
    /// heading but no closing `---` is returned unchanged.
    pub fn splice(&self, readme: &str, section: &str) -> String {
        if readme.contains(SECTION_HEADING) {
            if !self.section_pattern.is_match(readme) {
                warn!("README section has no closing ---, leaving it unchanged");
            }
            return self
                .section_pattern
                .replace(readme, NoExpand(section))
                .into_owned();
        }

        let mut offset = 0;
        for line in readme.split_inclusive('\n') {
            offset += line.len();
            if line.starts_with("# ") {
                let (head, tail) = readme.split_at(offset);
                let separator = if head.ends_with('\n') { "" } else { "\n" };
                return format!("{head}{separator}\n{section}\n\n{tail}");
            }
        }

        format!("{section}\n\n{readme}")
    }

    /// Rewrite the README at `path`. A missing file is left alone.
    pub async fn update(&self, path: &Path, summary: &RunSummary) -> AppResult<bool> {
        let readme = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("README not found at {}, skipping update", path.display());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let updated = self.splice(&readme, &self.render(summary));
        tokio::fs::write(path, updated).await?;
        info!("Updated README at {}", path.display());
        Ok(true)
    }
}
