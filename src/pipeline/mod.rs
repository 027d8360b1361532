//! Pure record-processing stages and the orchestrator that runs them

pub mod categorizer;
pub mod dedup;
pub mod orchestrator;
pub mod quality_filter;

pub use categorizer::categorize;
pub use dedup::deduplicate;
pub use orchestrator::{PipelineOutput, PipelineRunner};
pub use quality_filter::{FilterResult, QualityFilter, QualityVerdict};
