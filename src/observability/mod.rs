//! Pipeline events and the sinks that consume them
//!
//! Components never write to a process-wide log buffer. They receive an
//! [`EventSink`] and emit typed [`PipelineEvent`]s into it; the binary decides
//! whether those go to `tracing`, to a retained run log, or both.

use chrono::Local;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// Something worth reporting during a run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStarted,
    SourceFetching { origin: String },
    SourceFailed { origin: String, code: &'static str, message: String },
    SourceParsed { origin: String, records: usize, orphaned: usize },
    BackupFallback { backups: usize },
    Deduplicated { before: usize, after: usize },
    QualityFiltered { before: usize, after: usize, advisory: usize },
    ValidationStarted { total: usize, workers: usize },
    ValidationProgress { completed: usize, total: usize },
    ValidationFinished { reachable: usize, total: usize, elapsed: Duration },
    Categorized { category: &'static str, count: usize },
    RunFinished { validated: usize, quality: usize, elapsed: Duration },
    Message(String),
}

impl PipelineEvent {
    fn is_failure(&self) -> bool {
        matches!(self, Self::SourceFailed { .. })
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunStarted => write!(f, "Starting playlist update"),
            Self::SourceFetching { origin } => write!(f, "Fetching: {origin}"),
            Self::SourceFailed {
                origin,
                code,
                message,
            } => write!(f, "{code} {origin}: {message}"),
            Self::SourceParsed {
                origin,
                records,
                orphaned,
            } => write!(
                f,
                "Parsed {records} channels from {origin} ({orphaned} orphaned locators skipped)"
            ),
            Self::BackupFallback { backups } => {
                write!(f, "No primary source succeeded, trying {backups} backup sources")
            }
            Self::Deduplicated { before, after } => {
                write!(f, "Deduplicated channels: {after} (from {before})")
            }
            Self::QualityFiltered {
                before,
                after,
                advisory,
            } => write!(
                f,
                "Quality filter kept {after}/{before} channels ({advisory} matched advisory keywords)"
            ),
            Self::ValidationStarted { total, workers } => {
                write!(f, "Validating {total} channels with {workers} workers")
            }
            Self::ValidationProgress { completed, total } => {
                write!(f, "Validated {completed}/{total} channels")
            }
            Self::ValidationFinished {
                reachable,
                total,
                elapsed,
            } => write!(
                f,
                "Validation finished: {reachable}/{total} reachable in {:.2}s",
                elapsed.as_secs_f64()
            ),
            Self::Categorized { category, count } => write!(f, "Category {category}: {count}"),
            Self::RunFinished {
                validated,
                quality,
                elapsed,
            } => write!(
                f,
                "Update finished in {:.1}s: {validated}/{quality} channels valid",
                elapsed.as_secs_f64()
            ),
            Self::Message(message) => f.write_str(message),
        }
    }
}

/// Destination for pipeline events. Implementations must not block for long;
/// the validator emits progress from its result-collecting loop.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        if event.is_failure() {
            warn!("{}", event);
        } else {
            info!("{}", event);
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// Retains every event, plus a timestamped line per event for the run log.
/// Optionally forwards to another sink as well.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
    lines: Mutex<Vec<String>>,
    forward: Option<Arc<dyn EventSink>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(sink: Arc<dyn EventSink>) -> Self {
        Self {
            forward: Some(sink),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// `[YYYY-MM-DD HH:MM:SS] message` lines in emission order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        let line = format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), event);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
        if let Some(forward) = &self.forward {
            forward.emit(event.clone());
        }
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order_and_formats_lines() {
        let sink = RecordingSink::new();
        sink.emit(PipelineEvent::RunStarted);
        sink.emit(PipelineEvent::Deduplicated {
            before: 8,
            after: 6,
        });

        assert_eq!(sink.events().len(), 2);
        let lines = sink.lines();
        assert!(lines[0].ends_with("] Starting playlist update"));
        assert!(lines[1].ends_with("Deduplicated channels: 6 (from 8)"));
        assert!(lines[1].starts_with('['));
    }

    #[test]
    fn test_recording_sink_forwards() {
        let inner = Arc::new(RecordingSink::new());
        let outer = RecordingSink::forwarding_to(inner.clone());
        outer.emit(PipelineEvent::Message("hello".to_string()));
        assert_eq!(
            inner.events(),
            vec![PipelineEvent::Message("hello".to_string())]
        );
    }
}
