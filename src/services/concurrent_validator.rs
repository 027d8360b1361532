//! Bounded fan-out of reachability probes
//!
//! Every record is spawned onto a [`JoinSet`] up front; a semaphore with `W`
//! permits limits how many probes actually run at once. Outcomes are collected
//! from the join set as tasks finish, so aggregation happens on a single task
//! and arrives in completion order.

use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, error};

use crate::config::ValidationConfig;
use crate::models::{ChannelRecord, ReasonCode, ValidationOutcome};
use crate::observability::{EventSink, PipelineEvent};
use crate::services::reachability_prober::ReachabilityProber;

/// Extra time a probe gets beyond its own timeout before the validator gives
/// up on it and records a timeout itself.
pub const DEFAULT_DEADLINE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Records whose outcome was reachable, in completion order
    pub reachable: Vec<ChannelRecord>,
    /// One outcome per input record, in completion order
    pub outcomes: Vec<ValidationOutcome>,
    pub elapsed: Duration,
}

impl ValidationReport {
    pub fn reachable_count(&self) -> usize {
        self.reachable.len()
    }
}

pub struct ConcurrentValidator {
    prober: Arc<dyn ReachabilityProber>,
    workers: usize,
    timeout: Duration,
    progress_interval: usize,
    deadline_grace: Duration,
}

impl ConcurrentValidator {
    /// `workers` of zero is treated as one
    pub fn new(prober: Arc<dyn ReachabilityProber>, workers: usize, timeout: Duration) -> Self {
        Self {
            prober,
            workers: workers.max(1),
            timeout,
            progress_interval: 0,
            deadline_grace: DEFAULT_DEADLINE_GRACE,
        }
    }

    pub fn from_config(prober: Arc<dyn ReachabilityProber>, config: &ValidationConfig) -> Self {
        Self::new(prober, config.workers, config.probe_timeout)
            .with_progress_interval(config.progress_interval)
    }

    /// Emit a progress event every `interval` completions; 0 disables
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn with_deadline_grace(mut self, grace: Duration) -> Self {
        self.deadline_grace = grace;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn validate(&self, records: Vec<ChannelRecord>, sink: &dyn EventSink) -> ValidationReport {
        let total = records.len();
        let started = Instant::now();
        sink.emit(PipelineEvent::ValidationStarted {
            total,
            workers: self.workers,
        });

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(total);
        // Huge configured timeouts must not overflow
        let deadline = self.timeout.saturating_add(self.deadline_grace);

        for record in records {
            let prober = Arc::clone(&self.prober);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.timeout;
            let task_record = record.clone();

            let handle = tasks.spawn(async move {
                let record = task_record;
                // The semaphore is never closed, so acquisition only waits
                let _permit = semaphore.acquire().await.ok();
                let probe = tokio::time::timeout(deadline, prober.probe(&record, timeout));
                let result = AssertUnwindSafe(probe).catch_unwind().await;
                match result {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(_elapsed)) => {
                        ValidationOutcome::new(record, false, ReasonCode::Timeout)
                    }
                    Err(panic) => ValidationOutcome::new(record, false, ReasonCode::UnknownError)
                        .with_detail(panic_message(panic.as_ref())),
                }
            });
            pending.insert(handle.id(), record);
        }

        let mut report = self.collect(tasks, pending, sink).await;
        report.elapsed = started.elapsed();
        sink.emit(PipelineEvent::ValidationFinished {
            reachable: report.reachable.len(),
            total,
            elapsed: report.elapsed,
        });
        report
    }

    /// Drain `tasks` in completion order. A task that fails to join still
    /// yields an `UNKNOWN_ERROR` outcome for the record it was spawned with.
    async fn collect(
        &self,
        mut tasks: JoinSet<ValidationOutcome>,
        mut pending: HashMap<Id, ChannelRecord>,
        sink: &dyn EventSink,
    ) -> ValidationReport {
        let total = pending.len();
        let mut report = ValidationReport {
            outcomes: Vec::with_capacity(total),
            ..ValidationReport::default()
        };

        while let Some(joined) = tasks.join_next_with_id().await {
            let outcome = match joined {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    outcome
                }
                Err(e) => match pending.remove(&e.id()) {
                    Some(record) => {
                        error!("Probe task for {} failed to join: {}", record.display_name, e);
                        ValidationOutcome::new(record, false, ReasonCode::UnknownError)
                            .with_detail(format!("probe task failed: {e}"))
                    }
                    None => {
                        error!("Untracked probe task failed to join: {}", e);
                        continue;
                    }
                },
            };

            debug!(
                "{} -> {}",
                outcome.record.display_name, outcome.reason_code
            );
            if outcome.reachable {
                report.reachable.push(outcome.record.clone());
            }
            report.outcomes.push(outcome);

            let completed = report.outcomes.len();
            if self.progress_interval > 0 && completed % self.progress_interval == 0 {
                sink.emit(PipelineEvent::ValidationProgress { completed, total });
            }
        }

        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("probe panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("probe panicked: {message}")
    } else {
        "probe panicked".to_string()
    }
}
