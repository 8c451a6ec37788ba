use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::app::{Result, StorywireError};
use crate::pipeline::task::{SourceReport, SourceTask};

pub const DEFAULT_WORKERS: usize = 30;

/// Outcome of one source task. `Err` only when the task was cut off by the
/// pool; fetch and item failures are inside the report.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: String,
    pub result: Result<SourceReport>,
}

/// Runs source tasks with bounded concurrency and isolates their failures.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    deadline: Option<Duration>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::with_workers(DEFAULT_WORKERS)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            deadline: None,
        }
    }

    /// Bound each task's run time, measured from when it gets a worker.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Run every task and return once all of them have finished, in
    /// completion order.
    pub async fn run_all(&self, tasks: Vec<SourceTask>) -> Vec<SourceOutcome> {
        let mut set = JoinSet::new();

        for task in tasks {
            let semaphore = self.semaphore.clone();
            let deadline = self.deadline;

            set.spawn(async move {
                let source = task.source().name.clone();

                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return SourceOutcome {
                            source,
                            result: Err(StorywireError::Other("Worker pool closed".into())),
                        }
                    }
                };

                let result = match deadline {
                    Some(limit) => tokio::time::timeout(limit, task.run())
                        .await
                        .map_err(|_| StorywireError::DeadlineExceeded {
                            source_name: source.clone(),
                            secs: limit.as_secs(),
                        }),
                    None => Ok(task.run().await),
                };

                SourceOutcome { source, result }
            });
        }

        let mut outcomes = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("Source task join error: {}", e);
                }
            }
        }

        outcomes
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Totals for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sources: usize,
    pub fetched: usize,
    pub published: usize,
    pub already_seen: usize,
    pub dropped: usize,
    pub fetch_failures: usize,
    /// Tasks that never produced a report (deadline, panic).
    pub aborted: usize,
}

impl CycleReport {
    pub fn from_outcomes(sources: usize, outcomes: &[SourceOutcome]) -> Self {
        let mut report = CycleReport {
            sources,
            ..Default::default()
        };

        for outcome in outcomes {
            match &outcome.result {
                Ok(source) => {
                    report.fetched += source.fetched;
                    report.published += source.published;
                    report.already_seen += source.already_seen;
                    report.dropped += source.dropped;
                    if source.fetch_error.is_some() {
                        report.fetch_failures += 1;
                    }
                }
                Err(_) => report.aborted += 1,
            }
        }

        // Join errors are logged but leave no outcome behind.
        report.aborted += sources.saturating_sub(outcomes.len());
        report
    }
}
