//! In-memory record of submitted runs and their results.

use harvest_core::{RunId, SiteExtractionResult, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Waiting for the run gate
    Queued,
    /// Holding a session and scraping
    Running,
    /// Emitted `done`
    Completed,
    /// Emitted `error`
    Failed,
}

impl RunStatus {
    /// Whether the run has ended.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone)]
struct RunRecord {
    status: RunStatus,
    started_at: Timestamp,
    finished_at: Option<Timestamp>,
    results: Vec<SiteExtractionResult>,
}

/// Point-in-time copy of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    /// Run the snapshot belongs to
    pub run_id: RunId,
    /// Status when the snapshot was taken
    pub status: RunStatus,
    /// When the run was submitted
    pub started_at: Timestamp,
    /// When the run ended, if it has
    pub finished_at: Option<Timestamp>,
    /// Results in visit order
    pub results: Vec<SiteExtractionResult>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    runs: HashMap<RunId, RunRecord>,
    order: VecDeque<RunId>,
    latest_finished: Option<RunId>,
}

/// Results per run, keyed by `RunId`.
///
/// Finished runs beyond the retention limit are dropped oldest first.
/// Runs still queued or running are never evicted.
#[derive(Debug)]
pub struct RunRegistry {
    inner: RwLock<RegistryInner>,
    max_retained: usize,
}

impl RunRegistry {
    /// Registry keeping at most `max_retained` finished runs.
    #[must_use]
    pub fn new(max_retained: usize) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            max_retained: max_retained.max(1),
        }
    }

    /// Record a newly submitted run as queued.
    pub async fn register(&self, run_id: RunId) {
        let mut inner = self.inner.write().await;
        inner.order.push_back(run_id.clone());
        inner.runs.insert(
            run_id,
            RunRecord {
                status: RunStatus::Queued,
                started_at: Timestamp::now(),
                finished_at: None,
                results: Vec::new(),
            },
        );
    }

    /// Mark a run as holding the gate.
    pub async fn mark_running(&self, run_id: &RunId) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.runs.get_mut(run_id) {
            record.status = RunStatus::Running;
        }
    }

    /// Append one result to a run.
    pub async fn push_result(&self, run_id: &RunId, result: SiteExtractionResult) {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.runs.get_mut(run_id) {
            record.results.push(result);
        }
    }

    /// Mark a run as ended and apply retention.
    pub async fn finish(&self, run_id: &RunId, status: RunStatus) {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.runs.get_mut(run_id) else {
            return;
        };
        record.status = status;
        record.finished_at = Some(Timestamp::now());
        inner.latest_finished = Some(run_id.clone());

        self.evict(&mut inner);
    }

    fn evict(&self, inner: &mut RegistryInner) {
        let finished = inner
            .runs
            .values()
            .filter(|r| r.status.is_finished())
            .count();
        let mut excess = finished.saturating_sub(self.max_retained);
        if excess == 0 {
            return;
        }

        let RegistryInner { runs, order, .. } = inner;
        order.retain(|id| {
            if excess > 0 && runs.get(id).is_some_and(|r| r.status.is_finished()) {
                runs.remove(id);
                excess -= 1;
                tracing::debug!(run_id = %id, "evicted finished run");
                false
            } else {
                true
            }
        });
    }

    /// Snapshot of a run, if it is still retained.
    pub async fn snapshot(&self, run_id: &RunId) -> Option<RunSnapshot> {
        let inner = self.inner.read().await;
        inner.runs.get(run_id).map(|record| RunSnapshot {
            run_id: run_id.clone(),
            status: record.status,
            started_at: record.started_at,
            finished_at: record.finished_at,
            results: record.results.clone(),
        })
    }

    /// Snapshot of the run that finished most recently.
    pub async fn latest_snapshot(&self) -> Option<RunSnapshot> {
        let latest = self.inner.read().await.latest_finished.clone()?;
        self.snapshot(&latest).await
    }
}
