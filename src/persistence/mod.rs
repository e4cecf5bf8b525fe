//! Persistence layer for run history
//!
//! The orchestrator discards its ledger with the next run. Callers that
//! want to keep it snapshot the run into a [`RunSummary`] and hand it to a
//! [`PersistenceBackend`].

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

use crate::core::{
    PipelineError, PipelineRequest, PipelineResult, RunStatus, Stage, StageRecord, TaskLedger,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Snapshot of one finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Requested topic
    pub topic: String,

    /// How the run ended
    pub status: RunStatus,

    /// When the first stage started
    pub started_at: DateTime<Utc>,

    /// When the last stage was recorded
    pub completed_at: DateTime<Utc>,

    /// Stage whose failure ended the run
    pub failed_stage: Option<Stage>,

    /// Error message for failed or cancelled runs
    pub error: Option<String>,

    /// Every stage record, in pipeline order
    pub records: Vec<StageRecord>,
}

impl RunSummary {
    /// Snapshot a run from its outcome and ledger
    pub fn new(
        run_id: Uuid,
        request: &PipelineRequest,
        outcome: &std::result::Result<PipelineResult, PipelineError>,
        ledger: &TaskLedger,
    ) -> Self {
        let now = Utc::now();
        let status = RunStatus::from_outcome(outcome);
        let error = outcome.as_ref().err().map(ToString::to_string);

        Self {
            run_id,
            topic: request.topic.clone(),
            status,
            started_at: ledger.iter().next().map_or(now, StageRecord::started_at),
            completed_at: ledger.last().map_or(now, StageRecord::timestamp),
            failed_stage: ledger.failed_stage(),
            error,
            records: ledger.all().to_vec(),
        }
    }

    /// Number of successful stages
    pub fn completed_stages(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a run, replacing any earlier snapshot with the same ID
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// Most recent runs first, at most `limit`
    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>>;

    /// Delete a run
    async fn delete_run(&self, run_id: Uuid) -> Result<()>;
}

/// In-memory persistence (for testing or ephemeral use)
#[derive(Default)]
pub struct InMemoryPersistence {
    runs: RwLock<HashMap<Uuid, RunSummary>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        self.runs.write().await.insert(run.run_id, run.clone());
        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        Ok(self.runs.read().await.get(&run_id).cloned())
    }

    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let mut result: Vec<RunSummary> = runs.values().cloned().collect();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        result.truncate(limit);
        Ok(result)
    }

    async fn delete_run(&self, run_id: Uuid) -> Result<()> {
        self.runs.write().await.remove(&run_id);
        Ok(())
    }
}
