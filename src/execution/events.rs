//! Progress events emitted while a pipeline runs

use crate::core::{RunStatus, Stage, StageOutput};
use std::sync::Arc;
use uuid::Uuid;

/// Events that can occur during a pipeline run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        topic: String,
    },
    StageStarted {
        run_id: Uuid,
        stage: Stage,
    },
    StageCompleted {
        run_id: Uuid,
        stage: Stage,
        output: StageOutput,
    },
    StageFailed {
        run_id: Uuid,
        stage: Stage,
        error: String,
    },
    PipelineFinished {
        run_id: Uuid,
        status: RunStatus,
    },
}

impl ExecutionEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            ExecutionEvent::PipelineStarted { run_id, .. }
            | ExecutionEvent::StageStarted { run_id, .. }
            | ExecutionEvent::StageCompleted { run_id, .. }
            | ExecutionEvent::StageFailed { run_id, .. }
            | ExecutionEvent::PipelineFinished { run_id, .. } => *run_id,
        }
    }
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;
