//! novacast - turn a topic into a narrated video
//!
//! A run goes through five stages in order: ideation, outline, script,
//! speech and video. The [`Orchestrator`] sequences them, records every
//! attempt in a [`TaskLedger`], and stops at the first failure.

pub mod agent;
pub mod cli;
pub mod core;
pub mod execution;
pub mod media;
pub mod persistence;

// Re-export commonly used types
pub use agent::{IdeationAgent, ModelClient, OutlineAgent, ScriptAgent, StageAgent};
pub use core::{
    ArtifactRef, CompositionError, GenerationError, InvalidRequestError, Outline,
    OutlineRequest, OutlineSection, PipelineError, PipelineRequest, PipelineResult, RunStatus,
    ScriptRequest, Stage, StageFailure, StageOutput, StageRecord, StageStatus, SynthesisError,
    TaskLedger,
};
pub use execution::{
    CancellationHandle, Collaborators, ExecutionEvent, Orchestrator, OrchestratorConfig,
    StageTimeouts,
};
pub use media::MediaBackend;
