//! Error taxonomy for pipeline runs
//!
//! Each collaborator family has its own error type. The orchestrator wraps
//! whichever one a stage produced into a [`PipelineError::Stage`], which
//! names the stage that failed.

use crate::core::ledger::Stage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A content-generation stage (idea, outline, script) failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The underlying model call failed (connection, non-zero exit, timeout)
    #[error("model call failed: {0}")]
    Model(String),

    /// The agent answered, but the answer failed structural validation
    #[error("invalid output: {0}")]
    InvalidOutput(String),
}

/// Speech synthesis failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("speech backend unavailable: {0}")]
    Unavailable(String),

    #[error("unsupported voice or engine: {0}")]
    Unsupported(String),

    #[error("speech synthesis failed: {0}")]
    Failed(String),

    #[error("speech backend reported {0} but no file exists there")]
    MissingArtifact(String),

    #[error("speech backend returned an empty audio reference")]
    EmptyArtifact,
}

/// Video composition failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("audio artifact not found: {0}")]
    MissingAudio(String),

    #[error("encoder failed: {0}")]
    Encoder(String),

    #[error("video composition failed: {0}")]
    Failed(String),

    #[error("video backend reported {0} but no file exists there")]
    MissingArtifact(String),

    #[error("video backend returned an empty video reference")]
    EmptyArtifact,
}

/// The request cannot start a run
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidRequestError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("max_words must be greater than zero")]
    ZeroMaxWords,

    #[error("language code must not be empty")]
    EmptyLanguage,
}

/// Coarse classification of a stage failure, kept in ledger records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Generation,
    Synthesis,
    Composition,
    Timeout,
}

/// Why a single stage attempt failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageFailure {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error("timed out after {after:?}")]
    Timeout { after: Duration },
}

impl StageFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StageFailure::Generation(_) => ErrorKind::Generation,
            StageFailure::Synthesis(_) => ErrorKind::Synthesis,
            StageFailure::Composition(_) => ErrorKind::Composition,
            StageFailure::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, StageFailure::Timeout { .. })
    }
}

/// The ledger refused a record that would break pipeline ordering
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{stage} recorded out of order (expected {expected})")]
    OutOfOrder { stage: Stage, expected: Stage },

    #[error("{stage} recorded after {failed} already failed")]
    AfterFailure { stage: Stage, failed: Stage },

    #[error("{stage} recorded after all stages completed")]
    Full { stage: Stage },
}

/// Error returned by [`crate::execution::Orchestrator::run_pipeline`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequestError),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageFailure,
    },

    #[error("pipeline cancelled before {next_stage} stage")]
    Cancelled { next_stage: Stage },

    #[error("task ledger rejected record: {0}")]
    Ledger(#[from] LedgerError),
}

impl PipelineError {
    /// The stage this error is tagged with, if it came from a stage attempt
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying stage failure, if any
    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            PipelineError::Stage { source, .. } => Some(source),
            _ => None,
        }
    }
}
