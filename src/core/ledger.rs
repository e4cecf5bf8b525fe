//! Task ledger - append-only record of stage attempts for one run

use crate::core::{
    error::{ErrorKind, LedgerError, StageFailure},
    outline::Outline,
    result::ArtifactRef,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// The five pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Ideation,
    Outline,
    Script,
    Speech,
    Video,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Ideation,
        Stage::Outline,
        Stage::Script,
        Stage::Speech,
        Stage::Video,
    ];

    /// Position in the pipeline, starting at 0
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage that runs after this one
    pub fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ideation => "IDEATION",
            Stage::Outline => "OUTLINE",
            Stage::Script => "SCRIPT",
            Stage::Speech => "SPEECH",
            Stage::Video => "VIDEO",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown stage: {}", s))
    }
}

/// Outcome of a stage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Success,
    Failure,
}

/// What a successful stage produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StageOutput {
    Idea(String),
    Outline(Outline),
    Script(String),
    Audio(ArtifactRef),
    Video(ArtifactRef),
}

impl StageOutput {
    /// The stage this kind of output belongs to
    pub fn stage(&self) -> Stage {
        match self {
            StageOutput::Idea(_) => Stage::Ideation,
            StageOutput::Outline(_) => Stage::Outline,
            StageOutput::Script(_) => Stage::Script,
            StageOutput::Audio(_) => Stage::Speech,
            StageOutput::Video(_) => Stage::Video,
        }
    }

    /// Plain-text rendering; outlines are flattened
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            StageOutput::Idea(text) | StageOutput::Script(text) => Cow::Borrowed(text),
            StageOutput::Outline(outline) => Cow::Owned(outline.flatten()),
            StageOutput::Audio(artifact) | StageOutput::Video(artifact) => {
                Cow::Borrowed(artifact.as_str())
            }
        }
    }
}

/// Output on success, error description on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePayload {
    Output(StageOutput),
    Error { kind: ErrorKind, message: String },
}

/// One stage attempt. Never modified once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    stage: Stage,
    status: StageStatus,
    payload: StagePayload,
    started_at: DateTime<Utc>,
    recorded_at: DateTime<Utc>,
}

impl StageRecord {
    /// Record a successful attempt; the stage is taken from the output kind
    pub fn success(output: StageOutput, started_at: DateTime<Utc>) -> Self {
        Self {
            stage: output.stage(),
            status: StageStatus::Success,
            payload: StagePayload::Output(output),
            started_at,
            recorded_at: Utc::now(),
        }
    }

    /// Record a failed attempt
    pub fn failure(stage: Stage, failure: &StageFailure, started_at: DateTime<Utc>) -> Self {
        Self {
            stage,
            status: StageStatus::Failure,
            payload: StagePayload::Error {
                kind: failure.kind(),
                message: failure.to_string(),
            },
            started_at,
            recorded_at: Utc::now(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn status(&self) -> StageStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }

    pub fn payload(&self) -> &StagePayload {
        &self.payload
    }

    pub fn output(&self) -> Option<&StageOutput> {
        match &self.payload {
            StagePayload::Output(output) => Some(output),
            StagePayload::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            StagePayload::Error { message, .. } => Some(message),
            StagePayload::Output(_) => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.payload {
            StagePayload::Error { kind, .. } => Some(*kind),
            StagePayload::Output(_) => None,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the attempt finished and was recorded
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn duration(&self) -> chrono::Duration {
        self.recorded_at.signed_duration_since(self.started_at)
    }
}

/// Ordered, append-only list of stage attempts for a single run
///
/// Insertion order is pipeline order: a record is only accepted for the
/// stage right after the last recorded one, and nothing is accepted after a
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLedger {
    records: Vec<StageRecord>,
}

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, enforcing pipeline order
    pub fn append(&mut self, record: StageRecord) -> Result<(), LedgerError> {
        let expected = match self.records.last() {
            None => Stage::Ideation,
            Some(last) if !last.is_success() => {
                return Err(LedgerError::AfterFailure {
                    stage: record.stage,
                    failed: last.stage,
                });
            }
            Some(last) => match last.stage.next() {
                Some(next) => next,
                None => return Err(LedgerError::Full { stage: record.stage }),
            },
        };

        if record.stage != expected {
            return Err(LedgerError::OutOfOrder {
                stage: record.stage,
                expected,
            });
        }

        self.records.push(record);
        Ok(())
    }

    /// All records in insertion (= pipeline) order
    pub fn all(&self) -> &[StageRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&StageRecord> {
        self.records.last()
    }

    pub fn get(&self, stage: Stage) -> Option<&StageRecord> {
        self.records.iter().find(|r| r.stage == stage)
    }

    /// Stage names in recorded order
    pub fn stages(&self) -> Vec<Stage> {
        self.records.iter().map(|r| r.stage).collect()
    }

    /// The stage whose failure ended the run, if any
    pub fn failed_stage(&self) -> Option<Stage> {
        self.records
            .last()
            .filter(|r| !r.is_success())
            .map(|r| r.stage)
    }

    /// Whether every stage has a successful record
    pub fn is_complete(&self) -> bool {
        self.records.len() == Stage::ALL.len() && self.records.iter().all(StageRecord::is_success)
    }

    pub fn into_records(self) -> Vec<StageRecord> {
        self.records
    }
}
