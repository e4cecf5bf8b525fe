//! Terminal success value of a pipeline run

use crate::core::{error::PipelineError, outline::Outline, request::PipelineRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reference to a media artifact (file path or URI) owned by a media backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArtifactRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<PathBuf> for ArtifactRef {
    fn from(value: PathBuf) -> Self {
        Self(value.to_string_lossy().into_owned())
    }
}

/// Everything a successful run produced
///
/// Only the orchestrator builds one, after all five stages succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    request: PipelineRequest,
    idea: String,
    outline: Outline,
    script: String,
    audio_path: ArtifactRef,
    video_path: ArtifactRef,
}

impl PipelineResult {
    pub(crate) fn assemble(
        request: PipelineRequest,
        idea: String,
        outline: Outline,
        script: String,
        audio_path: ArtifactRef,
        video_path: ArtifactRef,
    ) -> Self {
        Self {
            request,
            idea,
            outline,
            script,
            audio_path,
            video_path,
        }
    }

    pub fn request(&self) -> &PipelineRequest {
        &self.request
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn audio_path(&self) -> &ArtifactRef {
        &self.audio_path
    }

    pub fn video_path(&self) -> &ArtifactRef {
        &self.video_path
    }

    pub fn script_stats(&self) -> ScriptStats {
        ScriptStats::analyze(&self.script)
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Classify the value returned by a run
    pub fn from_outcome(outcome: &Result<PipelineResult, PipelineError>) -> Self {
        match outcome {
            Ok(_) => RunStatus::Completed,
            Err(PipelineError::Cancelled { .. }) => RunStatus::Cancelled,
            Err(_) => RunStatus::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            "cancelled" => Ok(RunStatus::Cancelled),
            other => Err(format!("unknown run status: {}", other)),
        }
    }
}

/// Narration speed used for duration estimates
pub const WORDS_PER_MINUTE: f64 = 150.0;

/// Basic measurements of a script
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStats {
    pub word_count: usize,
    /// Minutes, rounded to two decimals
    pub estimated_duration_min: f64,
    /// Number of paragraph breaks
    pub section_count: usize,
}

impl ScriptStats {
    pub fn analyze(script: &str) -> Self {
        let word_count = script.split_whitespace().count();
        let minutes = word_count as f64 / WORDS_PER_MINUTE;
        Self {
            word_count,
            estimated_duration_min: (minutes * 100.0).round() / 100.0,
            section_count: script.matches("\n\n").count(),
        }
    }
}
