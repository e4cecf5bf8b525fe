//! Media collaborators: speech synthesis and video composition
//!
//! The orchestrator only sees [`MediaBackend`]. Artifacts it returns are
//! owned by the backend; the orchestrator never creates, renames or
//! deletes them.

pub mod command;

use crate::core::{ArtifactRef, CompositionError, SynthesisError};
use async_trait::async_trait;

pub use command::CommandMediaBackend;

/// Speech and video capabilities the pipeline relies on
///
/// Calls may be slow and may fail. Implementations are shared across
/// concurrent runs and must be reentrant.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Narrate `text`, returning a reference to the audio artifact
    async fn synthesize_speech(&self, text: &str) -> Result<ArtifactRef, SynthesisError>;

    /// Build a video from narration audio, using `context_text` for visuals
    async fn compose_video(
        &self,
        audio: &ArtifactRef,
        context_text: &str,
    ) -> Result<ArtifactRef, CompositionError>;
}
