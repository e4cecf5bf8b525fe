//! Content agents for the generation stages
//!
//! Every generation stage (idea, outline, script) is served by a
//! [`StageAgent`]. Model-backed agents talk to a [`ModelClient`];
//! template agents are deterministic and need no model at all.

pub mod client;
pub mod command_client;
pub mod ideation;
pub mod outline;
pub mod prompt;
pub mod retry;
pub mod script;

use crate::core::{GenerationError, Outline, OutlineRequest, PipelineRequest, ScriptRequest};
use async_trait::async_trait;
use std::sync::Arc;

pub use client::{ModelClient, ModelClientConfig, ModelError, ModelResponse};
pub use command_client::CommandModelClient;
pub use ideation::{ModelIdeationAgent, TemplateIdeationAgent};
pub use outline::{basic_outline, ModelOutlineAgent, TemplateOutlineAgent};
pub use prompt::{PromptSet, PromptTemplate};
pub use retry::RetryPolicy;
pub use script::{ModelScriptAgent, TemplateScriptAgent};

/// A generation stage: typed input in, typed output out
///
/// Implementations are shared across concurrent runs, so they must not
/// keep per-run mutable state.
#[async_trait]
pub trait StageAgent<I, O>: Send + Sync
where
    I: Send + Sync,
{
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn run(&self, input: &I) -> Result<O, GenerationError>;
}

/// Turns a request into a one-line idea
pub type IdeationAgent = Arc<dyn StageAgent<PipelineRequest, String>>;

/// Turns a request plus idea into a structured outline
pub type OutlineAgent = Arc<dyn StageAgent<OutlineRequest, Outline>>;

/// Turns a flattened outline into narration text
pub type ScriptAgent = Arc<dyn StageAgent<ScriptRequest, String>>;
