//! The set of stage collaborators a run is wired with

use crate::agent::{
    CommandModelClient, IdeationAgent, ModelClient, ModelClientConfig, ModelIdeationAgent,
    ModelOutlineAgent, ModelScriptAgent, OutlineAgent, PromptSet, ScriptAgent,
    TemplateIdeationAgent, TemplateOutlineAgent, TemplateScriptAgent,
};
use crate::core::config::NovacastConfig;
use crate::media::{CommandMediaBackend, MediaBackend};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Agents and media backend used by an orchestrator
///
/// Cloning is cheap and shares the underlying instances, which is how
/// concurrent runs reuse one set of reentrant collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub ideation: IdeationAgent,
    pub outline: OutlineAgent,
    pub script: ScriptAgent,
    pub media: Arc<dyn MediaBackend>,
}

impl Collaborators {
    pub fn new(
        ideation: IdeationAgent,
        outline: OutlineAgent,
        script: ScriptAgent,
        media: Arc<dyn MediaBackend>,
    ) -> Self {
        Self {
            ideation,
            outline,
            script,
            media,
        }
    }

    /// Rule-based agents that never call a model
    pub fn offline(media: Arc<dyn MediaBackend>) -> Self {
        Self::new(
            Arc::new(TemplateIdeationAgent),
            Arc::new(TemplateOutlineAgent),
            Arc::new(TemplateScriptAgent),
            media,
        )
    }

    /// Model-backed agents sharing one client
    pub fn with_model(
        client: Arc<dyn ModelClient>,
        prompts: PromptSet,
        media: Arc<dyn MediaBackend>,
    ) -> Self {
        Self::new(
            Arc::new(ModelIdeationAgent::new(client.clone(), prompts.ideation)),
            Arc::new(ModelOutlineAgent::new(client.clone(), prompts.outline)),
            Arc::new(ModelScriptAgent::new(client, prompts.script)),
            media,
        )
    }

    /// Wire collaborators from a configuration file
    pub fn from_config(config: &NovacastConfig, offline: bool) -> Result<Self> {
        let media: Arc<dyn MediaBackend> = Arc::new(CommandMediaBackend::new(&config.media));

        if offline {
            info!("Using offline template agents");
            return Ok(Self::offline(media));
        }

        let prompts = PromptSet::load(config.prompts.as_deref())
            .context("Failed to load prompt templates")?;
        let client = CommandModelClient::new(ModelClientConfig::from(&config.model));
        info!("Using model {} via {}", client.model_name(), client.command());

        Ok(Self::with_model(Arc::new(client), prompts, media))
    }
}
