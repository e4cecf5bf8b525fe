//! Script agents - the third stage

use crate::agent::{client::ModelClient, prompt::PromptTemplate, StageAgent};
use crate::core::{GenerationError, ScriptRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Writes narration with a language model
pub struct ModelScriptAgent {
    client: Arc<dyn ModelClient>,
    prompt: PromptTemplate,
}

impl ModelScriptAgent {
    pub fn new(client: Arc<dyn ModelClient>, prompt: PromptTemplate) -> Self {
        Self { client, prompt }
    }
}

#[async_trait]
impl StageAgent<ScriptRequest, String> for ModelScriptAgent {
    fn name(&self) -> &str {
        "model-script"
    }

    async fn run(&self, input: &ScriptRequest) -> Result<String, GenerationError> {
        let prompt = self.prompt.render(&input.to_variables());
        let response = self.client.generate(self.prompt.system(), &prompt).await?;
        let script = response.content.trim().to_string();
        debug!("Script has {} characters", script.len());

        if script.is_empty() {
            return Err(GenerationError::InvalidOutput(
                "model returned an empty script".to_string(),
            ));
        }
        Ok(script)
    }
}

/// Wraps the outline text without calling a model
#[derive(Debug, Clone, Default)]
pub struct TemplateScriptAgent;

#[async_trait]
impl StageAgent<ScriptRequest, String> for TemplateScriptAgent {
    fn name(&self) -> &str {
        "template-script"
    }

    async fn run(&self, input: &ScriptRequest) -> Result<String, GenerationError> {
        Ok(format!("Generated Script based on: {}", input.outline_text))
    }
}
