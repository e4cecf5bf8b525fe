//! Ideation agents - the first stage

use crate::agent::{client::ModelClient, prompt::PromptTemplate, StageAgent};
use crate::core::{GenerationError, PipelineRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Generates an idea with a language model
pub struct ModelIdeationAgent {
    client: Arc<dyn ModelClient>,
    prompt: PromptTemplate,
}

impl ModelIdeationAgent {
    pub fn new(client: Arc<dyn ModelClient>, prompt: PromptTemplate) -> Self {
        Self { client, prompt }
    }
}

#[async_trait]
impl StageAgent<PipelineRequest, String> for ModelIdeationAgent {
    fn name(&self) -> &str {
        "model-ideation"
    }

    async fn run(&self, input: &PipelineRequest) -> Result<String, GenerationError> {
        let prompt = self.prompt.render(&input.to_variables());
        debug!("Ideation prompt: {}", prompt);

        let response = self.client.generate(self.prompt.system(), &prompt).await?;
        let idea = clean_idea(&response.content);
        debug!("Received idea: {}", idea);

        if idea.is_empty() {
            return Err(GenerationError::InvalidOutput(
                "model returned an empty idea".to_string(),
            ));
        }
        Ok(idea)
    }
}

/// Strip whitespace and the quotes models like to wrap ideas in
pub fn clean_idea(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
        .to_string()
}

/// Deterministic idea built from the request fields
#[derive(Debug, Clone, Default)]
pub struct TemplateIdeationAgent;

#[async_trait]
impl StageAgent<PipelineRequest, String> for TemplateIdeationAgent {
    fn name(&self) -> &str {
        "template-ideation"
    }

    async fn run(&self, input: &PipelineRequest) -> Result<String, GenerationError> {
        let mut idea = format!("A {} take on {}", input.tone, input.topic.trim());
        if let Some(audience) = &input.audience {
            idea.push_str(&format!(" for {}", audience));
        }
        idea.push_str(&format!(", made for {}", input.platform));
        Ok(idea)
    }
}
