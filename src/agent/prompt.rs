//! Prompt templates for the content agents

use crate::core::config::render_placeholders;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A system prompt plus a user template with `{{ variable }}` placeholders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(default)]
    pub system: Option<String>,
    pub user_template: String,
}

impl PromptTemplate {
    pub fn new(system: Option<&str>, user_template: &str) -> Self {
        Self {
            system: system.map(str::to_string),
            user_template: user_template.to_string(),
        }
    }

    /// Load a template from a YAML file with `system` and `user_template` keys
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
        let template: PromptTemplate = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid prompt file {}", path.display()))?;
        if template.user_template.trim().is_empty() {
            anyhow::bail!("Prompt file {} has an empty user_template", path.display());
        }
        Ok(template)
    }

    /// Render the user template with variable substitution
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        render_placeholders(&self.user_template, variables)
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }
}

const IDEATION_SYSTEM: &str =
    "You are a creative director for short-form video. You answer with a single idea and nothing else.";

const IDEATION_TEMPLATE: &str = "\
Come up with one video idea about: {{ topic }}
Tone: {{ tone }}
Audience: {{ audience }}
Goal: {{ goal }}
Platform: {{ platform }}
Style: {{ style }}
Write it in language '{{ language }}' using at most {{ max_words }} words.
Reply with the idea only, no quotes, no preamble.";

const OUTLINE_SYSTEM: &str =
    "You write video outlines. You reply with strict JSON and no commentary.";

const OUTLINE_TEMPLATE: &str = "\
Topic: {{ topic }}
Idea: {{ idea }}
Tone: {{ tone }}
Audience: {{ audience }}
Goal: {{ goal }}
Platform: {{ platform }}
Style: {{ style }}
Language: {{ language }}

Write an outline with at most {{ max_sections }} sections as JSON of the form:
{\"title\": \"...\", \"sections\": [{\"heading\": \"...\", \"bullets\": [\"...\"]}], \"cta\": \"...\"}
Every section needs at least one bullet.";

const SCRIPT_SYSTEM: &str =
    "You are a scriptwriter for narrated videos. You write the spoken narration only.";

const SCRIPT_TEMPLATE: &str = "\
Turn this outline into a narration script for {{ platform }}.
Tone: {{ tone }}
Language: {{ language }}

Outline:
{{ outline }}

Write flowing narration, one paragraph per outline section, no headings or stage directions.";

/// Templates for all three content agents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub ideation: PromptTemplate,
    pub outline: PromptTemplate,
    pub script: PromptTemplate,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            ideation: PromptTemplate::new(Some(IDEATION_SYSTEM), IDEATION_TEMPLATE),
            outline: PromptTemplate::new(Some(OUTLINE_SYSTEM), OUTLINE_TEMPLATE),
            script: PromptTemplate::new(Some(SCRIPT_SYSTEM), SCRIPT_TEMPLATE),
        }
    }
}

impl PromptSet {
    /// Built-in templates, overridden by `ideation.yaml`, `outline.yaml`
    /// and `script.yaml` where they exist in `dir`
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut prompts = Self::default();
        let Some(dir) = dir else {
            return Ok(prompts);
        };

        for (name, slot) in [
            ("ideation", &mut prompts.ideation),
            ("outline", &mut prompts.outline),
            ("script", &mut prompts.script),
        ] {
            let path = dir.join(format!("{}.yaml", name));
            if path.exists() {
                *slot = PromptTemplate::from_file(&path)?;
            }
        }

        Ok(prompts)
    }
}
