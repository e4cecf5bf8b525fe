//! Typed stage inputs
//!
//! [`PipelineRequest`] is what the caller hands to the orchestrator. The
//! outline and script stages get their own request types, built from the
//! pipeline request plus whatever the previous stage produced.

use crate::core::{error::InvalidRequestError, outline::Outline};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_TONE: &str = "neutral";
pub const DEFAULT_PLATFORM: &str = "generic";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_WORDS: u32 = 25;

pub const DEFAULT_OUTLINE_AUDIENCE: &str = "general";
pub const DEFAULT_OUTLINE_GOAL: &str = "inform";
pub const DEFAULT_OUTLINE_STYLE: &str = "concise";
pub const DEFAULT_MAX_SECTIONS: u32 = 5;

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_max_words() -> u32 {
    DEFAULT_MAX_WORDS
}

/// Input configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Main subject of the video
    pub topic: String,

    /// Desired tone, e.g. "funny" or "serious"
    #[serde(default = "default_tone")]
    pub tone: String,

    /// Who the content is for
    #[serde(default)]
    pub audience: Option<String>,

    /// What the video aims to achieve, e.g. "educate"
    #[serde(default)]
    pub goal: Option<String>,

    /// Where the video will be published
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Preferred structure, e.g. "listicle" or "story"
    #[serde(default)]
    pub style: Option<String>,

    /// Target length of the generated idea, in words
    #[serde(default = "default_max_words", alias = "max_length")]
    pub max_words: u32,

    /// Language code (en/he/es/...)
    #[serde(default = "default_language")]
    pub language: String,
}

impl PipelineRequest {
    /// Create a request for a topic with every other field at its default
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            tone: default_tone(),
            audience: None,
            goal: None,
            platform: default_platform(),
            style: None,
            max_words: DEFAULT_MAX_WORDS,
            language: default_language(),
        }
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_max_words(mut self, max_words: u32) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Load a request from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a request from YAML (JSON is accepted too, being a YAML subset)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let request: PipelineRequest = serde_yaml::from_str(yaml)?;
        request.validate()?;
        Ok(request)
    }

    /// Check the request can start a run
    pub fn validate(&self) -> Result<(), InvalidRequestError> {
        if self.topic.trim().is_empty() {
            return Err(InvalidRequestError::EmptyTopic);
        }
        if self.max_words == 0 {
            return Err(InvalidRequestError::ZeroMaxWords);
        }
        if self.language.trim().is_empty() {
            return Err(InvalidRequestError::EmptyLanguage);
        }
        Ok(())
    }

    /// Variables for prompt rendering
    pub fn to_variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), self.topic.clone());
        vars.insert("tone".to_string(), self.tone.clone());
        vars.insert("audience".to_string(), unset_or(&self.audience));
        vars.insert("goal".to_string(), unset_or(&self.goal));
        vars.insert("platform".to_string(), self.platform.clone());
        vars.insert("style".to_string(), unset_or(&self.style));
        vars.insert("max_words".to_string(), self.max_words.to_string());
        vars.insert("language".to_string(), self.language.clone());
        vars
    }
}

fn unset_or(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "unspecified".to_string())
}

/// Input for the outline stage: the pipeline request merged with the idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineRequest {
    pub topic: String,
    pub idea: String,
    pub tone: String,
    pub audience: String,
    pub goal: String,
    pub platform: String,
    pub style: String,
    pub max_sections: u32,
    pub language: String,
}

impl OutlineRequest {
    /// Merge the original request fields with the generated idea
    pub fn from_request(request: &PipelineRequest, idea: &str) -> Self {
        Self {
            topic: request.topic.clone(),
            idea: idea.to_string(),
            tone: request.tone.clone(),
            audience: request
                .audience
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTLINE_AUDIENCE.to_string()),
            goal: request
                .goal
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTLINE_GOAL.to_string()),
            platform: request.platform.clone(),
            style: request
                .style
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTLINE_STYLE.to_string()),
            max_sections: DEFAULT_MAX_SECTIONS,
            language: request.language.clone(),
        }
    }

    pub fn to_variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), self.topic.clone());
        vars.insert("idea".to_string(), self.idea.clone());
        vars.insert("tone".to_string(), self.tone.clone());
        vars.insert("audience".to_string(), self.audience.clone());
        vars.insert("goal".to_string(), self.goal.clone());
        vars.insert("platform".to_string(), self.platform.clone());
        vars.insert("style".to_string(), self.style.clone());
        vars.insert("max_sections".to_string(), self.max_sections.to_string());
        vars.insert("language".to_string(), self.language.clone());
        vars
    }
}

/// Input for the script stage: the flattened outline plus voice settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRequest {
    /// Outline headings and bullets, in outline order
    pub outline_text: String,
    pub tone: String,
    pub platform: String,
    pub language: String,
}

impl ScriptRequest {
    pub fn from_outline(request: &PipelineRequest, outline: &Outline) -> Self {
        Self {
            outline_text: outline.flatten(),
            tone: request.tone.clone(),
            platform: request.platform.clone(),
            language: request.language.clone(),
        }
    }

    pub fn to_variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("outline".to_string(), self.outline_text.clone());
        vars.insert("tone".to_string(), self.tone.clone());
        vars.insert("platform".to_string(), self.platform.clone());
        vars.insert("language".to_string(), self.language.clone());
        vars
    }
}
