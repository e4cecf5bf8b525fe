//! Outline agents - the second stage
//!
//! The model-backed agent asks for JSON. When the reply can't be parsed or
//! fails validation it falls back to [`basic_outline`], so callers only
//! ever see a valid outline or a model-call failure.

use crate::agent::{client::ModelClient, prompt::PromptTemplate, StageAgent};
use crate::core::{GenerationError, Outline, OutlineRequest, OutlineSection};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Generates an outline with a language model
pub struct ModelOutlineAgent {
    client: Arc<dyn ModelClient>,
    prompt: PromptTemplate,
}

impl ModelOutlineAgent {
    pub fn new(client: Arc<dyn ModelClient>, prompt: PromptTemplate) -> Self {
        Self { client, prompt }
    }
}

#[async_trait]
impl StageAgent<OutlineRequest, Outline> for ModelOutlineAgent {
    fn name(&self) -> &str {
        "model-outline"
    }

    async fn run(&self, input: &OutlineRequest) -> Result<Outline, GenerationError> {
        let prompt = self.prompt.render(&input.to_variables());
        debug!("Outline prompt: {}", prompt);

        let response = self.client.generate(self.prompt.system(), &prompt).await?;
        debug!("Raw outline response: {}", response.content);

        match parse_outline(&response.content) {
            Ok(outline) => {
                info!("Parsed outline with {} sections", outline.len());
                Ok(outline)
            }
            Err(reason) => {
                warn!("Failed to parse model outline, using basic outline: {}", reason);
                Ok(basic_outline(&input.topic, &input.language))
            }
        }
    }
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("fence regex is valid")
    })
}

/// Parse and validate a model reply as an outline
///
/// Accepts bare JSON, JSON inside a Markdown code fence, or JSON surrounded
/// by chatter (the outermost `{...}` is used).
pub fn parse_outline(raw: &str) -> Result<Outline, GenerationError> {
    let raw = raw.trim();
    let body = match fence_regex().captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw,
    };

    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(GenerationError::InvalidOutput(
                "reply contains no JSON object".to_string(),
            ))
        }
    };

    let outline: Outline = serde_json::from_str(json)
        .map_err(|e| GenerationError::InvalidOutput(format!("outline JSON: {}", e)))?;
    outline.validate()?;
    Ok(outline)
}

fn localized<'a>(language: &str, en: &'a str, he: &'a str) -> &'a str {
    match language {
        "he" => he,
        _ => en,
    }
}

/// Deterministic three-part outline (introduction, main points, conclusion)
pub fn basic_outline(topic: &str, language: &str) -> Outline {
    let l = |en, he| localized(language, en, he).to_string();

    let title = match language {
        "he" => format!("סקיצה: {}", topic),
        _ => format!("Outline: {}", topic),
    };

    let sections = vec![
        OutlineSection {
            heading: l("Introduction", "פתיחה"),
            bullets: vec![
                l("Why this matters", "למה זה חשוב"),
                l("What we will cover", "מה נכסה"),
            ],
        },
        OutlineSection {
            heading: l("Main Points", "עיקר"),
            bullets: vec![
                l("Key concept 1", "עיקרון 1"),
                l("Key concept 2", "עיקרון 2"),
                l("Key concept 3", "עיקרון 3"),
            ],
        },
        OutlineSection {
            heading: l("Conclusion", "סיכום"),
            bullets: vec![l("Wrap-up & next steps", "סגירה והצעדים הבאים")],
        },
    ];

    Outline::new(sections).with_title(title).with_cta(l(
        "Subscribe for more and share your thoughts.",
        "עקבו לעוד ושתפו מחשבות.",
    ))
}

/// Always returns [`basic_outline`]
#[derive(Debug, Clone, Default)]
pub struct TemplateOutlineAgent;

#[async_trait]
impl StageAgent<OutlineRequest, Outline> for TemplateOutlineAgent {
    fn name(&self) -> &str {
        "template-outline"
    }

    async fn run(&self, input: &OutlineRequest) -> Result<Outline, GenerationError> {
        Ok(basic_outline(&input.topic, &input.language))
    }
}
