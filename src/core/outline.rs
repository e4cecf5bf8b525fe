//! Structured outline produced by the outline stage

use crate::core::error::GenerationError;
use serde::{Deserialize, Serialize};

/// One outline section: a heading and its talking points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    pub bullets: Vec<String>,
}

impl OutlineSection {
    pub fn new<H, B>(heading: H, bullets: Vec<B>) -> Self
    where
        H: Into<String>,
        B: Into<String>,
    {
        Self {
            heading: heading.into(),
            bullets: bullets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered outline sections, with optional title and call to action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub title: Option<String>,

    pub sections: Vec<OutlineSection>,

    #[serde(default)]
    pub cta: Option<String>,
}

impl Outline {
    pub fn new(sections: Vec<OutlineSection>) -> Self {
        Self {
            title: None,
            sections,
            cta: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_cta(mut self, cta: impl Into<String>) -> Self {
        self.cta = Some(cta.into());
        self
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Check the outline is usable as script input
    ///
    /// An outline needs at least one section, and every section needs a
    /// heading and at least one non-blank bullet.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.sections.is_empty() {
            return Err(GenerationError::InvalidOutput(
                "outline has no sections".to_string(),
            ));
        }
        for (index, section) in self.sections.iter().enumerate() {
            if section.heading.trim().is_empty() {
                return Err(GenerationError::InvalidOutput(format!(
                    "outline section {} has an empty heading",
                    index + 1
                )));
            }
            if section.bullets.iter().all(|b| b.trim().is_empty()) {
                return Err(GenerationError::InvalidOutput(format!(
                    "outline section '{}' has no bullets",
                    section.heading
                )));
            }
        }
        Ok(())
    }

    /// Concatenate headings and bullets into one text block
    ///
    /// Sections keep the order the agent returned them in.
    pub fn flatten(&self) -> String {
        self.sections
            .iter()
            .map(|section| {
                let mut block = section.heading.clone();
                for bullet in &section.bullets {
                    block.push_str("\n- ");
                    block.push_str(bullet);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
