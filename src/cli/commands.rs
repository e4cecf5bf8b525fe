//! CLI command definitions

use crate::core::PipelineRequest;
use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Run the pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Topic to make a video about
    #[arg(short, long, conflicts_with = "request")]
    pub topic: Option<String>,

    /// Request file (YAML or JSON); flags below override its fields
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    #[arg(long)]
    pub tone: Option<String>,

    #[arg(long)]
    pub audience: Option<String>,

    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub platform: Option<String>,

    #[arg(long)]
    pub style: Option<String>,

    /// Target idea length in words
    #[arg(long)]
    pub max_words: Option<u32>,

    /// Language code (e.g. en, he)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use template agents instead of a language model
    #[arg(long)]
    pub offline: bool,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    /// Build the request from `--request` or `--topic`, then apply overrides
    pub fn to_request(&self) -> Result<PipelineRequest> {
        let mut request = match (&self.request, &self.topic) {
            (Some(path), _) => PipelineRequest::from_file(path)
                .with_context(|| format!("Failed to load request {}", path.display()))?,
            (None, Some(topic)) => PipelineRequest::new(topic.clone()),
            (None, None) => bail!("Either --topic or --request is required"),
        };

        if let Some(tone) = &self.tone {
            request = request.with_tone(tone.clone());
        }
        if let Some(audience) = &self.audience {
            request = request.with_audience(audience.clone());
        }
        if let Some(goal) = &self.goal {
            request = request.with_goal(goal.clone());
        }
        if let Some(platform) = &self.platform {
            request = request.with_platform(platform.clone());
        }
        if let Some(style) = &self.style {
            request = request.with_style(style.clone());
        }
        if let Some(max_words) = self.max_words {
            request = request.with_max_words(max_words);
        }
        if let Some(language) = &self.language {
            request = request.with_language(language.clone());
        }

        Ok(request)
    }
}

/// Validate a request and/or configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Request file (YAML or JSON)
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Show one run with its stage records
    #[arg(long)]
    pub run_id: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
