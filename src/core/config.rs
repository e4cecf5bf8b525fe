//! Runtime configuration from YAML

use anyhow::Result;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NovacastConfig {
    /// Model client used by the content agents
    #[serde(default)]
    pub model: ModelConfig,

    /// Per-stage timeouts
    #[serde(default)]
    pub stages: StageTimeoutConfig,

    /// Speech and video commands
    #[serde(default)]
    pub media: MediaConfig,

    /// Directory holding prompt overrides (ideation.yaml, outline.yaml, script.yaml)
    #[serde(default)]
    pub prompts: Option<PathBuf>,
}

/// How to reach the language model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Executable to run
    #[serde(default = "default_model_command")]
    pub command: String,

    /// Arguments placed before the model name
    #[serde(default = "default_model_args")]
    pub args: Vec<String>,

    /// Model name, appended after `args`
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Timeout for a single model call, in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first failed call
    #[serde(default = "default_model_retries")]
    pub max_retries: u32,

    /// First backoff delay; later delays grow exponentially
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Upper bound for a single backoff delay
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_model_command() -> String {
    "ollama".to_string()
}

fn default_model_args() -> Vec<String> {
    vec!["run".to_string()]
}

fn default_model_name() -> String {
    "llama3.2:latest".to_string()
}

fn default_model_timeout() -> u64 {
    120
}

fn default_model_retries() -> u32 {
    2
}

fn default_base_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    8_000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            command: default_model_command(),
            args: default_model_args(),
            model: default_model_name(),
            timeout_secs: default_model_timeout(),
            max_retries: default_model_retries(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

/// Stage timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTimeoutConfig {
    #[serde(default = "default_generation_timeout")]
    pub ideation: u64,
    #[serde(default = "default_generation_timeout")]
    pub outline: u64,
    #[serde(default = "default_generation_timeout")]
    pub script: u64,
    #[serde(default = "default_speech_timeout")]
    pub speech: u64,
    #[serde(default = "default_video_timeout")]
    pub video: u64,
}

fn default_generation_timeout() -> u64 {
    180
}

fn default_speech_timeout() -> u64 {
    600
}

fn default_video_timeout() -> u64 {
    900
}

impl Default for StageTimeoutConfig {
    fn default() -> Self {
        Self {
            ideation: default_generation_timeout(),
            outline: default_generation_timeout(),
            script: default_generation_timeout(),
            speech: default_speech_timeout(),
            video: default_video_timeout(),
        }
    }
}

impl StageTimeoutConfig {
    fn as_map(&self) -> [(&'static str, u64); 5] {
        [
            ("ideation", self.ideation),
            ("outline", self.outline),
            ("script", self.script),
            ("speech", self.speech),
            ("video", self.video),
        ]
    }
}

/// An external command with `{{ placeholder }}` arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new<S: Into<String>>(program: impl Into<String>, args: Vec<S>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Substitute placeholders in every argument
    pub fn render_args(&self, variables: &HashMap<&str, String>) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| render_placeholders(arg, variables))
            .collect()
    }

    pub fn references(&self, placeholder: &str) -> bool {
        self.args.iter().any(|arg| {
            placeholder_regex()
                .captures_iter(arg)
                .any(|caps| &caps[1] == placeholder)
        })
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder regex is valid")
    })
}

/// Replace every `{{ name }}` in `template` in a single pass
///
/// Substituted values are never scanned again, and names missing from
/// `variables` are left as written.
pub fn render_placeholders<K>(template: &str, variables: &HashMap<K, String>) -> String
where
    K: Borrow<str> + Eq + Hash,
{
    placeholder_regex()
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Speech synthesis and video composition commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Where artifacts are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Placeholders: `{{ text }}`, `{{ output }}`
    #[serde(default = "default_speech_command")]
    pub speech: CommandTemplate,

    /// Placeholders: `{{ audio }}`, `{{ output }}`, `{{ text }}`
    #[serde(default = "default_video_command")]
    pub video: CommandTemplate,

    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,

    #[serde(default = "default_video_extension")]
    pub video_extension: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_speech_command() -> CommandTemplate {
    CommandTemplate::new(
        "tts",
        vec!["--text", "{{ text }}", "--out_path", "{{ output }}"],
    )
}

fn default_video_command() -> CommandTemplate {
    CommandTemplate::new(
        "ffmpeg",
        vec![
            "-y",
            "-f",
            "lavfi",
            "-i",
            "color=c=black:s=1080x1920",
            "-i",
            "{{ audio }}",
            "-shortest",
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-pix_fmt",
            "yuv420p",
            "{{ output }}",
        ],
    )
}

fn default_audio_extension() -> String {
    "wav".to_string()
}

fn default_video_extension() -> String {
    "mp4".to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            speech: default_speech_command(),
            video: default_video_command(),
            audio_extension: default_audio_extension(),
            video_extension: default_video_extension(),
        }
    }
}

impl NovacastConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: NovacastConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.command.trim().is_empty() {
            anyhow::bail!("model.command must not be empty");
        }
        if self.model.model.trim().is_empty() {
            anyhow::bail!("model.model must not be empty");
        }
        if self.model.timeout_secs == 0 {
            anyhow::bail!("model.timeout_secs must be greater than zero");
        }
        if self.model.base_delay_ms > self.model.max_delay_ms {
            anyhow::bail!(
                "model.base_delay_ms ({}) exceeds model.max_delay_ms ({})",
                self.model.base_delay_ms,
                self.model.max_delay_ms
            );
        }

        for (stage, secs) in self.stages.as_map() {
            if secs == 0 {
                anyhow::bail!("stages.{} timeout must be greater than zero", stage);
            }
        }

        for (name, command) in [("speech", &self.media.speech), ("video", &self.media.video)] {
            if command.program.trim().is_empty() {
                anyhow::bail!("media.{}.program must not be empty", name);
            }
            if !command.references("output") {
                anyhow::bail!("media.{} command never references {{{{ output }}}}", name);
            }
        }
        if !self.media.video.references("audio") {
            anyhow::bail!("media.video command never references {{{{ audio }}}}");
        }

        if let Some(dir) = &self.prompts {
            if !dir.is_dir() {
                anyhow::bail!("prompts directory doesn't exist: {}", dir.display());
            }
        }

        Ok(())
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_secs)
    }
}
