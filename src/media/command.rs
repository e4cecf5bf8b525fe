//! Media backend that runs external speech and video tools

use crate::core::{
    config::{CommandTemplate, MediaConfig},
    ArtifactRef, CompositionError, SynthesisError,
};
use crate::media::MediaBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::process::Command;
use tracing::{debug, info, warn};

const AUDIO_PREFIX: &str = "audio_";
const VIDEO_PREFIX: &str = "final_video_";

/// Why an external command didn't produce its artifact
#[derive(Debug)]
enum CommandFailure {
    Spawn(io::Error),
    Exit { code: i32, stderr: String },
}

/// Runs a text-to-speech command and a video command (ffmpeg by default)
///
/// Artifacts are numbered `audio_<n>` and `final_video_<n>` inside the
/// output directory, continuing from the highest index already present.
#[derive(Debug)]
pub struct CommandMediaBackend {
    output_dir: PathBuf,
    speech: CommandTemplate,
    video: CommandTemplate,
    audio_extension: String,
    video_extension: String,
    /// Last index handed out per prefix
    counters: Mutex<HashMap<&'static str, u64>>,
}

impl CommandMediaBackend {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            speech: config.speech.clone(),
            video: config.video.clone(),
            audio_extension: config.audio_extension.clone(),
            video_extension: config.video_extension.clone(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Reserve the next numbered path for `prefix`
    fn next_output_path(&self, prefix: &'static str, extension: &str) -> io::Result<PathBuf> {
        let mut counters = self.counters.lock().unwrap_or_else(|p| p.into_inner());
        let last = match counters.get(prefix) {
            Some(last) => *last,
            None => latest_index(&self.output_dir, prefix, extension)?,
        };
        let next = last + 1;
        counters.insert(prefix, next);
        Ok(self
            .output_dir
            .join(format!("{}{}.{}", prefix, next, extension)))
    }

    async fn run(
        &self,
        template: &CommandTemplate,
        variables: &HashMap<&str, String>,
    ) -> Result<(), CommandFailure> {
        let args = template.render_args(variables);
        debug!("Running {} with {} args", template.program, args.len());

        let output = Command::new(&template.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(CommandFailure::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", template.program, code, stderr);
            return Err(CommandFailure::Exit { code, stderr });
        }
        Ok(())
    }
}

/// Highest `<prefix><n>.<extension>` index in `dir`, 0 if none (or no dir)
fn latest_index(dir: &Path, prefix: &str, extension: &str) -> io::Result<u64> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let suffix = format!(".{}", extension);
    let mut latest = 0;
    for entry in entries {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        let index = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(&suffix))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(index) = index {
            latest = latest.max(index);
        }
    }
    Ok(latest)
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[async_trait]
impl MediaBackend for CommandMediaBackend {
    async fn synthesize_speech(&self, text: &str) -> Result<ArtifactRef, SynthesisError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| SynthesisError::Unavailable(format!("output directory: {}", e)))?;
        let output = self
            .next_output_path(AUDIO_PREFIX, &self.audio_extension)
            .map_err(|e| SynthesisError::Unavailable(format!("output directory: {}", e)))?;

        let mut vars = HashMap::new();
        vars.insert("text", text.to_string());
        vars.insert("output", output.to_string_lossy().into_owned());

        self.run(&self.speech, &vars).await.map_err(|failure| match failure {
            CommandFailure::Spawn(e) if e.kind() == io::ErrorKind::NotFound => {
                SynthesisError::Unsupported(format!("{} is not installed", self.speech.program))
            }
            CommandFailure::Spawn(e) => SynthesisError::Unavailable(e.to_string()),
            CommandFailure::Exit { code, stderr } => {
                SynthesisError::Failed(format!("exit code {}: {}", code, stderr))
            }
        })?;

        if !file_exists(&output).await {
            return Err(SynthesisError::MissingArtifact(output.display().to_string()));
        }

        info!("Audio written to {}", output.display());
        Ok(ArtifactRef::from(output))
    }

    async fn compose_video(
        &self,
        audio: &ArtifactRef,
        context_text: &str,
    ) -> Result<ArtifactRef, CompositionError> {
        if !file_exists(audio.as_path()).await {
            return Err(CompositionError::MissingAudio(audio.to_string()));
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| CompositionError::Failed(format!("output directory: {}", e)))?;
        let output = self
            .next_output_path(VIDEO_PREFIX, &self.video_extension)
            .map_err(|e| CompositionError::Failed(format!("output directory: {}", e)))?;

        let mut vars = HashMap::new();
        vars.insert("audio", audio.to_string());
        vars.insert("output", output.to_string_lossy().into_owned());
        vars.insert("text", context_text.to_string());

        self.run(&self.video, &vars).await.map_err(|failure| match failure {
            CommandFailure::Spawn(e) => {
                CompositionError::Encoder(format!("{}: {}", self.video.program, e))
            }
            CommandFailure::Exit { code, stderr } => {
                CompositionError::Encoder(format!("exit code {}: {}", code, stderr))
            }
        })?;

        if !file_exists(&output).await {
            return Err(CompositionError::MissingArtifact(output.display().to_string()));
        }

        info!("Video written to {}", output.display());
        Ok(ArtifactRef::from(output))
    }
}
