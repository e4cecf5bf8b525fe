//! Model client that shells out to a local model CLI (e.g. `ollama run`)

use crate::agent::client::{ModelClient, ModelClientConfig, ModelError, ModelResponse};
use crate::agent::retry::RetryPolicy;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Client for executing a model CLI as a subprocess
#[derive(Debug, Clone)]
pub struct CommandModelClient {
    /// Executable to spawn
    command: String,

    /// Arguments before the model name
    args: Vec<String>,

    /// Model name
    model: String,

    /// Timeout for a single invocation in seconds
    timeout_secs: u64,

    retry: RetryPolicy,
}

impl CommandModelClient {
    pub fn new(config: ModelClientConfig) -> Self {
        Self {
            command: config.command,
            args: config.args,
            model: config.model,
            timeout_secs: config.timeout_secs,
            retry: config.retry,
        }
    }

    /// Get the executable path
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Full argument list for one call: configured args, model, prompt
    fn build_args(&self, system: Option<&str>, prompt: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.model.clone());
        args.push(format_prompt(system, prompt));
        args
    }

    /// Run the model CLI once
    ///
    /// # Errors
    /// Returns `ModelError` if:
    /// - The executable cannot be spawned
    /// - The process exits with a non-zero status
    /// - The output is not valid UTF-8
    /// - The command times out
    async fn execute_once(&self, args: &[String]) -> Result<String, ModelError> {
        let timeout_duration = Duration::from_secs(self.timeout_secs);

        let result = timeout(
            timeout_duration,
            Command::new(&self.command)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ModelError::Timeout(self.timeout_secs))?;

        let output = result.map_err(|e| {
            ModelError::Internal(format!("Failed to execute {}: {}", self.command, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", self.command, exit_code, stderr.trim());
            return Err(ModelError::Api(format!(
                "{} exited with code {}: {}",
                self.command,
                exit_code,
                stderr.trim()
            )));
        }

        let content = String::from_utf8(output.stdout).map_err(|e| {
            ModelError::Internal(format!("Failed to decode {} output: {}", self.command, e))
        })?;

        debug!("{} returned {} bytes of output", self.command, content.len());

        Ok(content)
    }
}

#[async_trait]
impl ModelClient for CommandModelClient {
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
    ) -> Result<ModelResponse, ModelError> {
        let args = self.build_args(system, prompt);
        debug!(
            "Spawning {} ({}) with prompt length: {}",
            self.command,
            self.model,
            prompt.len()
        );

        let label = format!("{} {}", self.command, self.model);
        let (content, attempts) = self
            .retry
            .run(&label, ModelError::is_retryable, || self.execute_once(&args))
            .await?;

        Ok(ModelResponse { content, attempts })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Fold a system prompt into a single prompt string for CLIs that only
/// take one
pub fn format_prompt(system: Option<&str>, user: &str) -> String {
    let user = user.trim();
    match system.map(str::trim).filter(|s| !s.is_empty()) {
        Some(system) => format!("[SYSTEM]\n{}\n\n[USER]\n{}", system, user),
        None => user.to_string(),
    }
}
