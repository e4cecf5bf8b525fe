//! Model client abstraction and configuration

use crate::agent::retry::RetryPolicy;
use crate::core::{config::ModelConfig, GenerationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for model calls
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ModelError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Api(_) | ModelError::Timeout(_))
    }
}

impl From<ModelError> for GenerationError {
    fn from(err: ModelError) -> Self {
        GenerationError::Model(err.to_string())
    }
}

/// Response from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The response content
    pub content: String,

    /// How many attempts it took to get this response
    pub attempts: u32,
}

impl ModelResponse {
    pub fn new(content: String) -> Self {
        Self {
            content,
            attempts: 1,
        }
    }
}

/// Single-turn text generation
///
/// Implementations must be reentrant: one client is shared by every agent
/// and every concurrent run.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for `prompt`, with an optional system prompt
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
    ) -> Result<ModelResponse, ModelError>;

    /// Human-readable model identifier for logs
    fn model_name(&self) -> &str;
}

/// Configuration for the command-line model client
#[derive(Debug, Clone)]
pub struct ModelClientConfig {
    /// Executable to spawn
    pub command: String,

    /// Arguments before the model name
    pub args: Vec<String>,

    /// Model name
    pub model: String,

    /// Timeout for a single call in seconds
    pub timeout_secs: u64,

    /// Retry behaviour for failed calls
    pub retry: RetryPolicy,
}

impl Default for ModelClientConfig {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for ModelClientConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            retry: RetryPolicy::new(config.max_retries)
                .with_base_delay_ms(config.base_delay_ms)
                .with_max_delay_ms(config.max_delay_ms),
        }
    }
}

impl ModelClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
