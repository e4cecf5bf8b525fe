//! Orchestrator - drives one content run through the five stages
//!
//! Stages run strictly in order. Each attempt is recorded in the task
//! ledger before the next stage starts, and the first failure ends the run
//! with an error tagged with the failing stage.

use crate::core::{
    config::StageTimeoutConfig, ArtifactRef, CompositionError, GenerationError, Outline,
    OutlineRequest, PipelineError, PipelineRequest, PipelineResult, RunStatus, ScriptRequest,
    Stage, StageFailure, StageOutput, StageRecord, SynthesisError, TaskLedger,
};
use crate::execution::{
    collaborators::Collaborators,
    events::{EventHandler, ExecutionEvent},
};
use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Upper bound on each stage's wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub ideation: Duration,
    pub outline: Duration,
    pub script: Duration,
    pub speech: Duration,
    pub video: Duration,
}

impl StageTimeouts {
    /// Same limit for every stage
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            ideation: timeout,
            outline: timeout,
            script: timeout,
            speech: timeout,
            video: timeout,
        }
    }

    pub fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Ideation => self.ideation,
            Stage::Outline => self.outline,
            Stage::Script => self.script,
            Stage::Speech => self.speech,
            Stage::Video => self.video,
        }
    }
}

impl From<&StageTimeoutConfig> for StageTimeouts {
    fn from(config: &StageTimeoutConfig) -> Self {
        Self {
            ideation: Duration::from_secs(config.ideation),
            outline: Duration::from_secs(config.outline),
            script: Duration::from_secs(config.script),
            speech: Duration::from_secs(config.speech),
            video: Duration::from_secs(config.video),
        }
    }
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self::from(&StageTimeoutConfig::default())
    }
}

/// Orchestrator settings
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub timeouts: StageTimeouts,
}

impl OrchestratorConfig {
    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// Stops an orchestrator from starting any further stage
///
/// A stage already handed to a collaborator is allowed to finish. The flag
/// stays set until [`CancellationHandle::reset`] is called.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle(Arc<AtomicBool>);

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs pipelines and keeps the ledger of the latest run
pub struct Orchestrator {
    collaborators: Collaborators,
    config: OrchestratorConfig,
    ledger: TaskLedger,
    event_handlers: Vec<EventHandler>,
    cancellation: CancellationHandle,
    run_id: Option<Uuid>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            config: OrchestratorConfig::default(),
            ledger: TaskLedger::new(),
            event_handlers: Vec::new(),
            cancellation: CancellationHandle::new(),
            run_id: None,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Handle that cancels runs on this orchestrator
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// A new orchestrator sharing collaborators, config and event handlers,
    /// with its own empty ledger and cancellation flag
    pub fn fork(&self) -> Self {
        Self {
            collaborators: self.collaborators.clone(),
            config: self.config.clone(),
            ledger: TaskLedger::new(),
            event_handlers: self.event_handlers.clone(),
            cancellation: CancellationHandle::new(),
            run_id: None,
        }
    }

    /// Stage records of the latest run, in pipeline order
    pub fn task_history(&self) -> &[StageRecord] {
        self.ledger.all()
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> TaskLedger {
        self.ledger
    }

    /// Identifier of the latest run that passed request validation
    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Run all five stages for `request`
    ///
    /// The ledger is cleared first, so after this returns it holds exactly
    /// the attempts of this run.
    pub async fn run_pipeline(
        &mut self,
        request: &PipelineRequest,
    ) -> Result<PipelineResult, PipelineError> {
        self.ledger.clear();
        self.run_id = None;

        if let Err(e) = request.validate() {
            warn!("Rejecting pipeline request: {}", e);
            return Err(e.into());
        }

        let run_id = Uuid::new_v4();
        self.run_id = Some(run_id);
        info!("Starting pipeline run {} for topic: {}", run_id, request.topic);
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id,
            topic: request.topic.clone(),
        });

        let outcome = self.execute(run_id, request).await;

        let status = RunStatus::from_outcome(&outcome);
        match &outcome {
            Ok(_) => info!("Pipeline run {} completed", run_id),
            Err(e) => error!("Pipeline run {} ended: {}", run_id, e),
        }
        self.emit_event(ExecutionEvent::PipelineFinished { run_id, status });

        outcome
    }

    async fn execute(
        &mut self,
        run_id: Uuid,
        request: &PipelineRequest,
    ) -> Result<PipelineResult, PipelineError> {
        // Local handle so stage futures don't borrow self
        let collaborators = self.collaborators.clone();

        let idea = self
            .run_stage(
                run_id,
                Stage::Ideation,
                collaborators.ideation.run(request),
                |idea: &String| require_text(idea, "idea"),
                |idea| StageOutput::Idea(idea.clone()),
            )
            .await?;

        let outline_request = OutlineRequest::from_request(request, &idea);
        let outline = self
            .run_stage(
                run_id,
                Stage::Outline,
                collaborators.outline.run(&outline_request),
                |outline: &Outline| outline.validate().map_err(StageFailure::from),
                |outline| StageOutput::Outline(outline.clone()),
            )
            .await?;

        let script_request = ScriptRequest::from_outline(request, &outline);
        let script = self
            .run_stage(
                run_id,
                Stage::Script,
                collaborators.script.run(&script_request),
                |script: &String| require_text(script, "script"),
                |script| StageOutput::Script(script.clone()),
            )
            .await?;

        let audio = self
            .run_stage(
                run_id,
                Stage::Speech,
                collaborators.media.synthesize_speech(&script),
                |audio: &ArtifactRef| {
                    if audio.is_empty() {
                        Err(SynthesisError::EmptyArtifact.into())
                    } else {
                        Ok(())
                    }
                },
                |audio| StageOutput::Audio(audio.clone()),
            )
            .await?;

        let video = self
            .run_stage(
                run_id,
                Stage::Video,
                collaborators.media.compose_video(&audio, &script),
                |video: &ArtifactRef| {
                    if video.is_empty() {
                        Err(CompositionError::EmptyArtifact.into())
                    } else {
                        Ok(())
                    }
                },
                |video| StageOutput::Video(video.clone()),
            )
            .await?;

        Ok(PipelineResult::assemble(
            request.clone(),
            idea,
            outline,
            script,
            audio,
            video,
        ))
    }

    /// Attempt one stage and record the outcome
    ///
    /// Refuses to start once cancelled. Otherwise exactly one record is
    /// appended, whether the call succeeds, fails, times out or returns
    /// output that doesn't pass `validate`.
    async fn run_stage<T, E, Fut, V, R>(
        &mut self,
        run_id: Uuid,
        stage: Stage,
        call: Fut,
        validate: V,
        to_output: R,
    ) -> Result<T, PipelineError>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<StageFailure>,
        V: FnOnce(&T) -> Result<(), StageFailure>,
        R: FnOnce(&T) -> StageOutput,
    {
        if self.cancellation.is_cancelled() {
            info!("Run {} cancelled before {} stage", run_id, stage);
            return Err(PipelineError::Cancelled { next_stage: stage });
        }

        let limit = self.config.timeouts.for_stage(stage);
        info!("Running {} stage", stage);
        self.emit_event(ExecutionEvent::StageStarted { run_id, stage });

        let started_at = Utc::now();
        let attempt = match tokio::time::timeout(limit, call).await {
            Err(_) => Err(StageFailure::Timeout { after: limit }),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok(value)) => validate(&value).map(|_| value),
        };

        match attempt {
            Ok(value) => {
                let output = to_output(&value);
                debug!("{} output: {}", stage, output.as_text());
                self.ledger
                    .append(StageRecord::success(output.clone(), started_at))?;
                info!("{} stage succeeded", stage);
                self.emit_event(ExecutionEvent::StageCompleted {
                    run_id,
                    stage,
                    output,
                });
                Ok(value)
            }
            Err(failure) => {
                warn!("{} stage failed: {}", stage, failure);
                self.ledger
                    .append(StageRecord::failure(stage, &failure, started_at))?;
                self.emit_event(ExecutionEvent::StageFailed {
                    run_id,
                    stage,
                    error: failure.to_string(),
                });
                Err(PipelineError::Stage {
                    stage,
                    source: failure,
                })
            }
        }
    }
}

fn require_text(text: &str, what: &str) -> Result<(), StageFailure> {
    if text.trim().is_empty() {
        return Err(GenerationError::InvalidOutput(format!("empty {}", what)).into());
    }
    Ok(())
}
