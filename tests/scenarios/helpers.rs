//! Stub collaborators and assertions shared by the scenario tests

use async_trait::async_trait;
use novacast::core::{
    ArtifactRef, CompositionError, GenerationError, Outline, OutlineRequest, OutlineSection,
    PipelineRequest, ScriptRequest, Stage, StageRecord, StageStatus, SynthesisError,
};
use novacast::execution::{Collaborators, Orchestrator, OrchestratorConfig, StageTimeouts};
use novacast::{MediaBackend, StageAgent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Agent that returns a canned outcome and remembers its inputs
pub struct StubAgent<I, O> {
    name: &'static str,
    outcome: Result<O, GenerationError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<I>>,
}

pub type StubIdeation = StubAgent<PipelineRequest, String>;
pub type StubOutline = StubAgent<OutlineRequest, Outline>;
pub type StubScript = StubAgent<ScriptRequest, String>;

impl<I, O> StubAgent<I, O> {
    pub fn succeeding(name: &'static str, output: O) -> Self {
        Self::with_outcome(name, Ok(output))
    }

    pub fn failing(name: &'static str, error: GenerationError) -> Self {
        Self::with_outcome(name, Err(error))
    }

    fn with_outcome(name: &'static str, outcome: Result<O, GenerationError>) -> Self {
        Self {
            name,
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<I: Clone, O> StubAgent<I, O> {
    pub fn inputs(&self) -> Vec<I> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl<I, O> StageAgent<I, O> for StubAgent<I, O>
where
    I: Clone + Send + Sync,
    O: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, input: &I) -> Result<O, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

/// Media backend with canned artifacts
pub struct StubMedia {
    audio: Result<ArtifactRef, SynthesisError>,
    video: Result<ArtifactRef, CompositionError>,
    speech_delay: Option<Duration>,
    speech_texts: Mutex<Vec<String>>,
    video_inputs: Mutex<Vec<(ArtifactRef, String)>>,
}

impl StubMedia {
    pub fn new(audio: &str, video: &str) -> Self {
        Self {
            audio: Ok(ArtifactRef::from(audio)),
            video: Ok(ArtifactRef::from(video)),
            speech_delay: None,
            speech_texts: Mutex::new(Vec::new()),
            video_inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_speech(mut self, error: SynthesisError) -> Self {
        self.audio = Err(error);
        self
    }

    pub fn failing_video(mut self, error: CompositionError) -> Self {
        self.video = Err(error);
        self
    }

    pub fn with_speech_delay(mut self, delay: Duration) -> Self {
        self.speech_delay = Some(delay);
        self
    }

    pub fn speech_calls(&self) -> usize {
        self.speech_texts.lock().unwrap().len()
    }

    pub fn video_calls(&self) -> usize {
        self.video_inputs.lock().unwrap().len()
    }

    pub fn speech_texts(&self) -> Vec<String> {
        self.speech_texts.lock().unwrap().clone()
    }

    pub fn video_inputs(&self) -> Vec<(ArtifactRef, String)> {
        self.video_inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBackend for StubMedia {
    async fn synthesize_speech(&self, text: &str) -> Result<ArtifactRef, SynthesisError> {
        self.speech_texts.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.speech_delay {
            tokio::time::sleep(delay).await;
        }
        self.audio.clone()
    }

    async fn compose_video(
        &self,
        audio: &ArtifactRef,
        context_text: &str,
    ) -> Result<ArtifactRef, CompositionError> {
        self.video_inputs
            .lock()
            .unwrap()
            .push((audio.clone(), context_text.to_string()));
        self.video.clone()
    }
}

pub const IDEA: &str = "AI personalizes learning";
pub const SCRIPT: &str = "AI tutors adapt to every student.\n\nTeachers get time back.";
pub const AUDIO: &str = "a.wav";
pub const VIDEO: &str = "v.mp4";

pub fn education_request() -> PipelineRequest {
    PipelineRequest::new("How AI is changing education").with_language("en")
}

pub fn intro_outline() -> Outline {
    Outline::new(vec![OutlineSection::new("Intro", vec!["Why it matters"])])
}

/// One stub per collaborator, each kept so tests can inspect it afterwards
pub struct Harness {
    pub ideation: Arc<StubIdeation>,
    pub outline: Arc<StubOutline>,
    pub script: Arc<StubScript>,
    pub media: Arc<StubMedia>,
}

impl Harness {
    /// Every collaborator succeeds with the education fixtures
    pub fn succeeding() -> Self {
        Self {
            ideation: Arc::new(StubAgent::succeeding("stub-ideation", IDEA.to_string())),
            outline: Arc::new(StubAgent::succeeding("stub-outline", intro_outline())),
            script: Arc::new(StubAgent::succeeding("stub-script", SCRIPT.to_string())),
            media: Arc::new(StubMedia::new(AUDIO, VIDEO)),
        }
    }

    pub fn with_ideation(mut self, ideation: StubIdeation) -> Self {
        self.ideation = Arc::new(ideation);
        self
    }

    pub fn with_outline(mut self, outline: StubOutline) -> Self {
        self.outline = Arc::new(outline);
        self
    }

    pub fn with_script(mut self, script: StubScript) -> Self {
        self.script = Arc::new(script);
        self
    }

    pub fn with_media(mut self, media: StubMedia) -> Self {
        self.media = Arc::new(media);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.ideation.clone(),
            self.outline.clone(),
            self.script.clone(),
            self.media.clone(),
        )
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.collaborators())
    }

    /// Orchestrator whose every stage times out after `timeout`
    pub fn orchestrator_with_timeout(&self, timeout: Duration) -> Orchestrator {
        let config = OrchestratorConfig::default().with_timeouts(StageTimeouts::uniform(timeout));
        Orchestrator::new(self.collaborators()).with_config(config)
    }

    /// Total collaborator calls made
    pub fn total_calls(&self) -> usize {
        self.ideation.calls()
            + self.outline.calls()
            + self.script.calls()
            + self.media.speech_calls()
            + self.media.video_calls()
    }
}

/// Assert the recorded stages, in order
pub fn assert_stages(records: &[StageRecord], expected: &[Stage]) {
    let actual: Vec<Stage> = records.iter().map(StageRecord::stage).collect();
    assert_eq!(actual, expected, "recorded stages differ");
}

/// Assert every record before the last succeeded and the last failed
pub fn assert_failed_at(records: &[StageRecord], stage: Stage) {
    let (last, earlier) = records.split_last().expect("ledger is empty");
    assert_eq!(last.stage(), stage);
    assert_eq!(last.status(), StageStatus::Failure, "{} should have failed", stage);
    assert!(last.error().is_some());
    for record in earlier {
        assert_eq!(
            record.status(),
            StageStatus::Success,
            "{} should have succeeded",
            record.stage()
        );
    }
}

pub fn assert_all_success(records: &[StageRecord]) {
    assert_stages(records, &Stage::ALL);
    assert!(records.iter().all(StageRecord::is_success));
}
