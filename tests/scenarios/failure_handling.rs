//! Test: Failure Handling - the first failing stage ends the run

use crate::helpers::*;
use novacast::core::{
    CompositionError, ErrorKind, GenerationError, Outline, PipelineError, PipelineRequest, Stage,
    StageFailure, StageOutput, SynthesisError,
};

/// Outline failure: two records, error tagged OUTLINE, nothing later runs
#[tokio::test]
async fn test_outline_failure_stops_run() {
    let harness = Harness::succeeding().with_outline(StubAgent::failing(
        "broken-outline",
        GenerationError::Model("connection refused".to_string()),
    ));
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Outline));
    assert_stages(orchestrator.task_history(), &[Stage::Ideation, Stage::Outline]);
    assert_failed_at(orchestrator.task_history(), Stage::Outline);

    assert_eq!(harness.script.calls(), 0);
    assert_eq!(harness.media.speech_calls(), 0);
    assert_eq!(harness.media.video_calls(), 0);
}

/// Script "model timeout": SCRIPT-tagged error, three records
#[tokio::test]
async fn test_script_model_timeout() {
    let harness = Harness::succeeding().with_script(StubAgent::failing(
        "slow-script",
        GenerationError::Model("model timeout".to_string()),
    ));
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Script));
    assert!(err.to_string().contains("model timeout"));
    assert!(matches!(
        err.failure(),
        Some(StageFailure::Generation(GenerationError::Model(_)))
    ));

    let history = orchestrator.task_history();
    assert_eq!(history.len(), 3);
    assert_failed_at(history, Stage::Script);
    assert!(history[2].error().unwrap().contains("model timeout"));
}

/// Speech failure: video is never attempted
#[tokio::test]
async fn test_speech_failure_skips_video() {
    let harness = Harness::succeeding().with_media(
        StubMedia::new(AUDIO, VIDEO)
            .failing_speech(SynthesisError::Unavailable("tts daemon down".to_string())),
    );
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Speech));
    assert_failed_at(orchestrator.task_history(), Stage::Speech);
    assert!(orchestrator.ledger().get(Stage::Video).is_none());
    assert_eq!(harness.media.video_calls(), 0);
    assert_eq!(
        orchestrator.task_history()[3].error_kind(),
        Some(ErrorKind::Synthesis)
    );
}

/// Video failure: audio record stays successful, no result
#[tokio::test]
async fn test_video_failure_keeps_audio_record() {
    let harness = Harness::succeeding().with_media(
        StubMedia::new(AUDIO, VIDEO)
            .failing_video(CompositionError::Encoder("ffmpeg exited with 1".to_string())),
    );
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Video));
    let history = orchestrator.task_history();
    assert_eq!(history.len(), 5);
    assert_failed_at(history, Stage::Video);
    assert_eq!(
        history[3].output(),
        Some(&StageOutput::Audio(AUDIO.into()))
    );
    assert_eq!(history[4].error_kind(), Some(ErrorKind::Composition));
}

/// An outline with no sections is rejected at the boundary
#[tokio::test]
async fn test_empty_outline_is_a_generation_error() {
    let harness = Harness::succeeding()
        .with_outline(StubAgent::succeeding("empty-outline", Outline::new(vec![])));
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Outline));
    assert!(matches!(
        err.failure(),
        Some(StageFailure::Generation(GenerationError::InvalidOutput(_)))
    ));
    assert_eq!(harness.script.calls(), 0);
}

/// A blank script is rejected before speech runs
#[tokio::test]
async fn test_blank_script_is_rejected() {
    let harness =
        Harness::succeeding().with_script(StubAgent::succeeding("blank-script", " \n".to_string()));
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Script));
    assert_eq!(harness.media.speech_calls(), 0);
}

/// Empty artifact references count as failures of their stage
#[tokio::test]
async fn test_empty_video_reference_fails_video() {
    let harness = Harness::succeeding().with_media(StubMedia::new(AUDIO, ""));
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(
        err.failure(),
        Some(&StageFailure::Composition(CompositionError::EmptyArtifact))
    );
}

/// Empty topic: rejected before any collaborator is called
#[tokio::test]
async fn test_empty_topic_is_invalid() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();

    let err = orchestrator
        .run_pipeline(&PipelineRequest::new("   "))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::InvalidRequest(_)));
    assert_eq!(err.stage(), None);
    assert!(orchestrator.task_history().is_empty());
    assert_eq!(harness.total_calls(), 0);
}

/// Failed stages are not retried by the orchestrator
#[tokio::test]
async fn test_failed_stage_is_not_retried() {
    let harness = Harness::succeeding().with_ideation(StubAgent::failing(
        "flaky",
        GenerationError::Model("503".to_string()),
    ));
    let mut orchestrator = harness.orchestrator();

    let _ = orchestrator.run_pipeline(&education_request()).await;

    assert_eq!(harness.ideation.calls(), 1);
    assert_eq!(harness.total_calls(), 1);
    assert_failed_at(orchestrator.task_history(), Stage::Ideation);
}
