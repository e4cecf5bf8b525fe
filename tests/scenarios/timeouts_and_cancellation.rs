//! Test: Timeouts and Cancellation

use crate::helpers::*;
use novacast::core::{ErrorKind, PipelineError, Stage, StageStatus};
use std::time::Duration;

/// A stage over its time limit is recorded as a timeout failure
#[tokio::test]
async fn test_speech_timeout_is_recorded() {
    let harness = Harness::succeeding()
        .with_media(StubMedia::new(AUDIO, VIDEO).with_speech_delay(Duration::from_secs(5)));
    let mut orchestrator = harness.orchestrator_with_timeout(Duration::from_millis(50));

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Speech));
    assert!(err.failure().unwrap().is_timeout());

    let history = orchestrator.task_history();
    assert_failed_at(history, Stage::Speech);
    assert_eq!(history[3].error_kind(), Some(ErrorKind::Timeout));
    assert_eq!(harness.media.video_calls(), 0);
}

/// Stages that finish within the limit are unaffected
#[tokio::test]
async fn test_fast_stages_within_timeout() {
    let harness = Harness::succeeding()
        .with_ideation(StubAgent::succeeding("quick", IDEA.to_string()).with_delay(Duration::from_millis(5)));
    let mut orchestrator = harness.orchestrator_with_timeout(Duration::from_secs(2));

    orchestrator.run_pipeline(&education_request()).await.unwrap();
    assert_all_success(orchestrator.task_history());
}

/// Cancelling before the run starts: no stage is attempted
#[tokio::test]
async fn test_cancel_before_start() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    orchestrator.cancellation_handle().cancel();

    let err = orchestrator
        .run_pipeline(&education_request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PipelineError::Cancelled {
            next_stage: Stage::Ideation
        }
    );
    assert_eq!(err.stage(), None);
    assert!(orchestrator.task_history().is_empty());
    assert_eq!(harness.total_calls(), 0);
}

/// Cancelling mid-stage lets that stage finish, then stops
#[tokio::test]
async fn test_cancel_during_outline() {
    let harness = Harness::succeeding().with_outline(
        StubAgent::succeeding("slow-outline", intro_outline()).with_delay(Duration::from_millis(200)),
    );
    let mut orchestrator = harness.orchestrator();
    let handle = orchestrator.cancellation_handle();

    let request = education_request();
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    };
    let (outcome, _) = tokio::join!(orchestrator.run_pipeline(&request), canceller);

    assert_eq!(
        outcome.unwrap_err(),
        PipelineError::Cancelled {
            next_stage: Stage::Script
        }
    );
    let history = orchestrator.task_history();
    assert_stages(history, &[Stage::Ideation, Stage::Outline]);
    assert!(history.iter().all(|r| r.status() == StageStatus::Success));
    assert_eq!(harness.script.calls(), 0);
}

/// A reset handle lets the orchestrator run again
#[tokio::test]
async fn test_reset_after_cancel() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    let handle = orchestrator.cancellation_handle();

    handle.cancel();
    assert!(orchestrator.run_pipeline(&education_request()).await.is_err());

    handle.reset();
    assert!(orchestrator.run_pipeline(&education_request()).await.is_ok());
    assert_all_success(orchestrator.task_history());
}
