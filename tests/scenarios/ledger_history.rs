//! Test: Ledger History - what the orchestrator remembers about a run

use crate::helpers::*;
use chrono::Utc;
use novacast::core::{
    GenerationError, LedgerError, PipelineRequest, RunStatus, Stage, StageOutput, StageRecord,
};
use novacast::execution::ExecutionEvent;
use novacast::persistence::{InMemoryPersistence, PersistenceBackend, RunSummary};
use std::sync::{Arc, Mutex};

/// Reading the history twice gives the same answer
#[tokio::test]
async fn test_task_history_is_stable() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    orchestrator.run_pipeline(&education_request()).await.unwrap();

    let first = orchestrator.task_history().to_vec();
    let second = orchestrator.task_history().to_vec();
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
}

/// A new run replaces the previous run's history
#[tokio::test]
async fn test_second_run_clears_history() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();

    orchestrator.run_pipeline(&education_request()).await.unwrap();
    let first_run = orchestrator.run_id().unwrap();

    orchestrator
        .run_pipeline(&PipelineRequest::new("Deep sea creatures"))
        .await
        .unwrap();

    assert_ne!(orchestrator.run_id(), Some(first_run));
    assert_eq!(orchestrator.task_history().len(), 5);
    assert_eq!(harness.ideation.calls(), 2);
}

/// An invalid request still clears the previous history
#[tokio::test]
async fn test_invalid_request_clears_history() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    orchestrator.run_pipeline(&education_request()).await.unwrap();

    assert!(orchestrator
        .run_pipeline(&PipelineRequest::new(""))
        .await
        .is_err());
    assert!(orchestrator.task_history().is_empty());
    assert_eq!(orchestrator.run_id(), None);
}

/// A ledger that ended in failure rejects further records
#[tokio::test]
async fn test_failed_ledger_is_closed() {
    let harness = Harness::succeeding().with_outline(StubAgent::failing(
        "broken-outline",
        GenerationError::Model("bad gateway".to_string()),
    ));
    let mut orchestrator = harness.orchestrator();
    let _ = orchestrator.run_pipeline(&education_request()).await;

    let mut ledger = orchestrator.into_ledger();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.failed_stage(), Some(Stage::Outline));

    let late = StageRecord::success(StageOutput::Script(SCRIPT.to_string()), Utc::now());
    assert_eq!(
        ledger.append(late),
        Err(LedgerError::AfterFailure {
            stage: Stage::Script,
            failed: Stage::Outline,
        })
    );
    assert_eq!(ledger.len(), 2);
}

/// Records are stamped in the order the stages ran
#[tokio::test]
async fn test_record_timestamps_are_ordered() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    orchestrator.run_pipeline(&education_request()).await.unwrap();

    let history = orchestrator.task_history();
    for record in history {
        assert!(record.started_at() <= record.timestamp());
    }
    for pair in history.windows(2) {
        assert!(pair[0].timestamp() <= pair[1].started_at());
    }
}

/// A failed run can be snapshotted and stored
#[tokio::test]
async fn test_failed_run_summary_is_persisted() {
    let harness = Harness::succeeding().with_script(StubAgent::failing(
        "slow-script",
        GenerationError::Model("model timeout".to_string()),
    ));
    let mut orchestrator = harness.orchestrator();
    let request = education_request();
    let outcome = orchestrator.run_pipeline(&request).await;
    let run_id = orchestrator.run_id().unwrap();

    let summary = RunSummary::new(run_id, &request, &outcome, orchestrator.ledger());
    assert_eq!(summary.status, RunStatus::Failed);
    assert_eq!(summary.failed_stage, Some(Stage::Script));
    assert_eq!(summary.completed_stages(), 2);

    let store = InMemoryPersistence::new();
    store.save_run(&summary).await.unwrap();

    let loaded = store.load_run(run_id).await.unwrap().unwrap();
    assert_eq!(loaded, summary);
    assert!(loaded.error.unwrap().contains("model timeout"));
}

/// Events mirror the ledger of a failed run
#[tokio::test]
async fn test_events_report_failure() {
    let harness = Harness::succeeding().with_ideation(StubAgent::failing(
        "flaky",
        GenerationError::Model("503".to_string()),
    ));
    let mut orchestrator = harness.orchestrator();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    orchestrator.add_event_handler(move |event| sink.lock().unwrap().push(event));

    let _ = orchestrator.run_pipeline(&education_request()).await;
    let run_id = orchestrator.run_id().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.run_id() == run_id));
    assert!(matches!(
        &events[2],
        ExecutionEvent::StageFailed { stage: Stage::Ideation, error, .. } if error.contains("503")
    ));
    assert!(matches!(
        events[3],
        ExecutionEvent::PipelineFinished {
            status: RunStatus::Failed,
            ..
        }
    ));
}
