//! Test: Concurrent Runs - forks share collaborators, never ledgers

use crate::helpers::*;
use async_trait::async_trait;
use novacast::core::{GenerationError, PipelineRequest, Stage};
use novacast::execution::{Collaborators, Orchestrator};
use novacast::StageAgent;
use std::sync::Arc;
use std::time::Duration;

/// Idea echoes the topic; topics containing "fail" fail
struct TopicIdeation;

#[async_trait]
impl StageAgent<PipelineRequest, String> for TopicIdeation {
    fn name(&self) -> &str {
        "topic-ideation"
    }

    async fn run(&self, input: &PipelineRequest) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if input.topic.contains("fail") {
            return Err(GenerationError::Model(format!("no idea for {}", input.topic)));
        }
        Ok(format!("idea about {}", input.topic))
    }
}

fn topic_orchestrator(harness: &Harness) -> Orchestrator {
    Orchestrator::new(Collaborators::new(
        Arc::new(TopicIdeation),
        harness.outline.clone(),
        harness.script.clone(),
        harness.media.clone(),
    ))
}

/// Parallel forks each get their own complete ledger
#[tokio::test]
async fn test_parallel_forks_keep_separate_ledgers() {
    let harness = Harness::succeeding();
    let base = topic_orchestrator(&harness);

    let mut tasks = Vec::new();
    for i in 0..4 {
        let mut orchestrator = base.fork();
        tasks.push(tokio::spawn(async move {
            let request = PipelineRequest::new(format!("topic {}", i));
            let outcome = orchestrator.run_pipeline(&request).await;
            (request, outcome, orchestrator.into_ledger())
        }));
    }

    for task in tasks {
        let (request, outcome, ledger) = task.await.unwrap();
        let result = outcome.unwrap();
        assert_eq!(result.request(), &request);
        assert_eq!(result.idea(), format!("idea about {}", request.topic));
        assert_all_success(ledger.all());
    }

    assert!(base.task_history().is_empty());
    assert_eq!(harness.outline.calls(), 4);
    assert_eq!(harness.media.video_calls(), 4);
}

/// One failing run doesn't disturb a concurrent one
#[tokio::test]
async fn test_failure_is_isolated_to_its_run() {
    let harness = Harness::succeeding();
    let base = topic_orchestrator(&harness);
    let mut good = base.fork();
    let mut bad = base.fork();

    let good_request = PipelineRequest::new("oceans");
    let bad_request = PipelineRequest::new("fail fast");
    let (good_outcome, bad_outcome) = tokio::join!(
        good.run_pipeline(&good_request),
        bad.run_pipeline(&bad_request)
    );

    assert!(good_outcome.is_ok());
    assert_all_success(good.task_history());

    assert_eq!(bad_outcome.unwrap_err().stage(), Some(Stage::Ideation));
    assert_stages(bad.task_history(), &[Stage::Ideation]);
    assert_failed_at(bad.task_history(), Stage::Ideation);
}

/// Cancelling one fork leaves the others running
#[tokio::test]
async fn test_cancellation_is_per_fork() {
    let harness = Harness::succeeding();
    let base = harness.orchestrator();
    let mut cancelled = base.fork();
    let mut running = base.fork();
    cancelled.cancellation_handle().cancel();

    let request = education_request();
    assert!(cancelled.run_pipeline(&request).await.is_err());
    assert!(running.run_pipeline(&request).await.is_ok());
    assert!(cancelled.task_history().is_empty());
    assert_eq!(running.task_history().len(), 5);
}
