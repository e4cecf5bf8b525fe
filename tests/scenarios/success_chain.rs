//! Test: Success Chain - all five stages succeed

use crate::helpers::*;
use novacast::core::{ArtifactRef, Outline, OutlineSection, Stage, StageOutput};

/// The education run returns exactly what the stubs produced
#[tokio::test]
async fn test_education_run_returns_stub_outputs() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    let request = education_request();

    let result = orchestrator.run_pipeline(&request).await.unwrap();

    assert_eq!(result.request(), &request);
    assert_eq!(result.idea(), IDEA);
    assert_eq!(result.outline(), &intro_outline());
    assert_eq!(result.script(), SCRIPT);
    assert_eq!(result.audio_path().as_str(), AUDIO);
    assert_eq!(result.video_path().as_str(), VIDEO);

    assert_all_success(orchestrator.task_history());
}

/// Artifacts and script are non-empty on success
#[tokio::test]
async fn test_successful_result_is_complete() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();

    let result = orchestrator.run_pipeline(&education_request()).await.unwrap();

    assert!(!result.audio_path().is_empty());
    assert!(!result.video_path().is_empty());
    assert!(!result.script().trim().is_empty());
    assert!(orchestrator.ledger().is_complete());
}

/// Each record holds the output of its stage
#[tokio::test]
async fn test_records_carry_stage_outputs() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    orchestrator.run_pipeline(&education_request()).await.unwrap();

    let outputs: Vec<StageOutput> = orchestrator
        .task_history()
        .iter()
        .map(|r| r.output().cloned().unwrap())
        .collect();

    assert_eq!(
        outputs,
        vec![
            StageOutput::Idea(IDEA.to_string()),
            StageOutput::Outline(intro_outline()),
            StageOutput::Script(SCRIPT.to_string()),
            StageOutput::Audio(AUDIO.into()),
            StageOutput::Video(VIDEO.into()),
        ]
    );
}

/// Each stage is fed the previous stage's output
#[tokio::test]
async fn test_outputs_flow_into_next_stage() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    let request = education_request().with_audience("teachers");
    orchestrator.run_pipeline(&request).await.unwrap();

    assert_eq!(harness.ideation.inputs(), vec![request.clone()]);

    let outline_input = &harness.outline.inputs()[0];
    assert_eq!(outline_input.idea, IDEA);
    assert_eq!(outline_input.topic, request.topic);
    assert_eq!(outline_input.audience, "teachers");
    assert_eq!(outline_input.goal, "inform");

    let script_input = &harness.script.inputs()[0];
    assert_eq!(script_input.outline_text, "Intro\n- Why it matters");
    assert_eq!(script_input.language, "en");

    assert_eq!(harness.media.speech_texts(), vec![SCRIPT.to_string()]);
    assert_eq!(
        harness.media.video_inputs(),
        vec![(ArtifactRef::from(AUDIO), SCRIPT.to_string())]
    );
}

/// Outline order reaches the script agent unchanged
#[tokio::test]
async fn test_outline_order_is_preserved() {
    let outline = Outline::new(vec![
        OutlineSection::new("Zebra facts", vec!["Stripes", "Herds"]),
        OutlineSection::new("Aardvark facts", vec!["Ants"]),
    ]);
    let harness = Harness::succeeding().with_outline(StubAgent::succeeding("ordered", outline));
    let mut orchestrator = harness.orchestrator();
    orchestrator.run_pipeline(&education_request()).await.unwrap();

    assert_eq!(
        harness.script.inputs()[0].outline_text,
        "Zebra facts\n- Stripes\n- Herds\n\nAardvark facts\n- Ants"
    );
}

/// Every collaborator is called exactly once
#[tokio::test]
async fn test_each_collaborator_called_once() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    orchestrator.run_pipeline(&education_request()).await.unwrap();

    assert_eq!(harness.ideation.calls(), 1);
    assert_eq!(harness.outline.calls(), 1);
    assert_eq!(harness.script.calls(), 1);
    assert_eq!(harness.media.speech_calls(), 1);
    assert_eq!(harness.media.video_calls(), 1);
}

/// Script stats are computed from the final script
#[tokio::test]
async fn test_script_stats_on_result() {
    let harness = Harness::succeeding();
    let mut orchestrator = harness.orchestrator();
    let result = orchestrator.run_pipeline(&education_request()).await.unwrap();

    let stats = result.script_stats();
    assert_eq!(stats.word_count, 10);
    assert_eq!(stats.section_count, 1);
    assert_eq!(orchestrator.ledger().last().unwrap().stage(), Stage::Video);
}
