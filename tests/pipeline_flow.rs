//! End-to-end pipeline runs with a scripted generator.

mod common;

use std::sync::Arc;

use common::{pipeline_with, ScriptedGenerator, Stage, TRANSCRIPT};
use huddle::meeting::{FollowUpType, Level, StageKind, StructuredMeeting, NO_DEADLINE, UNASSIGNED};
use huddle::pipeline::{MeetingSource, QaContext};
use huddle::AssistantError;

#[tokio::test]
async fn test_process_runs_every_stage_in_order() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    let outcome = pipeline.process(TRANSCRIPT, None).await.unwrap();

    assert_eq!(
        generator.stages(),
        vec![Stage::Understanding, Stage::Actions, Stage::FollowUps]
    );
    assert!(outcome.session_id.starts_with("session_"));
    assert!(outcome.cached);

    let summary = &outcome.data.summary;
    assert!(summary.participants.contains(&"David".to_string()));
    assert!(summary.participants.contains(&"Sarah".to_string()));
    assert!(!summary.parse_error);

    let items = &outcome.data.action_items.action_items;
    assert!(items.iter().any(|item| item.deadline.contains("Friday")));
    assert!(items.iter().any(|item| item.deadline.contains("Monday")));
}

#[tokio::test]
async fn test_process_metadata_and_counters_are_computed_locally() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator);

    let outcome = pipeline.process(TRANSCRIPT, Some("standup-1")).await.unwrap();

    assert_eq!(outcome.session_id, "standup-1");
    assert_eq!(outcome.metadata.participant_count, 2);
    assert_eq!(outcome.metadata.action_item_count, 3);
    assert_eq!(outcome.metadata.follow_up_count, 1);
    assert!(outcome.metadata.has_escalations);
    assert!(outcome.processing_time().ends_with("ms"));

    // The model claimed 99 tasks; the batch counts what it actually holds.
    let batch = &outcome.data.action_items;
    assert_eq!(batch.summary.total_tasks, 3);
    assert_eq!(batch.summary.assigned_tasks, 2);
    assert_eq!(batch.summary.unassigned_tasks, 1);
    assert_eq!(batch.summary.flagged_items, 1);

    for item in &batch.action_items {
        assert_eq!(item.flagged, item.owner == UNASSIGNED);
    }
    let notes = &batch.action_items[2];
    assert_eq!(notes.id, 3);
    assert_eq!(notes.owner, UNASSIGNED);
    assert_eq!(notes.deadline, NO_DEADLINE);
    assert_eq!(notes.priority, Level::Low);

    let follow_up = &outcome.data.follow_ups.follow_up_actions[0];
    assert_eq!(follow_up.kind, FollowUpType::Meeting);
    assert_eq!(follow_up.urgency, Level::High);
}

#[tokio::test]
async fn test_action_prompt_receives_understanding_output() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    pipeline.process(TRANSCRIPT, None).await.unwrap();

    let actions_prompt = generator.prompt_for(Stage::Actions).unwrap();
    assert!(actions_prompt.contains("David commits to shipping by Friday"));

    let follow_up_prompt = generator.prompt_for(Stage::FollowUps).unwrap();
    assert!(follow_up_prompt.contains("Test the release"));
}

#[tokio::test]
async fn test_process_caches_understanding_for_questions() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    let outcome = pipeline.process(TRANSCRIPT, None).await.unwrap();
    let cached = pipeline.sessions().get(&outcome.session_id).await.unwrap();
    assert_eq!(cached, outcome.data.summary);

    let answer = pipeline
        .answer(
            "When is testing?",
            QaContext {
                session_id: Some(outcome.session_id.clone()),
                transcript: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(answer.session_id.as_deref(), Some(outcome.session_id.as_str()));
    assert_eq!(answer.exchange.answer, "Sarah is testing on Monday.");
    assert_eq!(answer.exchange.confidence, Level::High);
    assert_eq!(answer.exchange.question, "When is testing?");
    // Three stages for process, one for the question; no re-analysis.
    assert_eq!(generator.calls(), 4);
}

#[tokio::test]
async fn test_empty_transcript_is_rejected_before_any_call() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    for transcript in ["", "   \n\t"] {
        let err = pipeline.process(transcript, None).await.unwrap_err();
        assert!(matches!(err, AssistantError::Validation(_)));
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_unknown_session_without_transcript_is_not_found() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    let err = pipeline
        .answer(
            "What was decided?",
            QaContext {
                session_id: Some("missing-session".to_string()),
                transcript: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::NotFound(_)));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_unknown_session_with_transcript_analyses_and_caches() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    let answer = pipeline
        .answer(
            "Who is testing?",
            QaContext {
                session_id: Some("qa-session".to_string()),
                transcript: Some(TRANSCRIPT.to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(generator.stages(), vec![Stage::Understanding, Stage::Qa]);
    assert_eq!(answer.session_id.as_deref(), Some("qa-session"));
    assert!(pipeline.sessions().get("qa-session").await.is_ok());
}

#[tokio::test]
async fn test_stage_failure_aborts_remaining_stages() {
    let generator = Arc::new(ScriptedGenerator::failing_on(Stage::Actions));
    let pipeline = pipeline_with(generator.clone());

    let err = pipeline
        .process(TRANSCRIPT, Some("failing"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(StageKind::ActionItems));
    assert!(matches!(err.root(), AssistantError::Generation(_)));
    assert_eq!(generator.stages(), vec![Stage::Understanding, Stage::Actions]);
    // All-or-nothing: nothing is cached for a failed run.
    assert!(pipeline.sessions().get("failing").await.is_err());
}

#[tokio::test]
async fn test_understanding_failure_names_its_stage() {
    let generator = Arc::new(ScriptedGenerator::failing_on(Stage::Understanding));
    let pipeline = pipeline_with(generator.clone());

    let err = pipeline.summarize(TRANSCRIPT, None).await.unwrap_err();

    assert_eq!(err.stage(), Some(StageKind::Understanding));
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_malformed_understanding_degrades_without_failing() {
    let generator = Arc::new(ScriptedGenerator::with_understanding_reply(
        "Sorry, I cannot produce JSON today.",
    ));
    let pipeline = pipeline_with(generator.clone());

    let outcome = pipeline.process(TRANSCRIPT, Some("degraded")).await.unwrap();

    assert!(outcome.data.summary.parse_error);
    assert_eq!(outcome.data.summary, StructuredMeeting::unparsed());
    assert!(!outcome.cached);
    assert!(pipeline.sessions().get("degraded").await.is_err());
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn test_extract_actions_from_structured_meeting_skips_understanding() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    let meeting = StructuredMeeting {
        participants: vec!["David".to_string(), "Sarah".to_string()],
        meeting_summary: "Release sync".to_string(),
        ..StructuredMeeting::default()
    };
    let batch = pipeline
        .extract_actions(MeetingSource::Structured(meeting))
        .await
        .unwrap();

    assert_eq!(batch.len(), 3);
    assert_eq!(generator.stages(), vec![Stage::Actions]);
}

#[tokio::test]
async fn test_follow_ups_from_transcript_runs_prior_stages() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator.clone());

    let plan = pipeline
        .plan_follow_ups(MeetingSource::Transcript(TRANSCRIPT.to_string()), None)
        .await
        .unwrap();

    assert!(plan.has_escalations());
    assert!(plan.next_meeting_suggestion.recommended);
    assert_eq!(
        generator.stages(),
        vec![Stage::Understanding, Stage::Actions, Stage::FollowUps]
    );
}

#[tokio::test]
async fn test_cache_put_get_delete() {
    let generator = Arc::new(ScriptedGenerator::new());
    let pipeline = pipeline_with(generator);

    let outcome = pipeline.summarize(TRANSCRIPT, Some("s-1")).await.unwrap();
    assert_eq!(
        pipeline.sessions().get("s-1").await.unwrap(),
        outcome.meeting
    );

    assert!(pipeline.forget("s-1").await.unwrap());
    assert!(matches!(
        pipeline.sessions().get("s-1").await,
        Err(AssistantError::NotFound(_))
    ));
    assert!(!pipeline.forget("s-1").await.unwrap());
}
