//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use huddle::config::Config;
use huddle::normalizer::Normalizer;
use huddle::pipeline::MeetingPipeline;
use huddle::provider::{GenerationOptions, TextGenerator};
use huddle::session::SessionCache;
use huddle::{AssistantError, Result};

pub const TRANSCRIPT: &str = "David: ship by Friday. Sarah: I'll test Monday.";

pub const UNDERSTANDING_REPLY: &str = r#"```json
{
  "participants": ["David", "Sarah"],
  "keyPoints": ["Release ships Friday", "Testing happens Monday"],
  "decisions": ["Ship by Friday"],
  "unresolvedIssues": [],
  "risks": ["Testing after the ship date"],
  "topics": ["Release", "Testing"],
  "meetingSummary": "David commits to shipping by Friday and Sarah will test on Monday."
}
```"#;

pub const ACTIONS_REPLY: &str = r#"{
  "actionItems": [
    {"id": 1, "task": "Ship the release", "owner": "David", "deadline": "Friday", "priority": "high", "status": "pending", "flagged": false},
    {"id": 2, "task": "Test the release", "owner": "Sarah", "deadline": "Monday", "priority": "medium", "status": "pending", "flagged": false},
    {"id": 3, "task": "Write release notes", "owner": "", "deadline": "", "priority": "low"}
  ],
  "summary": {"totalTasks": 99, "assignedTasks": 0, "unassignedTasks": 0, "flaggedItems": 0}
}"#;

pub const FOLLOW_UPS_REPLY: &str = r#"{
  "followUpActions": [
    {"id": 1, "action": "Confirm test window", "type": "meeting", "urgency": "high", "suggestedDate": "Thursday", "involvedParties": ["David", "Sarah"], "reason": "Testing is scheduled after shipping"}
  ],
  "escalations": [
    {"issue": "Release notes have no owner", "escalateTo": "Engineering manager", "reason": "Unassigned task"}
  ],
  "nextMeetingSuggestion": {"recommended": true, "suggestedTimeframe": "within 1 week", "agenda": ["Release retro"], "requiredAttendees": ["David", "Sarah"]}
}"#;

pub const QA_REPLY: &str = r#"{
  "answer": "Sarah is testing on Monday.",
  "confidence": "high",
  "relevantContext": ["Sarah: I'll test Monday."],
  "relatedTopics": ["Testing"]
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Understanding,
    Actions,
    FollowUps,
    Qa,
}

impl Stage {
    fn of_prompt(prompt: &str) -> Stage {
        if prompt.starts_with("You are a Meeting Understanding Agent") {
            Stage::Understanding
        } else if prompt.starts_with("You are an Action & Ownership Agent") {
            Stage::Actions
        } else if prompt.starts_with("You are a Follow-Up Orchestration Agent") {
            Stage::FollowUps
        } else {
            Stage::Qa
        }
    }
}

/// Generator that answers each stage with a canned reply and records calls.
pub struct ScriptedGenerator {
    calls: AtomicUsize,
    prompts: Mutex<Vec<(Stage, String)>>,
    fail_on: Option<Stage>,
    understanding_reply: String,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            fail_on: None,
            understanding_reply: UNDERSTANDING_REPLY.to_string(),
        }
    }

    pub fn failing_on(stage: Stage) -> Self {
        Self {
            fail_on: Some(stage),
            ..Self::new()
        }
    }

    pub fn with_understanding_reply(reply: &str) -> Self {
        Self {
            understanding_reply: reply.to_string(),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(stage, _)| *stage)
            .collect()
    }

    pub fn prompt_for(&self, stage: Stage) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, prompt)| prompt.clone())
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stage = Stage::of_prompt(prompt);
        self.prompts
            .lock()
            .unwrap()
            .push((stage, prompt.to_string()));

        if self.fail_on == Some(stage) {
            return Err(AssistantError::Generation(
                "watsonx.ai returned status 500 Internal Server Error".to_string(),
            ));
        }

        Ok(match stage {
            Stage::Understanding => self.understanding_reply.clone(),
            Stage::Actions => ACTIONS_REPLY.to_string(),
            Stage::FollowUps => FOLLOW_UPS_REPLY.to_string(),
            Stage::Qa => QA_REPLY.to_string(),
        })
    }
}

pub fn pipeline_with(generator: Arc<ScriptedGenerator>) -> MeetingPipeline {
    let config = Config::default();
    MeetingPipeline::new(
        generator,
        Normalizer::create(config.normalizer.tolerant_extraction),
        SessionCache::from_config(&config.session),
    )
}
