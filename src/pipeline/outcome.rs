use serde::Serialize;

use crate::meeting::{ActionItemBatch, FollowUpPlan, QaExchange, StructuredMeeting};

/// Where a stage gets its meeting context from.
#[derive(Debug, Clone)]
pub enum MeetingSource {
    /// Raw text; the understanding stage runs first.
    Transcript(String),
    /// A meeting produced by an earlier call.
    Structured(StructuredMeeting),
    /// A cached meeting.
    Session(String),
}

/// Context for a question: a cached session, an inline transcript, or both.
#[derive(Debug, Clone, Default)]
pub struct QaContext {
    pub session_id: Option<String>,
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub summary: StructuredMeeting,
    pub action_items: ActionItemBatch,
    pub follow_ups: FollowUpPlan,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetadata {
    pub participant_count: usize,
    pub action_item_count: usize,
    pub follow_up_count: usize,
    pub has_escalations: bool,
    pub processing_time_ms: u64,
}

impl ProcessMetadata {
    pub fn from_data(data: &AnalysisData, processing_time_ms: u64) -> Self {
        Self {
            participant_count: data.summary.participants.len(),
            action_item_count: data.action_items.len(),
            follow_up_count: data.follow_ups.follow_up_actions.len(),
            has_escalations: data.follow_ups.has_escalations(),
            processing_time_ms,
        }
    }
}

/// Aggregate result of a full run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    pub session_id: String,
    pub data: AnalysisData,
    pub metadata: ProcessMetadata,
    /// Whether the understanding result was stored for later questions.
    pub cached: bool,
}

impl ProcessOutcome {
    pub fn processing_time(&self) -> String {
        format!("{}ms", self.metadata.processing_time_ms)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutcome {
    pub session_id: String,
    pub meeting: StructuredMeeting,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// Session the answer was resolved against, if any.
    pub session_id: Option<String>,
    pub exchange: QaExchange,
}
