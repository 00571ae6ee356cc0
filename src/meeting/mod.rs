//! Meeting analysis data model.
//!
//! Every result type here is the canonical shape produced by the
//! normalizer; API handlers and prompts consume only these types.

pub mod status;
pub mod types;

pub use status::{PipelinePhase, PipelineRun, StageKind};
pub use types::{
    ActionItem, ActionItemBatch, ActionSummary, Escalation, FollowUpAction, FollowUpPlan,
    FollowUpType, Level, NextMeetingSuggestion, QaExchange, StructuredMeeting, NO_DEADLINE,
    NO_SUMMARY, STATUS_PENDING, UNASSIGNED, UNPARSED_SUMMARY,
};
