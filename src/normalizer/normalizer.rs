use serde_json::Value;
use tracing::{debug, info, warn};

use super::fields::{flag, meaningful_text, objects, pick, text, text_list, Object};
use crate::meeting::{
    ActionItem, ActionItemBatch, Escalation, FollowUpAction, FollowUpPlan, FollowUpType, Level,
    NextMeetingSuggestion, QaExchange, StageKind, StructuredMeeting, NO_SUMMARY, UNASSIGNED,
};
use crate::normalizer::{
    strip_fences, BraceSpanExtractor, FenceStripper, ResponseExtractor,
};

const QA_UNPARSED: &str = "Unable to parse an answer from the model response";

/// Turns raw model output into the canonical result types.
///
/// Parse failures never escape: each schema has a default carrying
/// `parse_error = true`, and every missing field is filled with a
/// type-correct default.
pub enum Normalizer {
    Strict(FenceStripper),
    Tolerant(BraceSpanExtractor),
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::create(false)
    }
}

impl Normalizer {
    /// Strict mode only strips exact markdown fences; tolerant mode also
    /// recovers JSON surrounded by prose.
    pub fn create(tolerant: bool) -> Self {
        if tolerant {
            info!("Creating tolerant response normalizer");
            Normalizer::Tolerant(BraceSpanExtractor::new())
        } else {
            info!("Creating strict response normalizer");
            Normalizer::Strict(FenceStripper::new())
        }
    }

    fn extractor(&self) -> &dyn ResponseExtractor {
        match self {
            Normalizer::Strict(e) => e,
            Normalizer::Tolerant(e) => e,
        }
    }

    fn extract(&self, raw_output: &str, stage: StageKind) -> Option<Value> {
        let extractor = self.extractor();
        debug!(
            "Running {} on {} bytes of {} output",
            extractor.name(),
            raw_output.len(),
            stage
        );
        match extractor.extract(raw_output) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Error parsing {} response: {}", stage, e);
                None
            }
        }
    }

    fn extract_object(&self, raw_output: &str, stage: StageKind) -> Option<Object> {
        match self.extract(raw_output, stage)? {
            Value::Object(obj) => Some(obj),
            other => {
                warn!(
                    "Expected a JSON object from {} stage, got {}",
                    stage,
                    json_kind(&other)
                );
                None
            }
        }
    }

    pub fn understanding(&self, raw_output: &str) -> StructuredMeeting {
        let Some(obj) = self.extract_object(raw_output, StageKind::Understanding) else {
            return StructuredMeeting::unparsed();
        };

        StructuredMeeting {
            participants: text_list(pick(&obj, &["participants", "attendees"])),
            key_points: text_list(pick(&obj, &["keyPoints", "key_points"])),
            decisions: text_list(pick(&obj, &["decisions"])),
            unresolved_issues: text_list(pick(
                &obj,
                &["unresolvedIssues", "unresolved_issues", "openIssues"],
            )),
            risks: text_list(pick(&obj, &["risks", "concerns"])),
            topics: text_list(pick(&obj, &["topics"])),
            meeting_summary: text(pick(&obj, &["meetingSummary", "meeting_summary", "summary"]))
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            parse_error: false,
        }
    }

    pub fn action_items(&self, raw_output: &str) -> ActionItemBatch {
        match self.extract(raw_output, StageKind::ActionItems) {
            Some(value) => Self::action_items_from_value(&value),
            None => ActionItemBatch::unparsed(),
        }
    }

    /// Map already-parsed action items, either a bare list or an object
    /// wrapping one. Used for model output and for items sent by callers.
    pub fn action_items_from_value(value: &Value) -> ActionItemBatch {
        let items_value = match value {
            Value::Object(obj) => pick(obj, &["actionItems", "action_items", "actions", "tasks"]),
            Value::Array(_) => Some(value),
            other => {
                warn!("Expected action items object, got {}", json_kind(other));
                return ActionItemBatch::unparsed();
            }
        };

        let items = objects(items_value)
            .into_iter()
            .filter_map(action_item)
            .collect();

        ActionItemBatch::from_items(items)
    }

    pub fn follow_ups(&self, raw_output: &str) -> FollowUpPlan {
        let Some(obj) = self.extract_object(raw_output, StageKind::FollowUps) else {
            return FollowUpPlan::unparsed();
        };

        let follow_up_actions = objects(pick(
            &obj,
            &["followUpActions", "follow_up_actions", "followUps", "actions"],
        ))
        .into_iter()
        .filter_map(follow_up_action)
        .enumerate()
        .map(|(index, action)| FollowUpAction {
            id: index as u32 + 1,
            ..action
        })
        .collect();

        let escalations = objects(pick(&obj, &["escalations", "escalation"]))
            .into_iter()
            .filter_map(escalation)
            .collect();

        let next_meeting_suggestion = pick(
            &obj,
            &["nextMeetingSuggestion", "next_meeting_suggestion", "nextMeeting"],
        )
        .and_then(Value::as_object)
        .map(next_meeting)
        .unwrap_or_default();

        FollowUpPlan {
            follow_up_actions,
            escalations,
            next_meeting_suggestion,
            parse_error: false,
        }
    }

    pub fn qa(&self, raw_output: &str, question: &str) -> QaExchange {
        let question = question.trim().to_string();
        let Some(obj) = self.extract_object(raw_output, StageKind::Qa) else {
            // A prose reply is still an answer, just an unstructured one.
            let prose = strip_fences(raw_output);
            let answer = if prose.is_empty() || prose.starts_with('{') || prose.starts_with('[') {
                QA_UNPARSED.to_string()
            } else {
                prose.to_string()
            };
            return QaExchange {
                question,
                answer,
                confidence: Level::Low,
                parse_error: true,
                ..QaExchange::default()
            };
        };

        QaExchange {
            question,
            answer: text(pick(&obj, &["answer", "response"]))
                .unwrap_or_else(|| QA_UNPARSED.to_string()),
            confidence: text(pick(&obj, &["confidence"]))
                .and_then(|label| Level::from_label(&label))
                .unwrap_or(Level::Low),
            relevant_context: text_list(pick(
                &obj,
                &["relevantContext", "relevant_context", "context", "quotes"],
            )),
            related_topics: text_list(pick(&obj, &["relatedTopics", "related_topics"])),
            parse_error: false,
        }
    }
}

fn action_item(obj: &Object) -> Option<ActionItem> {
    let task = text(pick(obj, &["task", "description", "action", "title"]))?;
    let priority = text(pick(obj, &["priority"]))
        .and_then(|label| Level::from_label(&label))
        .unwrap_or_default();

    // Ids are renumbered by the batch; flagged is derived from the owner.
    Some(ActionItem::new(
        0,
        task,
        meaningful_text(pick(obj, &["owner", "assignee", "responsible", "assignedTo"])),
        meaningful_text(pick(obj, &["deadline", "dueDate", "due_date", "due"])),
        priority,
    ))
}

fn follow_up_action(obj: &Object) -> Option<FollowUpAction> {
    let action = text(pick(obj, &["action", "description", "task"]))?;
    Some(FollowUpAction {
        id: 0,
        action,
        kind: text(pick(obj, &["type", "kind"]))
            .and_then(|label| FollowUpType::from_label(&label))
            .unwrap_or_default(),
        urgency: text(pick(obj, &["urgency", "priority"]))
            .and_then(|label| Level::from_label(&label))
            .unwrap_or_default(),
        suggested_date: text(pick(obj, &["suggestedDate", "suggested_date", "date"]))
            .unwrap_or_default(),
        involved_parties: text_list(pick(
            obj,
            &["involvedParties", "involved_parties", "participants", "attendees"],
        )),
        reason: text(pick(obj, &["reason", "rationale"])).unwrap_or_default(),
    })
}

fn escalation(obj: &Object) -> Option<Escalation> {
    let issue = text(pick(obj, &["issue", "description"]))?;
    Some(Escalation {
        issue,
        escalate_to: meaningful_text(pick(obj, &["escalateTo", "escalate_to", "owner"]))
            .unwrap_or_else(|| UNASSIGNED.to_string()),
        reason: text(pick(obj, &["reason", "rationale"])).unwrap_or_default(),
    })
}

fn next_meeting(obj: &Object) -> NextMeetingSuggestion {
    NextMeetingSuggestion {
        recommended: flag(pick(obj, &["recommended"])).unwrap_or(false),
        suggested_timeframe: text(pick(
            obj,
            &["suggestedTimeframe", "suggested_timeframe", "timeframe"],
        ))
        .unwrap_or_default(),
        agenda: text_list(pick(obj, &["agenda"])),
        required_attendees: text_list(pick(
            obj,
            &["requiredAttendees", "required_attendees", "attendees"],
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
