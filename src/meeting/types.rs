//! Canonical result types for each analysis stage.

use serde::{Deserialize, Serialize};

/// Owner sentinel for tasks nobody took.
pub const UNASSIGNED: &str = "UNASSIGNED";
/// Deadline sentinel for tasks without a due date.
pub const NO_DEADLINE: &str = "NO_DEADLINE";
/// Every action item starts out pending.
pub const STATUS_PENDING: &str = "pending";
/// Summary used when the model omitted `meetingSummary`.
pub const NO_SUMMARY: &str = "No summary available";
/// Summary used when the model output could not be parsed at all.
pub const UNPARSED_SUMMARY: &str = "Unable to parse meeting content";

fn is_false(value: &bool) -> bool {
    !*value
}

/// High/medium/low scale shared by priority, urgency and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    #[default]
    Medium,
    Low,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse a label as the model tends to write it ("High", " low ", "med").
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" | "urgent" | "critical" => Some(Self::High),
            "medium" | "med" | "moderate" | "normal" => Some(Self::Medium),
            "low" | "minor" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Output of the understanding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredMeeting {
    pub participants: Vec<String>,
    pub key_points: Vec<String>,
    pub decisions: Vec<String>,
    pub unresolved_issues: Vec<String>,
    pub risks: Vec<String>,
    pub topics: Vec<String>,
    pub meeting_summary: String,
    /// Set when the model output could not be parsed and this is a fallback.
    #[serde(skip_serializing_if = "is_false")]
    pub parse_error: bool,
}

impl Default for StructuredMeeting {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            key_points: Vec::new(),
            decisions: Vec::new(),
            unresolved_issues: Vec::new(),
            risks: Vec::new(),
            topics: Vec::new(),
            meeting_summary: NO_SUMMARY.to_string(),
            parse_error: false,
        }
    }
}

impl StructuredMeeting {
    /// Fallback used when the understanding reply was not valid JSON.
    pub fn unparsed() -> Self {
        Self {
            meeting_summary: UNPARSED_SUMMARY.to_string(),
            parse_error: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionItem {
    pub id: u32,
    pub task: String,
    pub owner: String,
    pub deadline: String,
    pub priority: Level,
    pub status: String,
    /// True iff `owner` is [`UNASSIGNED`].
    pub flagged: bool,
}

impl Default for ActionItem {
    fn default() -> Self {
        Self::new(0, String::new(), None, None, Level::default())
    }
}

impl ActionItem {
    pub fn new(
        id: u32,
        task: String,
        owner: Option<String>,
        deadline: Option<String>,
        priority: Level,
    ) -> Self {
        let owner = owner.unwrap_or_else(|| UNASSIGNED.to_string());
        let flagged = owner == UNASSIGNED;
        Self {
            id,
            task,
            owner,
            deadline: deadline.unwrap_or_else(|| NO_DEADLINE.to_string()),
            priority,
            status: STATUS_PENDING.to_string(),
            flagged,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.owner == UNASSIGNED
    }
}

/// Counters over an action item batch, always computed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionSummary {
    pub total_tasks: usize,
    pub assigned_tasks: usize,
    pub unassigned_tasks: usize,
    pub flagged_items: usize,
}

impl ActionSummary {
    pub fn from_items(items: &[ActionItem]) -> Self {
        let unassigned = items.iter().filter(|item| item.is_unassigned()).count();
        Self {
            total_tasks: items.len(),
            assigned_tasks: items.len() - unassigned,
            unassigned_tasks: unassigned,
            flagged_items: items.iter().filter(|item| item.flagged).count(),
        }
    }
}

/// Output of the action items stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionItemBatch {
    pub action_items: Vec<ActionItem>,
    pub summary: ActionSummary,
    #[serde(skip_serializing_if = "is_false")]
    pub parse_error: bool,
}

impl ActionItemBatch {
    pub fn from_items(items: Vec<ActionItem>) -> Self {
        let mut batch = Self {
            action_items: items,
            summary: ActionSummary::default(),
            parse_error: false,
        };
        batch.reconcile();
        batch
    }

    pub fn unparsed() -> Self {
        Self {
            parse_error: true,
            ..Self::default()
        }
    }

    /// Re-establish batch invariants on data that did not come through the
    /// normalizer: 1-based sequential ids, sentinel owner/deadline, `flagged`
    /// derived from the owner, and recomputed counters.
    pub fn reconcile(&mut self) {
        for (index, item) in self.action_items.iter_mut().enumerate() {
            item.id = index as u32 + 1;
            if item.owner.trim().is_empty() {
                item.owner = UNASSIGNED.to_string();
            }
            if item.deadline.trim().is_empty() {
                item.deadline = NO_DEADLINE.to_string();
            }
            if item.status.trim().is_empty() {
                item.status = STATUS_PENDING.to_string();
            }
            item.flagged = item.is_unassigned();
        }
        self.summary = ActionSummary::from_items(&self.action_items);
    }

    pub fn len(&self) -> usize {
        self.action_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpType {
    Meeting,
    Email,
    Escalation,
    #[default]
    Reminder,
    Review,
}

impl FollowUpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::Email => "email",
            Self::Escalation => "escalation",
            Self::Reminder => "reminder",
            Self::Review => "review",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "meeting" | "call" | "sync" => Some(Self::Meeting),
            "email" | "e-mail" | "message" => Some(Self::Email),
            "escalation" | "escalate" => Some(Self::Escalation),
            "reminder" | "remind" => Some(Self::Reminder),
            "review" | "check-in" => Some(Self::Review),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowUpAction {
    pub id: u32,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: FollowUpType,
    pub urgency: Level,
    pub suggested_date: String,
    pub involved_parties: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Escalation {
    pub issue: String,
    pub escalate_to: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextMeetingSuggestion {
    pub recommended: bool,
    pub suggested_timeframe: String,
    pub agenda: Vec<String>,
    pub required_attendees: Vec<String>,
}

/// Output of the follow-up stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowUpPlan {
    pub follow_up_actions: Vec<FollowUpAction>,
    pub escalations: Vec<Escalation>,
    pub next_meeting_suggestion: NextMeetingSuggestion,
    #[serde(skip_serializing_if = "is_false")]
    pub parse_error: bool,
}

impl FollowUpPlan {
    pub fn unparsed() -> Self {
        Self {
            parse_error: true,
            ..Self::default()
        }
    }

    pub fn has_escalations(&self) -> bool {
        !self.escalations.is_empty()
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QaExchange {
    pub question: String,
    pub answer: String,
    pub confidence: Level,
    pub relevant_context: Vec<String>,
    pub related_topics: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub parse_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(owner: Option<&str>) -> ActionItem {
        ActionItem::new(
            1,
            "Write the report".to_string(),
            owner.map(str::to_string),
            None,
            Level::High,
        )
    }

    #[test]
    fn test_level_from_label() {
        assert_eq!(Level::from_label("High"), Some(Level::High));
        assert_eq!(Level::from_label(" med "), Some(Level::Medium));
        assert_eq!(Level::from_label("LOW"), Some(Level::Low));
        assert_eq!(Level::from_label("whenever"), None);
    }

    #[test]
    fn test_action_item_flagged_tracks_owner() {
        let unassigned = item(None);
        assert_eq!(unassigned.owner, UNASSIGNED);
        assert!(unassigned.flagged);
        assert_eq!(unassigned.deadline, NO_DEADLINE);
        assert_eq!(unassigned.status, STATUS_PENDING);

        let owned = item(Some("Sarah"));
        assert!(!owned.flagged);
    }

    #[test]
    fn test_summary_is_recomputed() {
        let batch = ActionItemBatch::from_items(vec![item(None), item(Some("David")), item(None)]);

        assert_eq!(batch.summary.total_tasks, 3);
        assert_eq!(batch.summary.assigned_tasks, 1);
        assert_eq!(batch.summary.unassigned_tasks, 2);
        assert_eq!(batch.summary.flagged_items, 2);
        let ids: Vec<u32> = batch.action_items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_reconcile_repairs_caller_supplied_batch() {
        let json = r#"{
            "actionItems": [
                {"id": 7, "task": "Ship", "owner": "David", "flagged": true},
                {"id": 7, "task": "Test", "owner": ""}
            ],
            "summary": {"totalTasks": 99}
        }"#;
        let mut batch: ActionItemBatch = serde_json::from_str(json).unwrap();
        batch.reconcile();

        assert_eq!(batch.action_items[0].id, 1);
        assert!(!batch.action_items[0].flagged);
        assert_eq!(batch.action_items[1].id, 2);
        assert_eq!(batch.action_items[1].owner, UNASSIGNED);
        assert!(batch.action_items[1].flagged);
        assert_eq!(batch.action_items[1].deadline, NO_DEADLINE);
        assert_eq!(batch.summary.total_tasks, 2);
    }

    #[test]
    fn test_structured_meeting_serializes_camel_case() {
        let meeting = StructuredMeeting {
            participants: vec!["David".to_string()],
            key_points: vec!["Ship Friday".to_string()],
            ..StructuredMeeting::default()
        };
        let value = serde_json::to_value(&meeting).unwrap();

        assert_eq!(value["keyPoints"][0], "Ship Friday");
        assert_eq!(value["meetingSummary"], NO_SUMMARY);
        assert!(value.get("unresolvedIssues").is_some());
        // parseError only appears on fallbacks
        assert!(value.get("parseError").is_none());
        assert_eq!(
            serde_json::to_value(StructuredMeeting::unparsed()).unwrap()["parseError"],
            true
        );
    }

    #[test]
    fn test_follow_up_type_field_name() {
        let action = FollowUpAction {
            id: 1,
            action: "Email the client".to_string(),
            kind: FollowUpType::Email,
            ..FollowUpAction::default()
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "email");
        assert_eq!(value["urgency"], "medium");
    }
}
