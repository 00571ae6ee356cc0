//! Prompt templates for the four analysis stages.
//!
//! The JSON shapes spelled out here are what `normalizer` reads back. Rename a
//! field in one place and the other must follow.

use serde::Serialize;

use crate::meeting::{ActionItemBatch, StructuredMeeting, NO_DEADLINE, UNASSIGNED};

const JSON_ONLY: &str = "Respond ONLY with valid JSON, no additional text.";

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prompt for the understanding stage: raw transcript in, structured meeting out.
pub fn understanding_prompt(transcript: &str) -> String {
    format!(
        r#"You are a Meeting Understanding Agent. You analyze meeting transcripts and extract structured information.

TASK: Analyze the following meeting transcript and produce a structured summary.

TRANSCRIPT:
{transcript}

INSTRUCTIONS:
1. Identify every participant who speaks or is mentioned
2. Extract the key discussion points
3. List the decisions that were made
4. Note unresolved issues and pending decisions
5. Flag risks or concerns that were raised
6. Name the main topics discussed

OUTPUT FORMAT (JSON):
{{
  "participants": ["participant names"],
  "keyPoints": ["main discussion points"],
  "decisions": ["decisions made"],
  "unresolvedIssues": ["pending items or unresolved topics"],
  "risks": ["risks or concerns mentioned"],
  "topics": ["main topics discussed"],
  "meetingSummary": "A brief 2-3 sentence summary of the meeting"
}}

{JSON_ONLY}
"#,
        transcript = transcript.trim(),
    )
}

/// Prompt for the action items stage.
pub fn action_items_prompt(meeting: &StructuredMeeting) -> String {
    format!(
        r#"You are an Action & Ownership Agent. You extract action items from meeting content and identify who owns each task.

TASK: Extract every action item from the following structured meeting content.

MEETING CONTENT:
{meeting}

INSTRUCTIONS:
1. Identify all tasks and action items mentioned
2. For each task determine:
   - who is responsible (owner)
   - the deadline, if one was mentioned
   - a priority of high, medium or low based on context
3. Use "{UNASSIGNED}" as the owner of tasks with no clear owner
4. Use "{NO_DEADLINE}" as the deadline of tasks with no deadline

OUTPUT FORMAT (JSON):
{{
  "actionItems": [
    {{
      "id": 1,
      "task": "Description of the task",
      "owner": "Person name or {UNASSIGNED}",
      "deadline": "Date/time or {NO_DEADLINE}",
      "priority": "high|medium|low",
      "status": "pending",
      "flagged": true if the owner is {UNASSIGNED}, otherwise false
    }}
  ]
}}

{JSON_ONLY}
"#,
        meeting = pretty(meeting),
    )
}

/// Prompt for the follow-up stage.
pub fn follow_up_prompt(meeting: &StructuredMeeting, actions: &ActionItemBatch) -> String {
    format!(
        r#"You are a Follow-Up Orchestration Agent. You recommend follow-up actions and next steps based on meeting outcomes.

TASK: Review the meeting content and action items, then recommend follow-up actions.

MEETING CONTENT:
{meeting}

ACTION ITEMS:
{actions}

INSTRUCTIONS:
1. Identify items that need escalation
2. Suggest follow-up meetings where needed
3. Recommend communication actions
4. Flag urgent items that need immediate attention
5. Suggest a timeline for next steps

OUTPUT FORMAT (JSON):
{{
  "followUpActions": [
    {{
      "id": 1,
      "action": "Description of the follow-up action",
      "type": "meeting|email|escalation|reminder|review",
      "urgency": "high|medium|low",
      "suggestedDate": "recommended date or timeframe",
      "involvedParties": ["people involved"],
      "reason": "Why this follow-up is needed"
    }}
  ],
  "escalations": [
    {{
      "issue": "Issue to escalate",
      "escalateTo": "Person or role to escalate to",
      "reason": "Why escalation is needed"
    }}
  ],
  "nextMeetingSuggestion": {{
    "recommended": true or false,
    "suggestedTimeframe": "e.g. within 1 week",
    "agenda": ["suggested agenda items"],
    "requiredAttendees": ["required attendees"]
  }}
}}

{JSON_ONLY}
"#,
        meeting = pretty(meeting),
        actions = pretty(&actions.action_items),
    )
}

/// Prompt for answering one question about a meeting.
pub fn qa_prompt(meeting: &StructuredMeeting, question: &str) -> String {
    format!(
        r#"You are a Knowledge/Q&A Agent. You answer specific questions about meeting content.

TASK: Answer the user's question using the meeting content provided.

MEETING CONTENT:
{meeting}

USER QUESTION:
{question}

INSTRUCTIONS:
1. Answer ONLY from the meeting content provided
2. If the answer is not in the meeting content, say so clearly
3. Be concise but complete
4. Quote relevant parts of the meeting when helpful
5. If the question is about a specific person, focus on their contributions and tasks

OUTPUT FORMAT (JSON):
{{
  "answer": "Your answer to the question",
  "confidence": "high|medium|low",
  "relevantContext": ["quotes or points from the meeting that support the answer"],
  "relatedTopics": ["other topics from the meeting the user might want to know about"]
}}

{JSON_ONLY}
"#,
        meeting = pretty(meeting),
        question = question.trim(),
    )
}
