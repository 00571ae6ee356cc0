//! Meeting analysis API endpoints.
//!
//! - POST /api/meeting/process
//! - POST /api/meeting/summary
//! - POST /api/meeting/actions
//! - POST /api/meeting/followups
//! - POST /api/meeting/qa
//! - DELETE /api/meeting/cache/:sessionId

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::error::AssistantError;
use crate::meeting::{ActionItemBatch, QaExchange, StructuredMeeting};
use crate::normalizer::Normalizer;
use crate::pipeline::{MeetingSource, QaContext};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{delete, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process", post(process))
        .route("/summary", post(summary))
        .route("/actions", post(actions))
        .route("/followups", post(follow_ups))
        .route("/qa", post(qa))
        .route("/cache/:session_id", delete(clear_cache))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    pub transcript: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsRequest {
    pub transcript: Option<String>,
    pub meeting: Option<StructuredMeeting>,
    pub session_id: Option<String>,
}

/// Caller-supplied action items, a bare list or a batch object. Mapped with
/// the same lenient rules as model output.
fn supplied_action_items(value: Value) -> Result<ActionItemBatch, AssistantError> {
    if !(value.is_array() || value.is_object()) {
        return Err(AssistantError::validation(
            "actionItems must be a list or an object",
        ));
    }
    Ok(Normalizer::action_items_from_value(&value))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpsRequest {
    pub transcript: Option<String>,
    pub meeting: Option<StructuredMeeting>,
    pub session_id: Option<String>,
    pub action_items: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaRequest {
    pub question: Option<String>,
    pub transcript: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QaResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(flatten)]
    exchange: QaExchange,
}

/// An inline meeting wins, then an inline transcript, then a cached session.
fn meeting_source(
    transcript: Option<String>,
    meeting: Option<StructuredMeeting>,
    session_id: Option<String>,
) -> Result<MeetingSource, AssistantError> {
    if let Some(meeting) = meeting {
        return Ok(MeetingSource::Structured(meeting));
    }
    if let Some(transcript) = transcript.filter(|t| !t.trim().is_empty()) {
        return Ok(MeetingSource::Transcript(transcript));
    }
    match session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => Ok(MeetingSource::Session(id)),
        None => Err(AssistantError::validation("Transcript is required")),
    }
}

/// POST /api/meeting/process - Run every stage on a transcript.
async fn process(
    State(state): State<AppState>,
    body: Result<Json<TranscriptRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let transcript = req.transcript.unwrap_or_default();

    info!("Process request received via API");

    let outcome = state
        .pipeline
        .process(&transcript, req.session_id.as_deref())
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({
        "success": true,
        "data": outcome.data,
        "metadata": outcome.metadata,
        "sessionId": outcome.session_id,
        "processingTime": outcome.processing_time(),
        "cached": outcome.cached,
    })))
}

/// POST /api/meeting/summary - Understanding stage only.
async fn summary(
    State(state): State<AppState>,
    body: Result<Json<TranscriptRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let transcript = req.transcript.unwrap_or_default();

    let outcome = state
        .pipeline
        .summarize(&transcript, req.session_id.as_deref())
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({
        "success": true,
        "data": outcome.meeting,
        "sessionId": outcome.session_id,
        "cached": outcome.cached,
    })))
}

/// POST /api/meeting/actions - Action items for a transcript or meeting.
async fn actions(
    State(state): State<AppState>,
    body: Result<Json<ActionsRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let source =
        meeting_source(req.transcript, req.meeting, req.session_id).map_err(|e| state.reject(e))?;

    let batch = state
        .pipeline
        .extract_actions(source)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({
        "success": true,
        "data": batch,
    })))
}

/// POST /api/meeting/followups - Follow-up plan.
async fn follow_ups(
    State(state): State<AppState>,
    body: Result<Json<FollowUpsRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let source =
        meeting_source(req.transcript, req.meeting, req.session_id).map_err(|e| state.reject(e))?;
    let actions = req
        .action_items
        .map(supplied_action_items)
        .transpose()
        .map_err(|e| state.reject(e))?;

    let plan = state
        .pipeline
        .plan_follow_ups(source, actions)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({
        "success": true,
        "data": plan,
    })))
}

/// POST /api/meeting/qa - Answer a question about a meeting.
async fn qa(
    State(state): State<AppState>,
    body: Result<Json<QaRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    let question = req.question.unwrap_or_default();
    let context = QaContext {
        session_id: req.session_id.filter(|id| !id.trim().is_empty()),
        transcript: req.transcript,
    };

    let outcome = state
        .pipeline
        .answer(&question, context)
        .await
        .map_err(|e| state.reject(e))?;

    let response = QaResponse {
        success: true,
        session_id: outcome.session_id,
        exchange: outcome.exchange,
    };
    serde_json::to_value(response)
        .map(Json)
        .map_err(|e| ApiError::internal(e.to_string(), state.environment.is_development()))
}

/// DELETE /api/meeting/cache/:sessionId - Evict a cached session.
async fn clear_cache(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let removed = state
        .pipeline
        .forget(&session_id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(json!({
        "success": true,
        "sessionId": session_id,
        "removed": removed,
        "message": if removed { "Session cache cleared" } else { "Session was not cached" },
    })))
}
