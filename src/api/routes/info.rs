//! Health and API info routes.

use crate::api::AppState;
use axum::{extract::State, response::Json};
use serde_json::{json, Map, Value};

pub const ENDPOINTS: &[(&str, &str)] = &[
    ("POST /api/meeting/process", "Process complete meeting transcript"),
    ("POST /api/meeting/summary", "Get meeting summary only"),
    ("POST /api/meeting/actions", "Get action items only"),
    ("POST /api/meeting/followups", "Get follow-up suggestions"),
    ("POST /api/meeting/qa", "Ask questions about the meeting"),
    ("DELETE /api/meeting/cache/:sessionId", "Clear session cache"),
    ("GET /health", "Service health"),
    ("GET /api", "API info"),
];

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Backend is running",
        "providerConfigured": state.provider.is_ready(),
        "provider": state.provider,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api
pub async fn api_info() -> Json<Value> {
    let endpoints: Map<String, Value> = ENDPOINTS
        .iter()
        .map(|(endpoint, description)| (endpoint.to_string(), json!(description)))
        .collect();

    Json(json!({
        "name": "Huddle Meeting Assistant API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}
