//! API error handling for consistent JSON error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::AssistantError;
use crate::meeting::StageKind;

const GENERIC_MESSAGE: &str = "Something went wrong";

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: Option<String>,
    stage: Option<StageKind>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<StageKind>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: None,
            stage: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// 500 carrying `detail` only when `development` is set.
    pub fn internal(detail: impl Into<String>, development: bool) -> Self {
        let detail = detail.into();
        Self {
            message: Some(if development {
                detail
            } else {
                GENERIC_MESSAGE.to_string()
            }),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }

    /// Unknown route.
    pub fn endpoint_not_found() -> Self {
        Self {
            message: Some("See /api for available endpoints".to_string()),
            ..Self::not_found("Endpoint not found")
        }
    }

    /// Map a pipeline error. Client errors keep their message; everything
    /// else becomes a 500 whose detail is only shown in development.
    pub fn from_assistant(err: AssistantError, development: bool) -> Self {
        let stage = err.stage();
        let api_error = match err.root() {
            AssistantError::Validation(message) => Self::bad_request(message.clone()),
            AssistantError::NotFound(message) => Self::not_found(message.clone()),
            _ => {
                error!("Request failed: {}", err);
                let mut api_error = Self::internal(err.to_string(), development);
                if let Some(stage) = stage {
                    api_error.error = format!("Meeting analysis failed during {stage} stage");
                }
                api_error
            }
        };
        Self { stage, ..api_error }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: &self.error,
            message: self.message.as_deref(),
            stage: self.stage,
        });
        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            message: Some(rejection.body_text()),
            ..Self::bad_request("Invalid JSON request body")
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
