//! Domain errors for the analysis pipeline.
//!
//! Application glue (config loading, CLI, service start) uses `anyhow`;
//! everything a caller of the pipeline may need to branch on lives here.

use crate::meeting::StageKind;

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Provider credentials are missing or invalid.
    #[error("LLM provider is not configured: {0}")]
    Config(String),
    /// The credential exchange failed or the IAM endpoint was unreachable.
    #[error("Failed to authenticate with the LLM provider: {0}")]
    Auth(String),
    /// The generation call failed or returned a non-2xx status.
    #[error("Failed to generate text: {0}")]
    Generation(String),
    /// Caller input was missing or empty.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// A pipeline stage failed; the remaining stages were not run.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: StageKind,
        source: Box<AssistantError>,
    },
}

impl AssistantError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap this error with the stage it happened in. Already wrapped errors
    /// keep their original stage.
    pub fn in_stage(self, stage: StageKind) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error was raised in, if any.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, with stage wrappers removed.
    pub fn root(&self) -> &AssistantError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the caller sent something we could not act on.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.root(),
            Self::Validation(_) | Self::NotFound(_)
        )
    }
}
