//! LLM provider access: credential exchange and text generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, Result};

pub mod token;
pub mod watsonx;

pub use token::TokenProvider;
pub use watsonx::{ModelSpec, WatsonxClient};

/// Decoding parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub decoding_method: String,
    pub max_new_tokens: u32,
    pub min_new_tokens: u32,
    pub stop_sequences: Vec<String>,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            decoding_method: "greedy".to_string(),
            max_new_tokens: 1000,
            min_new_tokens: 1,
            stop_sequences: Vec::new(),
            repetition_penalty: 1.1,
        }
    }
}

/// Per-call overrides; unset fields fall back to the client defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub decoding_method: Option<String>,
    pub max_new_tokens: Option<u32>,
    pub min_new_tokens: Option<u32>,
    pub stop_sequences: Option<Vec<String>>,
    pub repetition_penalty: Option<f32>,
}

impl GenerationOptions {
    /// Caller options laid over `defaults`.
    pub fn merge_over(&self, defaults: &GenerationParams) -> GenerationParams {
        GenerationParams {
            decoding_method: self
                .decoding_method
                .clone()
                .unwrap_or_else(|| defaults.decoding_method.clone()),
            max_new_tokens: self.max_new_tokens.unwrap_or(defaults.max_new_tokens),
            min_new_tokens: self.min_new_tokens.unwrap_or(defaults.min_new_tokens),
            stop_sequences: self
                .stop_sequences
                .clone()
                .unwrap_or_else(|| defaults.stop_sequences.clone()),
            repetition_penalty: self
                .repetition_penalty
                .unwrap_or(defaults.repetition_penalty),
        }
    }
}

/// A hosted model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generate text for `prompt`. Fails on transport errors and non-2xx
    /// replies; never retries.
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}

/// Stand-in used when provider credentials are missing, so the service can
/// start and report itself as not configured.
pub struct UnconfiguredGenerator {
    reason: String,
}

impl UnconfiguredGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
        Err(AssistantError::Config(self.reason.clone()))
    }
}
