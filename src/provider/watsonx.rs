//! Text generation client for IBM watsonx.ai.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{GenerationOptions, GenerationParams, TextGenerator, TokenProvider};
use crate::config::ProviderConfig;
use crate::error::{AssistantError, Result};

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model_id: &'a str,
    input: &'a str,
    parameters: GenerationParams,
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ModelSpecsResponse {
    #[serde(default)]
    resources: Vec<ModelSpec>,
}

/// One foundation model offered by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub model_id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

pub struct WatsonxClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    model_id: String,
    api_version: String,
    defaults: GenerationParams,
    tokens: Arc<TokenProvider>,
}

impl WatsonxClient {
    /// Build a client sharing one HTTP connection pool with its token provider.
    pub fn from_config(config: &ProviderConfig, defaults: GenerationParams) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AssistantError::Config("WATSONX_API_KEY is not set".to_string()))?;
        let project_id = config
            .project_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AssistantError::Config("WATSONX_PROJECT_ID is not set".to_string()))?;

        let mut builder = reqwest::Client::builder();
        if config.request_timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|e| AssistantError::Config(format!("Failed to build HTTP client: {e}")))?;

        let tokens = Arc::new(TokenProvider::new(client.clone(), &config.iam_url, api_key));

        Ok(Self::new(
            client,
            &config.url,
            project_id,
            config.model_id.clone(),
            config.api_version.clone(),
            defaults,
            tokens,
        ))
    }

    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        project_id: String,
        model_id: String,
        api_version: String,
        defaults: GenerationParams,
        tokens: Arc<TokenProvider>,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            "Initialized watsonx.ai client for model {} at {}",
            model_id, base_url
        );

        Self {
            client,
            base_url,
            project_id,
            model_id,
            api_version,
            defaults,
            tokens,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn tokens(&self) -> &Arc<TokenProvider> {
        &self.tokens
    }

    /// List the foundation models available to this account.
    pub async fn list_models(&self) -> Result<Vec<ModelSpec>> {
        let token = self.tokens.get_token().await?;
        let url = format!(
            "{}/ml/v1/foundation_model_specs?version={}",
            self.base_url, self.api_version
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AssistantError::Generation(format!("Failed to list models: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Generation(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(AssistantError::Generation(format!(
                "Model listing failed with status {status}: {body}"
            )));
        }

        let specs: ModelSpecsResponse = serde_json::from_str(&body).map_err(|e| {
            AssistantError::Generation(format!("Failed to parse model listing: {e}"))
        })?;

        Ok(specs.resources)
    }
}

#[async_trait]
impl TextGenerator for WatsonxClient {
    fn name(&self) -> &'static str {
        "watsonx.ai"
    }

    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let token = self.tokens.get_token().await?;
        let url = format!(
            "{}/ml/v1/text/generation?version={}",
            self.base_url, self.api_version
        );

        let body = GenerationRequest {
            model_id: &self.model_id,
            input: prompt,
            parameters: options.merge_over(&self.defaults),
            project_id: &self.project_id,
        };

        debug!(
            "Sending {} byte prompt to {} (max_new_tokens={})",
            prompt.len(),
            self.model_id,
            body.parameters.max_new_tokens
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Error calling watsonx.ai: {}", e);
                AssistantError::Generation(format!("Request to watsonx.ai failed: {e}"))
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AssistantError::Generation(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            error!(
                "watsonx.ai request failed with status {}: {}",
                status, response_text
            );
            return Err(AssistantError::Generation(format!(
                "watsonx.ai returned status {status}"
            )));
        }

        let parsed: GenerationResponse = serde_json::from_str(&response_text).map_err(|e| {
            AssistantError::Generation(format!("Failed to parse generation response: {e}"))
        })?;

        let text = parsed
            .results
            .into_iter()
            .next()
            .map(|result| result.generated_text)
            .ok_or_else(|| {
                AssistantError::Generation("watsonx.ai returned no generated text".to_string())
            })?;

        debug!("Generated {} chars", text.len());
        Ok(text)
    }
}
