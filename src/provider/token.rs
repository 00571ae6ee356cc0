//! Bearer token exchange and caching for the provider's IAM service.

use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::{AssistantError, Result};

/// Tokens are refreshed once less than this much lifetime remains.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(300);

const API_KEY_GRANT: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, margin: Duration) -> bool {
        Instant::now() + margin < self.expires_at
    }
}

/// Exchanges an API key for a bearer token and caches it until it is close
/// to expiry.
///
/// The cache lock is held across the exchange so concurrent callers wait for
/// one refresh instead of each performing their own.
pub struct TokenProvider {
    client: reqwest::Client,
    iam_url: String,
    api_key: String,
    margin: Duration,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, iam_url: &str, api_key: &str) -> Self {
        Self {
            client,
            iam_url: iam_url.to_string(),
            api_key: api_key.to_string(),
            margin: REFRESH_MARGIN,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached token, or exchange the API key for a new one.
    pub async fn get_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(self.margin)) {
            debug!("Using cached access token");
            return Ok(token.access_token.clone());
        }

        let token = self.exchange().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next call performs a fresh exchange.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn exchange(&self) -> Result<CachedToken> {
        info!("Requesting access token from {}", self.iam_url);

        let response = self
            .client
            .post(&self.iam_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", API_KEY_GRANT), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!("Error getting access token: {}", e);
                AssistantError::Auth(format!("IAM endpoint unreachable: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Auth(format!("Failed to read IAM response: {e}")))?;

        if !status.is_success() {
            error!("IAM token request failed with status {}: {}", status, body);
            return Err(AssistantError::Auth(format!(
                "IAM token request failed with status {status}"
            )));
        }

        let parsed: IamTokenResponse = serde_json::from_str(&body)
            .map_err(|e| AssistantError::Auth(format!("Malformed IAM response: {e}")))?;

        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(parsed.expires_in))
            .ok_or_else(|| {
                AssistantError::Auth(format!(
                    "Invalid expires_in in IAM response: {}",
                    parsed.expires_in
                ))
            })?;

        info!("Access token obtained, expires in {}s", parsed.expires_in);

        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at,
        })
    }
}
