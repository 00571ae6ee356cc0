use crate::global;
use crate::provider::GenerationParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variables that override file values.
pub mod env_vars {
    pub const API_KEY: &str = "WATSONX_API_KEY";
    pub const PROJECT_ID: &str = "WATSONX_PROJECT_ID";
    pub const URL: &str = "WATSONX_URL";
    pub const MODEL_ID: &str = "WATSONX_MODEL_ID";
    pub const PORT: &str = "PORT";
    pub const ENVIRONMENT: &str = "HUDDLE_ENV";
    pub const NODE_ENV: &str = "NODE_ENV";
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub generation: GenerationParams,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub normalizer: NormalizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    /// Base URL of the watsonx.ai region
    pub url: String,
    /// IAM token exchange endpoint
    pub iam_url: String,
    pub model_id: String,
    pub api_version: String,
    /// 0 disables the client-side timeout
    pub request_timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            url: "https://us-south.ml.cloud.ibm.com".to_string(),
            iam_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
            model_id: "ibm/granite-13b-chat-v2".to_string(),
            api_version: "2024-01-01".to_string(),
            request_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }

    pub fn is_development(&self) -> bool {
        *self == Self::Development
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Development mode includes error details in 5xx responses
    pub environment: Environment,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: Environment::Production,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds a cached meeting stays valid; 0 keeps entries until evicted
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            max_entries: 256,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Also recover JSON wrapped in prose or non-standard fences
    pub tolerant_extraction: bool,
}

/// Whether the LLM provider can be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    Ready { model: String, url: String },
    /// Some credentials are set but not all
    ConfigError { error: String },
    NotConfigured,
}

impl ProviderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ProviderConfig {
    pub fn status(&self) -> ProviderStatus {
        let has_key = present(&self.api_key);
        let has_project = present(&self.project_id);

        match (has_key, has_project) {
            (false, false) => ProviderStatus::NotConfigured,
            (true, false) => ProviderStatus::ConfigError {
                error: format!("{} is not set", env_vars::PROJECT_ID),
            },
            (false, true) => ProviderStatus::ConfigError {
                error: format!("{} is not set", env_vars::API_KEY),
            },
            (true, true) if self.url.trim().is_empty() => ProviderStatus::ConfigError {
                error: format!("{} is empty", env_vars::URL),
            },
            (true, true) => ProviderStatus::Ready {
                model: self.model_id.clone(),
                url: self.url.clone(),
            },
        }
    }
}

impl Config {
    /// Load the config file (creating it with defaults on first run), then
    /// apply `.env` and environment overrides.
    pub fn load() -> Result<Self> {
        load_dotenv();
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Override file values with whatever `lookup` returns for the known
    /// environment variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(env_vars::API_KEY) {
            self.provider.api_key = Some(key);
        }
        if let Some(project) = non_empty(env_vars::PROJECT_ID) {
            self.provider.project_id = Some(project);
        }
        if let Some(url) = non_empty(env_vars::URL) {
            self.provider.url = url;
        }
        if let Some(model) = non_empty(env_vars::MODEL_ID) {
            self.provider.model_id = model;
        }
        if let Some(port) = non_empty(env_vars::PORT) {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid {} value: {}", env_vars::PORT, port),
            }
        }
        let environment = non_empty(env_vars::ENVIRONMENT).or_else(|| non_empty(env_vars::NODE_ENV));
        if let Some(label) = environment {
            match Environment::from_label(&label) {
                Some(env) => self.server.environment = env,
                None => warn!("Ignoring unknown environment: {}", label),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}

/// Load `.env` from the working directory, falling back to the one next to
/// the config file. Existing environment variables win.
fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {:?}", path);
        return;
    }
    if let Ok(path) = global::env_file() {
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(()) => info!("Loaded environment from {:?}", path),
                Err(e) => warn!("Failed to load {:?}: {}", path, e),
            }
        }
    }
}
