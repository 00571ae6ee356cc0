use crate::api::{ApiServer, AppState};
use crate::config::{Config, ProviderStatus};
use crate::normalizer::Normalizer;
use crate::pipeline::MeetingPipeline;
use crate::provider::{TextGenerator, UnconfiguredGenerator, WatsonxClient};
use crate::session::SessionCache;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything a request needs, built once from the config.
///
/// Owns the provider client (and with it the cached bearer token) and the
/// session cache, so nothing lives in process-wide globals.
pub struct AppContext {
    pub config: Config,
    pub provider: ProviderStatus,
    pub client: Option<Arc<WatsonxClient>>,
    pub sessions: SessionCache,
    pub pipeline: Arc<MeetingPipeline>,
}

impl AppContext {
    pub fn from_config(config: Config) -> Self {
        let mut provider = config.provider.status();

        let client = match &provider {
            ProviderStatus::Ready { .. } => {
                match WatsonxClient::from_config(&config.provider, config.generation.clone()) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(e) => {
                        warn!("Failed to create watsonx.ai client: {}", e);
                        provider = ProviderStatus::ConfigError {
                            error: e.to_string(),
                        };
                        None
                    }
                }
            }
            _ => None,
        };

        let generator: Arc<dyn TextGenerator> = match &client {
            Some(client) => client.clone(),
            None => Arc::new(UnconfiguredGenerator::new(not_configured_reason(&provider))),
        };

        let mut context = Self::with_generator(config, generator);
        context.provider = provider;
        context.client = client;
        context
    }

    /// Build a context around a caller-supplied generator, such as another
    /// backend or a test double.
    ///
    /// The generator is taken as usable, so the provider is reported `Ready`
    /// under the configured model whether or not credentials are set. Use
    /// [`AppContext::from_config`] to derive readiness from the credentials.
    pub fn with_generator(config: Config, generator: Arc<dyn TextGenerator>) -> Self {
        let sessions = SessionCache::from_config(&config.session);
        let normalizer = Normalizer::create(config.normalizer.tolerant_extraction);
        let pipeline = Arc::new(MeetingPipeline::new(
            generator,
            normalizer,
            sessions.clone(),
        ));

        Self {
            provider: ProviderStatus::Ready {
                model: config.provider.model_id.clone(),
                url: config.provider.url.clone(),
            },
            config,
            client: None,
            sessions,
            pipeline,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.pipeline.clone(),
            self.provider.clone(),
            self.config.server.environment,
        )
    }
}

fn not_configured_reason(status: &ProviderStatus) -> String {
    match status {
        ProviderStatus::ConfigError { error } => error.clone(),
        _ => "Set WATSONX_API_KEY and WATSONX_PROJECT_ID".to_string(),
    }
}

pub async fn run_service(port: Option<u16>) -> Result<()> {
    info!("Starting Huddle service");

    let mut config = Config::load()?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let context = AppContext::from_config(config);

    match &context.provider {
        ProviderStatus::Ready { model, url } => {
            info!("watsonx.ai configured: model {} at {}", model, url);
        }
        ProviderStatus::ConfigError { error } => {
            warn!("watsonx.ai configuration error: {}", error);
        }
        ProviderStatus::NotConfigured => {
            warn!(
                "watsonx.ai is not configured. Set WATSONX_API_KEY, WATSONX_PROJECT_ID and WATSONX_URL in .env"
            );
        }
    }
    if context.config.server.environment.is_development() {
        info!("Running in development mode; error details are returned to clients");
    }

    if let Some(ttl) = context.config.session.ttl() {
        spawn_session_janitor(context.sessions.clone(), ttl);
    }

    let server = ApiServer::new(&context.config.server, context.state());
    server.start().await
}

/// Periodically drop expired sessions so idle entries do not linger.
fn spawn_session_janitor(sessions: SessionCache, ttl: Duration) {
    let period = ttl.clamp(Duration::from_secs(1), Duration::from_secs(300));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    });
}
