//! REST API server for Huddle.
//!
//! Provides HTTP endpoints for:
//! - Full transcript processing
//! - Single-stage analysis (summary, action items, follow-ups)
//! - Questions about a meeting
//! - Session cache eviction
//! - Health and API info

pub mod error;
pub mod routes;

use crate::config::{Environment, ProviderStatus, ServerConfig};
use crate::pipeline::MeetingPipeline;
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use error::ApiError;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MeetingPipeline>,
    pub provider: ProviderStatus,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        pipeline: Arc<MeetingPipeline>,
        provider: ProviderStatus,
        environment: Environment,
    ) -> Self {
        Self {
            pipeline,
            provider,
            environment,
        }
    }

    pub(crate) fn reject(&self, err: crate::AssistantError) -> ApiError {
        ApiError::from_assistant(err, self.environment.is_development())
    }
}

/// Build the application router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(routes::info::health))
        .route("/api", get(routes::info::api_info))
        .nest("/api/meeting", routes::meeting::router())
        .fallback(endpoint_not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub struct ApiServer {
    host: String,
    port: u16,
    max_body_bytes: usize,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            max_body_bytes: config.max_body_bytes,
            state,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.state, self.max_body_bytes);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!("API server listening on http://{}", addr);
        info!("Endpoints:");
        for (endpoint, description) in routes::info::ENDPOINTS {
            info!("  {:<34} - {}", endpoint, description);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        "{} {} -> {} ({}ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn endpoint_not_found() -> impl IntoResponse {
    ApiError::endpoint_not_found()
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
