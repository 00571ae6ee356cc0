//! CLI handlers for provider inspection.
//!
//! Presentation only; the client and config modules do the work.

use crate::app::AppContext;
use crate::config::{Config, ProviderStatus};
use crate::global;
use crate::provider::WatsonxClient;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Instant;

pub fn handle_status_command() -> Result<()> {
    let config = Config::load()?;
    let status = config.provider.status();

    println!("Huddle {}", env!("CARGO_PKG_VERSION"));
    println!("Config file: {}", global::config_file()?.display());
    println!("Provider:    {}", provider_status_display(&status));
    println!("Model:       {}", config.provider.model_id);
    println!("URL:         {}", config.provider.url);
    println!(
        "Server:      {}:{} ({:?})",
        config.server.host, config.server.port, config.server.environment
    );
    match config.session.ttl() {
        Some(ttl) => println!(
            "Sessions:    max {} entries, {}s ttl",
            config.session.max_entries,
            ttl.as_secs()
        ),
        None => println!(
            "Sessions:    max {} entries, no expiry",
            config.session.max_entries
        ),
    }
    println!(
        "Extraction:  {}",
        if config.normalizer.tolerant_extraction {
            "tolerant"
        } else {
            "strict"
        }
    );
    Ok(())
}

pub async fn handle_auth_check_command() -> Result<()> {
    let client = configured_client()?;

    println!("Requesting access token...");
    let started = Instant::now();
    let token = client.tokens().get_token().await?;

    println!(
        "Authentication succeeded in {}ms (token length {})",
        started.elapsed().as_millis(),
        token.len()
    );
    Ok(())
}

pub async fn handle_models_command() -> Result<()> {
    let client = configured_client()?;
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No foundation models returned.");
        return Ok(());
    }

    println!("Available foundation models ({}):", models.len());
    for model in &models {
        let marker = if model.model_id == client.model_id() {
            "*"
        } else {
            " "
        };
        match &model.label {
            Some(label) => println!(" {} {} ({})", marker, model.model_id, label),
            None => println!(" {} {}", marker, model.model_id),
        }
    }

    if models.iter().any(|m| m.model_id == client.model_id()) {
        println!("\nConfigured model {} is available.", client.model_id());
    } else {
        println!(
            "\nWarning: configured model {} is not in the list.",
            client.model_id()
        );
    }
    Ok(())
}

fn configured_client() -> Result<Arc<WatsonxClient>> {
    let context = AppContext::from_config(Config::load()?);
    context
        .client
        .ok_or_else(|| anyhow!("{}", provider_status_display(&context.provider)))
}

fn provider_status_display(status: &ProviderStatus) -> String {
    match status {
        ProviderStatus::Ready { model, .. } => format!("ready ({model})"),
        ProviderStatus::ConfigError { error } => format!("configuration error: {error}"),
        ProviderStatus::NotConfigured => {
            "not configured (set WATSONX_API_KEY and WATSONX_PROJECT_ID)".to_string()
        }
    }
}
