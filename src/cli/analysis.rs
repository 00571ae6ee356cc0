//! CLI handlers that run the pipeline on transcript files.

use crate::app::AppContext;
use crate::cli::{AskCliArgs, ProcessCliArgs};
use crate::config::{Config, ProviderStatus};
use crate::pipeline::QaContext;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

pub async fn handle_process_command(args: ProcessCliArgs) -> Result<()> {
    let transcript = read_transcript(&args.file)?;
    let context = ready_context()?;

    let outcome = context
        .pipeline
        .process(&transcript, args.session.as_deref())
        .await?;

    info!(
        "Processed transcript in {}",
        outcome.processing_time()
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub async fn handle_ask_command(args: AskCliArgs) -> Result<()> {
    let transcript = read_transcript(&args.file)?;
    let context = ready_context()?;

    let outcome = context
        .pipeline
        .answer(
            &args.question,
            QaContext {
                session_id: None,
                transcript: Some(transcript),
            },
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome.exchange)?);
    Ok(())
}

fn ready_context() -> Result<AppContext> {
    let context = AppContext::from_config(Config::load()?);
    match &context.provider {
        ProviderStatus::Ready { .. } => Ok(context),
        ProviderStatus::ConfigError { error } => bail!("watsonx.ai configuration error: {error}"),
        ProviderStatus::NotConfigured => {
            bail!("watsonx.ai is not configured. Set WATSONX_API_KEY and WATSONX_PROJECT_ID")
        }
    }
}

/// Read a transcript from `path`, or stdin when `path` is "-".
pub fn read_transcript(path: &Path) -> Result<String> {
    let transcript = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read transcript from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript {}", path.display()))?
    };

    if transcript.trim().is_empty() {
        bail!("Transcript is empty");
    }
    Ok(transcript)
}
