use anyhow::Result;
use clap::Parser;
use huddle::{
    app,
    cli::{
        handle_ask_command, handle_auth_check_command, handle_models_command,
        handle_process_command, handle_status_command, Cli, CliCommand,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("Huddle {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::Status) => handle_status_command(),
        Some(CliCommand::AuthCheck) => handle_auth_check_command().await,
        Some(CliCommand::Models) => handle_models_command().await,
        Some(CliCommand::Process(args)) => handle_process_command(args).await,
        Some(CliCommand::Ask(args)) => handle_ask_command(args).await,
        Some(CliCommand::Serve(args)) => app::run_service(args.port).await,
        None => app::run_service(None).await,
    }
}
