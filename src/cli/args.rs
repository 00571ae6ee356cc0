use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Meeting transcript analysis backed by watsonx.ai", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the HTTP API (default when no command is given)
    Serve(ServeCliArgs),
    /// Analyse a transcript file and print the full result as JSON
    Process(ProcessCliArgs),
    /// Ask a question about a transcript file
    Ask(AskCliArgs),
    /// List foundation models available to the configured project
    Models,
    /// Exchange the API key for a token to verify credentials
    AuthCheck,
    /// Show provider configuration status
    Status,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ServeCliArgs {
    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
pub struct ProcessCliArgs {
    /// Transcript file, or "-" for stdin
    pub file: PathBuf,
    /// Session id to report in the output
    #[arg(short, long)]
    pub session: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct AskCliArgs {
    /// Transcript file, or "-" for stdin
    pub file: PathBuf,
    /// Question about the meeting
    pub question: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process() {
        let cli = Cli::parse_from(["huddle", "process", "notes.txt", "--session", "s1"]);
        match cli.command {
            Some(CliCommand::Process(args)) => {
                assert_eq!(args.file, PathBuf::from("notes.txt"));
                assert_eq!(args.session.as_deref(), Some("s1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ask_and_global_verbose() {
        let cli = Cli::parse_from(["huddle", "ask", "-", "Who owns testing?", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(CliCommand::Ask(_))));
    }

    #[test]
    fn test_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["huddle"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_auth_check() {
        let cli = Cli::parse_from(["huddle", "auth-check"]);
        assert!(matches!(cli.command, Some(CliCommand::AuthCheck)));
    }
}
