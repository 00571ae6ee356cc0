pub mod analysis;
pub mod args;
pub mod provider;

pub use analysis::{handle_ask_command, handle_process_command};
pub use args::{AskCliArgs, Cli, CliCommand, ProcessCliArgs, ServeCliArgs};
pub use provider::{handle_auth_check_command, handle_models_command, handle_status_command};
