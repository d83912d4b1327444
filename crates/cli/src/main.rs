//! Tally CLI - tally command

use clap::{Parser, Subcommand};
use cli_lib::args::GlobalArgs;
use cli_lib::logging;
use std::process::ExitCode;

mod cmd;

/// Tally - regenerate a file from a template whenever Docker state changes
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Render on startup, then again whenever events settle (default)
    Watch,
    /// Render once and exit
    Once,
    /// Print an example configuration file
    ExampleConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; the guard flushes file logs on exit
    let _log_guard = match logging::init(cli.global.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => cmd::watch::run(&cli.global).await,
        Commands::Once => cmd::once::run(&cli.global).await,
        Commands::ExampleConfig => cmd::example_config::run(),
    };

    logging::report(result)
}
