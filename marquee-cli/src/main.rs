//! Marquee CLI - Command-line interface
//!
//! Searches movies by title and prints poster-backed result cards.

mod commands;
mod render;

use std::path::PathBuf;

use clap::Parser;
use marquee_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Search movies and show result cards with verified posters")]
struct Cli {
    /// Console log level (the log file always captures everything)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Directory for the debug log of this run
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())?;

    if let Err(error) = commands::handle_command(cli.command).await {
        tracing::error!(%error, "Command failed");
        eprintln!("{}", error.user_message());
        std::process::exit(if error.is_user_error() { 2 } else { 1 });
    }

    Ok(())
}
