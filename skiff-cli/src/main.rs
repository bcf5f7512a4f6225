//! Skiff CLI - Command-line interface
//!
//! Starts the LAN file-drop server in either full-storage or shared mode.

mod commands;

use clap::Parser;
use skiff_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "A LAN file-drop server")]
struct Cli {
    /// Console log level
    #[arg(long, default_value = "info")]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level());

    commands::handle_command(cli.command).await
}
