//! BFBC2 Toolkit CLI - command-line front end for the toolkit operations

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use clap::Parser;
use commands::{Commands, ConfigFile};

#[derive(Parser)]
#[command(name = "bfbc2-toolkit")]
#[command(about = "BFBC2 Toolkit: Battlefield: Bad Company 2 archive and DBX tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the one in the user's config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Run the BFBC2 Toolkit CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    cli.command.execute(&ConfigFile(cli.config))?;

    Ok(())
}
