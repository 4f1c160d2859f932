//! Development tasks for the combat engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo run -p xtask -- <command>`

mod commands;
mod utils;

use anyhow::Result;
use clap::Parser;
use commands::{CheckCatalog, ListPowers, Simulate};
use tracing_subscriber::EnvFilter;

/// Development tasks for the combat engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for combat content", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load and validate a content directory
    CheckCatalog(CheckCatalog),

    /// List the powers of a content set
    ListPowers(ListPowers),

    /// Resolve one power against a sandbox target and print the results
    Simulate(Simulate),
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean; RUST_LOG overrides the level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::CheckCatalog(cmd) => cmd.execute(),
        Command::ListPowers(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
    }
}
