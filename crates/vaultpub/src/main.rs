//! vaultpub CLI - Obsidian vault publishing to Confluence.
//!
//! Provides commands for:
//! - `publish`: Publish notes as Confluence pages mirroring the vault folders
//! - `render`: Print the Confluence storage markup of a note

mod commands;
mod error;
mod frontmatter;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PublishArgs, RenderArgs};
use output::Output;

/// vaultpub - Obsidian to Confluence publisher.
#[derive(Parser)]
#[command(name = "vaultpub", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish notes to Confluence.
    Publish(PublishArgs),
    /// Convert a note to storage markup without publishing.
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(),
        Commands::Render(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
