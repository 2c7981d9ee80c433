//! RW CLI - Shortcode expansion engine.
//!
//! Provides commands for:
//! - `expand`: Expand shortcodes in a document

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ExpandArgs;
use error::CliError;
use output::Output;

/// RW - Shortcode expansion engine.
#[derive(Parser)]
#[command(name = "rw", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand shortcodes in a document.
    Expand(ExpandArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Expand(args) if args.verbose);

    // --verbose enables DEBUG level, otherwise use RUST_LOG (default WARN)
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Expand(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::from)
            .and_then(|rt| rt.block_on(args.execute())),
    };

    if let Err(err) = result {
        output.failure(&err);
        std::process::exit(1);
    }
}
