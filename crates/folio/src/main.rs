//! Folio CLI - personal publishing content pipeline.
//!
//! Provides commands for:
//! - `render`: Render one page for a locale
//! - `toc`: Print a page's table of contents
//! - `ingest`: Run the paste pipeline on a file
//! - `build`: Render every published page
//! - `preview`: Fetch link preview metadata for a URL

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, GlobalArgs, IngestArgs, PreviewArgs, RenderArgs, TocArgs};
use output::Output;

/// Folio - content pipeline for a multilingual blog.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a page after locale fallback.
    Render(RenderArgs),
    /// Print the table of contents of a page.
    Toc(TocArgs),
    /// Paste a file into an empty document and print the result.
    Ingest(IngestArgs),
    /// Render every published page into an output directory.
    Build(BuildArgs),
    /// Fetch link preview metadata.
    Preview(PreviewArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&cli.global),
        Commands::Toc(args) => args.execute(&cli.global),
        Commands::Ingest(args) => args.execute(&cli.global),
        Commands::Build(args) => args.execute(&cli.global),
        Commands::Preview(args) => args.execute(&cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
