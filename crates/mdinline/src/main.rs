//! mdinline CLI - self-contained Markdown for pasting anywhere.
//!
//! Provides commands for:
//! - `copy`: Inline a document's images and diagrams and copy it to the clipboard
//! - `convert`: Same conversion, written to stdout
//! - `check`: Report `**bold**` runs that touch surrounding text

mod clipboard;
mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ConvertArgs, CopyArgs};
use output::Output;

/// mdinline - inline Markdown images and diagrams.
#[derive(Parser)]
#[command(name = "mdinline", version, about)]
struct Cli {
    /// Enable verbose output (conversion progress logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document and copy the result to the clipboard.
    Copy(CopyArgs),
    /// Convert a document and print the result to stdout.
    Convert(ConvertArgs),
    /// Check bold markers for missing spacing.
    Check(CheckArgs),
    /// Keep serving copied text on the clipboard (started by `copy`).
    #[cfg(target_os = "linux")]
    #[command(name = clipboard::HOLD_COMMAND, hide = true)]
    HoldClipboard,
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
        Commands::Copy(args) => args.execute(),
        Commands::Convert(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        #[cfg(target_os = "linux")]
        Commands::HoldClipboard => clipboard::hold_clipboard().map_err(Into::into),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
