//! Cueline CLI
//!
//! Command-line front end for the subtitle timeline engine. The CLI is the
//! engine's file-handling collaborator: it reads and writes SRT files and
//! persists saved cues, while all timeline logic stays in the library.

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::debug;

use commands::Context;

/// Inspect, retime and export SRT subtitle timelines
#[derive(Debug, Parser)]
#[command(name = "cueline", version, about)]
pub struct Cli {
    /// Directory holding settings.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub settings_dir: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a subtitle file and report how many cues it holds
    Check {
        /// SRT file to read
        file: PathBuf,
    },
    /// Shift every cue by an offset and write the result
    Shift {
        /// SRT file to read
        file: PathBuf,
        /// Offset in seconds (may be negative)
        #[arg(long, allow_hyphen_values = true)]
        offset: f64,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the cues active at a playback time
    Active {
        /// SRT file to read
        file: PathBuf,
        /// Playback time in seconds
        #[arg(long)]
        at: f64,
    },
    /// Print the start of the next cue after a playback time
    Next {
        /// SRT file to read
        file: PathBuf,
        /// Playback time in seconds
        #[arg(long)]
        at: f64,
    },
    /// Print the start of the previous cue before a playback time
    Prev {
        /// SRT file to read
        file: PathBuf,
        /// Playback time in seconds
        #[arg(long)]
        at: f64,
    },
    /// Flag cues as saved and persist them
    Save {
        /// SRT file to read
        file: PathBuf,
        /// Ids of the cues to save
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
        /// Store key (defaults to the file name)
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove cues from the saved set
    Unsave {
        /// Store key
        #[arg(long)]
        key: String,
        /// Ids of the cues to remove
        #[arg(long = "id", required = true)]
        ids: Vec<String>,
    },
    /// Write the saved cues for a key as SRT
    ExportSaved {
        /// Store key
        #[arg(long)]
        key: String,
        /// Output file (defaults to the configured export file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(default_level.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    // Avoid panics if already initialized.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Parsed arguments: {:?}", cli);

    let ctx = Context::new(cli.settings_dir.as_deref(), cli.json);
    match commands::run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
