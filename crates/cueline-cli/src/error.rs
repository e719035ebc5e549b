//! CLI error types

use std::path::PathBuf;

use thiserror::Error;

/// Failures the CLI reports with a dedicated message
#[derive(Error, Debug)]
pub enum CliError {
    #[error("could not read subtitle file {path}: {reason}")]
    UnreadableSubtitleFile { path: PathBuf, reason: String },

    #[error("offset {offset}s exceeds the configured maximum of {max}s")]
    OffsetOutOfRange { offset: f64, max: f64 },

    #[error("invalid playback time: {0}")]
    InvalidTime(f64),

    #[error("no store key given and {0} has no file name")]
    MissingStoreKey(PathBuf),
}
