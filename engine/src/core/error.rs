//! Cueline Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::captions::ParseError;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Subtitle Errors
    // =========================================================================
    #[error("Could not read subtitle file: {0}")]
    Parse(#[from] ParseError),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid store key: {0}")]
    InvalidStoreKey(String),

    // =========================================================================
    // Settings Errors
    // =========================================================================
    #[error("Settings error: {0}")]
    Settings(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Returns true if this error came from reading a malformed subtitle document
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
