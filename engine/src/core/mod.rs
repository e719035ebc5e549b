//! Cueline Core Engine
//!
//! Core subtitle engine module.
//! Handles cue containers, the SRT codec, the timeline model, the saved-cue
//! collection, persistence adapters and settings.

pub mod captions;
pub mod collections;
pub mod saved;
pub mod settings;
pub mod storage;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
