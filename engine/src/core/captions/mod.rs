//! Caption System Module
//!
//! Provides the cue data model and the SRT interchange codec:
//! - Cue data models (Cue, OriginalTime)
//! - SRT parsing and export
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs     - Data structures (Cue, OriginalTime)            │
//! │  formats.rs    - SRT parsing and export                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use cueline_lib::core::captions::{parse_srt, export_srt};
//!
//! let cues = parse_srt(&content)?;
//! let srt = export_srt(&cues);
//! ```

mod formats;
mod models;

// Re-export models
pub use models::{Cue, OriginalTime};

// Re-export format functions
pub use formats::{
    export_srt, format_srt_time, parse_srt, parse_srt_time, strip_formatting_tags, ParseError,
};
