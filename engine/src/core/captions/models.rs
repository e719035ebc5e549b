//! Cue Data Models
//!
//! Defines the timed text entry the whole engine revolves around.

use serde::{Deserialize, Serialize};

use crate::core::{CueId, TimeSec};

// =============================================================================
// Cue
// =============================================================================

/// A single timed subtitle entry.
///
/// `active` is derived from the playback cursor and recomputed by the
/// timeline; `saved` changes only through explicit save/unsave calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    /// Identifier assigned by the cue source, preserved verbatim
    pub id: CueId,
    /// Start time in seconds
    pub start_time: TimeSec,
    /// End time in seconds (exclusive)
    pub end_time: TimeSec,
    /// Plain text, markup already stripped
    pub text: String,
    /// Whether the playback cursor is inside `[start_time, end_time)`
    #[serde(default)]
    pub active: bool,
    /// Whether the cue has been flagged for export/persistence
    #[serde(default)]
    pub saved: bool,
}

impl Cue {
    /// Creates an inactive, unsaved cue
    pub fn new(id: &str, start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self {
            id: id.to_string(),
            start_time,
            end_time,
            text: text.to_string(),
            active: false,
            saved: false,
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_time - self.start_time
    }

    /// Returns true if `time` falls in `[start_time, end_time)`
    pub fn contains_time(&self, time: TimeSec) -> bool {
        time >= self.start_time && time < self.end_time
    }

    /// Returns the current timing as a snapshot
    pub fn timing(&self) -> OriginalTime {
        OriginalTime {
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

// =============================================================================
// Original Time
// =============================================================================

/// As-loaded timing of a cue, the reference frame for every retime
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalTime {
    pub start_time: TimeSec,
    pub end_time: TimeSec,
}

impl OriginalTime {
    /// Returns this timing shifted by `offset` seconds
    pub fn shifted(&self, offset: TimeSec) -> Self {
        Self {
            start_time: self.start_time + offset,
            end_time: self.end_time + offset,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
