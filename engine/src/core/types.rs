//! Cueline Core Type Definitions
//!
//! Defines fundamental types used throughout the project.

// =============================================================================
// ID Types
// =============================================================================

/// Cue identifier, assigned by whoever produced the cue (never generated here)
pub type CueId = String;

/// Key under which a saved-cue list is persisted (usually the subtitle file name)
pub type StoreKey = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Tolerance under which two times are treated as the same boundary.
///
/// Absorbs drift from repeated offset arithmetic.
pub const TIME_EPSILON: TimeSec = 0.000_001;

/// Returns true if `a` and `b` differ by less than [`TIME_EPSILON`]
pub fn float_equals(a: TimeSec, b: TimeSec) -> bool {
    float_equals_within(a, b, TIME_EPSILON)
}

/// Returns true if `a` and `b` differ by less than `epsilon`
pub fn float_equals_within(a: TimeSec, b: TimeSec, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Formats a playback position for display, e.g. `01:05:250` or `1:02:03:004`.
///
/// Hours are shown only when non-zero. The position is rounded to the
/// nearest millisecond before it is split into fields.
pub fn format_time_display(seconds: TimeSec, show_ms: bool) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };

    let total_ms = (seconds * 1000.0).round() as u64;

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let whole_secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}:", hours));
    }
    out.push_str(&format!("{:02}:{:02}", minutes, whole_secs));
    if show_ms {
        out.push_str(&format!(":{:03}", millis));
    }
    out
}
