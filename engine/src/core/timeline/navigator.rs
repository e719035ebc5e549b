//! Cue Boundary Navigation
//!
//! Read-only projections of the ordered boundary list relative to a playback
//! cursor. Nothing is cached: each call scans the current cues, so results
//! can never be stale after a retime or reload.
//!
//! All functions expect `cues` ordered by start time.

use crate::core::captions::Cue;
use crate::core::{float_equals, TimeSec};

/// Start time of the first cue that begins after `current_time`.
///
/// A cue starting within [`crate::core::TIME_EPSILON`] of the cursor is the
/// one being played, not the next one.
pub fn next_boundary(cues: &[Cue], current_time: TimeSec) -> Option<TimeSec> {
    cues.iter()
        .find(|cue| starts_after(cue, current_time))
        .map(|cue| cue.start_time)
}

/// Start time of the cue before the current position.
///
/// Finds the first cue starting at or after the cursor (a start within
/// [`crate::core::TIME_EPSILON`] counts as at) and steps back one position,
/// or two when a cue is active so that the active cue's own start is not
/// reported as "previous". Returns `None` at the start of the timeline.
///
/// Assumes at most one active cue. With overlapping cues the extra step is
/// still a single position.
pub fn prev_boundary(cues: &[Cue], current_time: TimeSec) -> Option<TimeSec> {
    if cues.is_empty() {
        return None;
    }

    let next_index = cues
        .iter()
        .position(|cue| {
            cue.start_time > current_time || float_equals(cue.start_time, current_time)
        })
        .unwrap_or(cues.len());
    let steps_back = if cues.iter().any(|cue| cue.active) { 2 } else { 1 };

    next_index
        .checked_sub(steps_back)
        .map(|index| cues[index].start_time)
}

/// The last cue starting at or before `current_time`, or the first cue when
/// the cursor precedes every cue.
pub fn current_cue(cues: &[Cue], current_time: TimeSec) -> Option<&Cue> {
    let started = cues
        .iter()
        .take_while(|cue| cue.start_time <= current_time)
        .count();
    cues.get(started.saturating_sub(1))
}

fn starts_after(cue: &Cue, current_time: TimeSec) -> bool {
    cue.start_time > current_time && !float_equals(cue.start_time, current_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cues(times: &[(f64, f64)]) -> Vec<Cue> {
        times
            .iter()
            .enumerate()
            .map(|(i, (s, e))| Cue::new(&(i + 1).to_string(), *s, *e, "text"))
            .collect()
    }

    fn mark_active(cues: &mut [Cue], t: f64) {
        for cue in cues.iter_mut() {
            cue.active = cue.contains_time(t);
        }
    }

    #[test]
    fn test_empty_timeline_returns_none() {
        assert_eq!(next_boundary(&[], 1.0), None);
        assert_eq!(prev_boundary(&[], 1.0), None);
        assert!(current_cue(&[], 1.0).is_none());
    }

    #[test]
    fn test_next_boundary() {
        let list = cues(&[(1.0, 2.5), (3.0, 4.0), (5.0, 6.0)]);
        assert_eq!(next_boundary(&list, 0.0), Some(1.0));
        assert_eq!(next_boundary(&list, 1.5), Some(3.0));
        assert_eq!(next_boundary(&list, 4.5), Some(5.0));
        assert_eq!(next_boundary(&list, 5.0), None);
        assert_eq!(next_boundary(&list, 7.0), None);
    }

    #[test]
    fn test_next_boundary_skips_start_within_tolerance() {
        let list = cues(&[(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(next_boundary(&list, 1.0 - 0.000_000_5), Some(3.0));
        assert_eq!(next_boundary(&list, 3.0 + 0.000_000_1), None);
    }

    #[test]
    fn test_next_boundary_always_after_cursor() {
        let list = cues(&[(0.5, 1.0), (1.0, 1.5), (2.25, 3.0), (4.0, 5.0)]);
        for step in 0..60 {
            let t = step as f64 * 0.1;
            if let Some(next) = next_boundary(&list, t) {
                assert!(next > t && !float_equals(next, t), "t={} next={}", t, next);
            }
        }
    }

    #[test]
    fn test_prev_boundary_without_active_cue() {
        let list = cues(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
        // In the gap between the second and third cue.
        assert_eq!(prev_boundary(&list, 4.5), Some(3.0));
        assert_eq!(prev_boundary(&list, 2.5), Some(1.0));
        assert_eq!(prev_boundary(&list, 0.5), None);
    }

    #[test]
    fn test_prev_boundary_skips_active_cue() {
        let mut list = cues(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
        mark_active(&mut list, 3.5);
        assert_eq!(prev_boundary(&list, 3.5), Some(1.0));

        mark_active(&mut list, 1.5);
        assert_eq!(prev_boundary(&list, 1.5), None);
    }

    #[test]
    fn test_prev_boundary_at_exact_start() {
        let mut list = cues(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);

        mark_active(&mut list, 5.0);
        assert_eq!(prev_boundary(&list, 5.0), Some(1.0));

        mark_active(&mut list, 3.0);
        assert_eq!(prev_boundary(&list, 3.0), None);

        // Drift from offset arithmetic still counts as the same start.
        let drifted = 5.0 + 0.000_000_1;
        mark_active(&mut list, drifted);
        assert_eq!(prev_boundary(&list, drifted), Some(1.0));
    }

    #[test]
    fn test_prev_boundary_at_exact_start_of_inactive_cue() {
        // Zero-length cue: never active, so only one step back.
        let list = cues(&[(1.0, 2.0), (3.0, 3.0)]);
        assert_eq!(prev_boundary(&list, 3.0), Some(1.0));
    }

    #[test]
    fn test_prev_boundary_after_last_cue() {
        let mut list = cues(&[(1.0, 2.0), (3.0, 4.0)]);
        mark_active(&mut list, 10.0);
        assert_eq!(prev_boundary(&list, 10.0), Some(3.0));

        mark_active(&mut list, 3.5);
        assert_eq!(prev_boundary(&list, 3.5), Some(1.0));
    }

    #[test]
    fn test_prev_boundary_overlapping_cues_steps_back_once_more() {
        // Both cues are active at 2.5; the heuristic still steps back two
        // positions from the next start, landing on the first cue.
        let mut list = cues(&[(1.0, 3.0), (2.0, 4.0), (6.0, 7.0)]);
        mark_active(&mut list, 2.5);
        assert_eq!(prev_boundary(&list, 2.5), Some(1.0));
    }

    #[test]
    fn test_current_cue() {
        let list = cues(&[(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(current_cue(&list, 0.0).map(|c| c.id.as_str()), Some("1"));
        assert_eq!(current_cue(&list, 1.0).map(|c| c.id.as_str()), Some("1"));
        assert_eq!(current_cue(&list, 2.5).map(|c| c.id.as_str()), Some("1"));
        assert_eq!(current_cue(&list, 3.0).map(|c| c.id.as_str()), Some("2"));
        assert_eq!(current_cue(&list, 99.0).map(|c| c.id.as_str()), Some("2"));
    }
}
