//! Timeline Model
//!
//! The authoritative in-memory state of a subtitle session: the ordered cue
//! list, the active set at the last known playback time, the as-loaded
//! timing snapshots used for retiming, and the saved flags.
//!
//! Every mutating operation publishes a [`TimelineSnapshot`] to the model's
//! subscribers. Queries are pure and recompute from the current cues.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::events::{SubscriptionId, Subscribers, TimelineSnapshot};
use super::navigator;
use crate::core::captions::{export_srt, Cue, OriginalTime};
use crate::core::{CueId, TimeSec};

// =============================================================================
// Requests
// =============================================================================

/// A state-affecting operation, as queued by [`super::RecomputeQueue`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum TimelineRequest {
    /// Recompute the active set at `current_time`
    #[serde(rename_all = "camelCase")]
    UpdateActive { current_time: TimeSec },
    /// Shift every cue by `offset` from its original timing
    #[serde(rename_all = "camelCase")]
    Retime {
        offset: TimeSec,
        current_time: TimeSec,
    },
    /// Flag a cue saved
    Save { id: CueId },
    /// Clear a cue's saved flag
    Unsave { id: CueId },
    /// Flag every listed cue saved
    SaveBatch { cues: Vec<Cue> },
}

// =============================================================================
// Timeline Model
// =============================================================================

/// Ordered cue collection with active-set, retime and saved-state tracking
#[derive(Debug)]
pub struct TimelineModel {
    /// Cues ordered by start time at load
    cues: Vec<Cue>,
    /// Cue id -> position in `cues`
    positions: HashMap<CueId, usize>,
    /// As-loaded timing per cue id
    original_times: HashMap<CueId, OriginalTime>,
    /// Change observers
    subscribers: Arc<Subscribers<TimelineSnapshot>>,
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineModel {
    /// Creates an empty timeline
    pub fn new() -> Self {
        Self {
            cues: Vec::new(),
            positions: HashMap::new(),
            original_times: HashMap::new(),
            subscribers: Arc::new(Subscribers::new()),
        }
    }

    /// Creates a timeline from an initial cue list
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        let mut model = Self::new();
        model.load(cues);
        model
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Registers a callback called with the full state after every change
    pub fn subscribe(
        &self,
        callback: impl Fn(&TimelineSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Removes a registration. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// The model's observer registry
    pub fn subscribers(&self) -> Arc<Subscribers<TimelineSnapshot>> {
        Arc::clone(&self.subscribers)
    }

    /// Full copy of the current state
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot::from_cues(&self.cues)
    }

    fn notify_change(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers.publish(&self.snapshot());
    }

    // -------------------------------------------------------------------------
    // State-affecting Operations
    // -------------------------------------------------------------------------

    /// Replaces the cue list.
    ///
    /// Cues are copied into the model, sorted by start time, and each gets an
    /// original-time snapshot. Duplicate ids keep their first occurrence.
    pub fn load(&mut self, cues: Vec<Cue>) {
        self.load_silently(cues);
        self.notify_change();
    }

    fn load_silently(&mut self, cues: Vec<Cue>) {
        let total = cues.len();
        let mut seen = std::collections::HashSet::with_capacity(total);
        let mut loaded: Vec<Cue> = Vec::with_capacity(total);

        for mut cue in cues {
            if !seen.insert(cue.id.clone()) {
                warn!("Dropping cue with duplicate id '{}'", cue.id);
                continue;
            }
            cue.active = false;
            loaded.push(cue);
        }

        loaded.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        self.original_times = loaded
            .iter()
            .map(|cue| (cue.id.clone(), cue.timing()))
            .collect();
        self.cues = loaded;
        self.rebuild_positions();

        info!("Loaded {} cue(s) into timeline", self.cues.len());
    }

    /// Adds a single cue after load at its sorted position.
    ///
    /// The cue gets no original-time snapshot, so [`Self::retime`] leaves it
    /// untouched. Returns false if a cue with the same id exists.
    pub fn insert(&mut self, mut cue: Cue) -> bool {
        if self.positions.contains_key(&cue.id) {
            debug!("Cue '{}' already in timeline, not inserting", cue.id);
            return false;
        }

        cue.active = false;
        let index = self
            .cues
            .partition_point(|existing| existing.start_time <= cue.start_time);
        self.cues.insert(index, cue);
        self.rebuild_positions();
        self.notify_change();
        true
    }

    fn rebuild_positions(&mut self) {
        self.positions = self
            .cues
            .iter()
            .enumerate()
            .map(|(index, cue)| (cue.id.clone(), index))
            .collect();
    }

    /// Recomputes `active` for every cue: `start <= current_time < end`
    pub fn update_active(&mut self, current_time: TimeSec) {
        self.update_active_silently(current_time);
        self.notify_change();
    }

    fn update_active_silently(&mut self, current_time: TimeSec) {
        for cue in &mut self.cues {
            cue.active = cue.contains_time(current_time);
        }
    }

    /// Shifts every snapshotted cue to its original timing plus `offset`,
    /// then recomputes the active set at `current_time`.
    ///
    /// Always relative to the as-loaded timing, so `retime(0.0, t)` restores
    /// the original exactly. Cues are not re-sorted; a uniform offset keeps
    /// their relative order.
    pub fn retime(&mut self, offset: TimeSec, current_time: TimeSec) {
        self.retime_silently(offset, current_time);
        self.notify_change();
    }

    fn retime_silently(&mut self, offset: TimeSec, current_time: TimeSec) {
        let mut shifted = 0usize;
        for cue in &mut self.cues {
            let Some(original) = self.original_times.get(&cue.id) else {
                continue;
            };
            let timing = original.shifted(offset);
            cue.start_time = timing.start_time;
            cue.end_time = timing.end_time;
            shifted += 1;
        }

        debug!(
            "Retimed {} of {} cue(s) by {:.3}s",
            shifted,
            self.cues.len(),
            offset
        );
        self.update_active_silently(current_time);
    }

    /// Flags the cue with `cue.id` saved. Unknown ids are ignored.
    pub fn save(&mut self, cue: &Cue) {
        self.set_saved(&cue.id, true);
        self.notify_change();
    }

    /// Clears the saved flag of the cue with `cue.id`. Unknown ids are ignored.
    pub fn unsave(&mut self, cue: &Cue) {
        self.set_saved(&cue.id, false);
        self.notify_change();
    }

    fn set_saved(&mut self, id: &str, saved: bool) -> bool {
        match self.positions.get(id) {
            Some(&index) => {
                self.cues[index].saved = saved;
                true
            }
            None => {
                debug!("Cue '{}' not in timeline, saved flag unchanged", id);
                false
            }
        }
    }

    /// Flags every listed cue that exists in the timeline as saved.
    ///
    /// Cues not already present are not added. An empty list is a no-op and
    /// publishes nothing.
    pub fn save_batch(&mut self, cues: &[Cue]) {
        if cues.is_empty() {
            return;
        }
        self.save_batch_silently(cues);
        self.notify_change();
    }

    fn save_batch_silently(&mut self, cues: &[Cue]) {
        let matched = cues
            .iter()
            .filter(|cue| self.set_saved(&cue.id, true))
            .count();
        debug!("Batch-saved {} of {} cue(s)", matched, cues.len());
    }

    /// Flags every active cue saved and returns copies of them
    pub fn save_active(&mut self) -> Vec<Cue> {
        let mut newly_saved = Vec::new();
        for cue in &mut self.cues {
            if cue.active {
                cue.saved = true;
                newly_saved.push(cue.clone());
            }
        }
        self.notify_change();
        newly_saved
    }

    /// Applies a request and publishes the change
    pub fn apply(&mut self, request: &TimelineRequest) {
        if self.apply_silently(request) {
            self.notify_change();
        }
    }

    /// Applies a request without publishing.
    ///
    /// Returns false when the request is a no-op that would not notify
    /// (an empty batch).
    pub(crate) fn apply_silently(&mut self, request: &TimelineRequest) -> bool {
        match request {
            TimelineRequest::UpdateActive { current_time } => {
                self.update_active_silently(*current_time)
            }
            TimelineRequest::Retime {
                offset,
                current_time,
            } => self.retime_silently(*offset, *current_time),
            TimelineRequest::Save { id } => {
                self.set_saved(id, true);
            }
            TimelineRequest::Unsave { id } => {
                self.set_saved(id, false);
            }
            TimelineRequest::SaveBatch { cues } => {
                if cues.is_empty() {
                    return false;
                }
                self.save_batch_silently(cues);
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Start of the next cue strictly after `current_time`
    pub fn next_sub_time(&self, current_time: TimeSec) -> Option<TimeSec> {
        navigator::next_boundary(&self.cues, current_time)
    }

    /// Start of the previous cue relative to `current_time`
    pub fn prev_sub_time(&self, current_time: TimeSec) -> Option<TimeSec> {
        navigator::prev_boundary(&self.cues, current_time)
    }

    /// The cue most recently started at `current_time`
    pub fn current_cue(&self, current_time: TimeSec) -> Option<&Cue> {
        navigator::current_cue(&self.cues, current_time)
    }

    /// All cues in timeline order
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Returns true if the timeline has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Looks up a cue by id
    pub fn get(&self, id: &str) -> Option<&Cue> {
        self.positions.get(id).map(|&index| &self.cues[index])
    }

    /// Cues active at the last recomputation
    pub fn active_cues(&self) -> Vec<&Cue> {
        self.cues.iter().filter(|cue| cue.active).collect()
    }

    /// Ids of cues active at the last recomputation
    pub fn active_ids(&self) -> Vec<CueId> {
        self.cues
            .iter()
            .filter(|cue| cue.active)
            .map(|cue| cue.id.clone())
            .collect()
    }

    /// Saved cues in timeline order
    pub fn saved_cues(&self) -> Vec<&Cue> {
        self.cues.iter().filter(|cue| cue.saved).collect()
    }

    /// Number of saved cues
    pub fn saved_count(&self) -> usize {
        self.cues.iter().filter(|cue| cue.saved).count()
    }

    /// As-loaded timing of a cue, if it was part of a load
    pub fn original_time(&self, id: &str) -> Option<OriginalTime> {
        self.original_times.get(id).copied()
    }

    /// Saved cues serialized as SRT, in timeline order
    pub fn export_saved(&self) -> String {
        let saved: Vec<Cue> = self.cues.iter().filter(|c| c.saved).cloned().collect();
        export_srt(&saved)
    }

    /// Every cue serialized as SRT, with current (retimed) timing
    pub fn export_all(&self) -> String {
        export_srt(&self.cues)
    }
}

// =============================================================================
// Tests
// =============================================================================
