//! Saved Cue Collection
//!
//! The subset of cues a user has flagged for export, held separately from
//! the full timeline and kept ordered by start time. Every change is written
//! through to the injected [`CueStore`] under the current key; a change the
//! store rejects is not applied and not published.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::captions::{export_srt, Cue};
use crate::core::collections::SortedSet;
use crate::core::storage::CueStore;
use crate::core::timeline::{SubscriptionId, Subscribers};
use crate::core::{CoreResult, CueId};

/// Ordered, persisted set of saved cues
pub struct SavedCues {
    cues: SortedSet<Cue, CueId>,
    store: Arc<dyn CueStore>,
    key: Option<String>,
    subscribers: Subscribers<Vec<Cue>>,
}

impl SavedCues {
    /// Creates an empty collection backed by `store`
    pub fn new(store: Arc<dyn CueStore>) -> Self {
        Self {
            cues: SortedSet::new(|cue: &Cue| cue.id.clone(), |cue: &Cue| cue.start_time),
            store,
            key: None,
            subscribers: Subscribers::new(),
        }
    }

    /// Switches to `key` and loads whatever is stored under it.
    ///
    /// The collection is cleared first, so a failed read leaves it empty.
    pub fn retrieve(&mut self, key: &str) -> CoreResult<()> {
        self.cues.clear();
        self.key = Some(key.to_string());
        self.notify_change();

        let stored = self.store.retrieve(key)?;
        for mut cue in stored {
            cue.active = false;
            cue.saved = true;
            self.cues.add(cue);
        }

        info!("Retrieved {} saved cue(s) for '{}'", self.cues.len(), key);
        self.notify_change();
        Ok(())
    }

    /// Adds `cue` and persists. Already-saved ids are left as they are.
    pub fn save(&mut self, cue: &Cue) -> CoreResult<()> {
        if self.cues.has(cue) {
            return Ok(());
        }

        let mut saved = cue.clone();
        saved.active = false;
        saved.saved = true;
        self.cues.add(saved);

        if let Err(e) = self.write_through(self.cues.items()) {
            self.cues.delete(cue);
            warn!("Saving cue '{}' failed, not kept: {}", cue.id, e);
            return Err(e);
        }
        self.notify_change();
        Ok(())
    }

    /// Removes the cue with `cue.id` and persists. Unknown ids are a no-op.
    pub fn delete(&mut self, cue: &Cue) -> CoreResult<()> {
        if !self.cues.has(cue) {
            return Ok(());
        }

        let remaining: Vec<Cue> = self
            .cues
            .iter()
            .filter(|saved| saved.id != cue.id)
            .cloned()
            .collect();
        self.write_through(&remaining)?;

        self.cues.delete(cue);
        self.notify_change();
        Ok(())
    }

    fn write_through(&self, cues: &[Cue]) -> CoreResult<()> {
        match &self.key {
            Some(key) => self.store.store(key, cues),
            None => {
                debug!("No store key selected, saved cues not persisted");
                Ok(())
            }
        }
    }

    /// Returns true if a cue with `cue.id` is saved
    pub fn has(&self, cue: &Cue) -> bool {
        self.cues.has(cue)
    }

    /// Saved cues ordered by start time
    pub fn items(&self) -> &[Cue] {
        self.cues.items()
    }

    /// Number of saved cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Returns true if nothing is saved
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// The store key currently in use
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Saved cues serialized as SRT
    pub fn export_srt(&self) -> String {
        export_srt(self.cues.items())
    }

    /// Registers a callback called with the saved list after every change
    pub fn subscribe(&self, callback: impl Fn(&Vec<Cue>) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Removes a registration
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn notify_change(&self) {
        if !self.subscribers.is_empty() {
            self.subscribers.publish(&self.cues.to_vec());
        }
    }
}

impl std::fmt::Debug for SavedCues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedCues")
            .field("key", &self.key)
            .field("cues", &self.cues)
            .finish_non_exhaustive()
    }
}
