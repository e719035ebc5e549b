//! Change Notification Module
//!
//! Per-instance observer registry. Every mutating operation publishes the
//! full current state; subscribers re-read it instead of receiving a diff.
//! There is no global bus: a registry lives and dies with its owner.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::core::captions::Cue;
use crate::core::CueId;

// =============================================================================
// Event Payloads
// =============================================================================

/// Registration handle returned by `subscribe`
pub type SubscriptionId = u64;

/// Full timeline state delivered after every change
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSnapshot {
    /// All cues in timeline order
    pub cues: Vec<Cue>,
    /// Ids of cues active at the last recomputation
    pub active_ids: Vec<CueId>,
    /// Number of cues flagged saved
    pub saved_count: usize,
}

impl TimelineSnapshot {
    /// Builds a snapshot from a cue slice
    pub fn from_cues(cues: &[Cue]) -> Self {
        Self {
            cues: cues.to_vec(),
            active_ids: cues
                .iter()
                .filter(|c| c.active)
                .map(|c| c.id.clone())
                .collect(),
            saved_count: cues.iter().filter(|c| c.saved).count(),
        }
    }
}

// =============================================================================
// Subscribers
// =============================================================================

type Callback<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Observer registry keyed by subscription id, in registration order
pub struct Subscribers<S> {
    next_id: AtomicU64,
    callbacks: Mutex<BTreeMap<SubscriptionId, Callback<S>>>,
}

impl<S> Default for Subscribers<S> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<S> Subscribers<S> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn callbacks(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Callback<S>>> {
        self.callbacks.lock().unwrap_or_else(|poisoned| {
            warn!("Subscriber registry lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Registers `callback`; it is called with the full state after every change
    pub fn subscribe(&self, callback: impl Fn(&S) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks().insert(id, Arc::new(callback));
        id
    }

    /// Removes a registration. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks().remove(&id).is_some()
    }

    /// Returns true if `id` is registered
    pub fn is_registered(&self, id: SubscriptionId) -> bool {
        self.callbacks().contains_key(&id)
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.callbacks().len()
    }

    /// Returns true if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.callbacks().is_empty()
    }

    /// Calls every registered callback with `state`.
    ///
    /// Callbacks run outside the registry lock, so they may subscribe or
    /// unsubscribe while being notified.
    pub fn publish(&self, state: &S) {
        let callbacks: Vec<Callback<S>> = self.callbacks().values().cloned().collect();
        trace!("Publishing change to {} subscriber(s)", callbacks.len());
        for callback in callbacks {
            callback(state);
        }
    }
}

impl<S> Subscribers<S>
where
    S: Clone + Send + 'static,
{
    /// Bridges this registry onto a tokio broadcast channel.
    ///
    /// Returns the subscription backing the bridge and a first receiver.
    /// Lagging receivers lose the oldest states, which is harmless because
    /// each state is complete.
    pub fn broadcast(&self, capacity: usize) -> (SubscriptionId, broadcast::Receiver<S>) {
        let (tx, rx) = broadcast::channel(capacity.max(1));
        let id = self.subscribe(move |state: &S| {
            // No receivers left is not an error for the publisher.
            let _ = tx.send(state.clone());
        });
        (id, rx)
    }
}

impl<S> std::fmt::Debug for Subscribers<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_subscribe_and_publish() {
        let subs: Subscribers<u32> = Subscribers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let id = subs.subscribe(move |v: &u32| sink.lock().unwrap().push(*v));
        assert!(subs.is_registered(id));

        subs.publish(&1);
        subs.publish(&2);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let subs: Subscribers<u32> = Subscribers::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        let id = subs.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        subs.publish(&0);
        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        subs.publish(&0);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(subs.is_empty());
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let subs: Subscribers<()> = Subscribers::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let o = order.clone();
            subs.subscribe(move |_| o.lock().unwrap().push(n));
        }
        subs.publish(&());

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_callback_may_unsubscribe_itself() {
        let subs: Arc<Subscribers<()>> = Arc::new(Subscribers::new());
        let id_cell = Arc::new(Mutex::new(None));

        let registry = subs.clone();
        let cell = id_cell.clone();
        let id = subs.subscribe(move |_| {
            if let Some(id) = *cell.lock().unwrap() {
                registry.unsubscribe(id);
            }
        });
        *id_cell.lock().unwrap() = Some(id);

        subs.publish(&());
        assert!(!subs.is_registered(id));
    }

    #[test]
    fn test_snapshot_from_cues() {
        let mut a = Cue::new("a", 0.0, 1.0, "A");
        a.active = true;
        let mut b = Cue::new("b", 1.0, 2.0, "B");
        b.saved = true;

        let snapshot = TimelineSnapshot::from_cues(&[a, b]);
        assert_eq!(snapshot.cues.len(), 2);
        assert_eq!(snapshot.active_ids, vec!["a".to_string()]);
        assert_eq!(snapshot.saved_count, 1);
    }

    #[tokio::test]
    async fn test_broadcast_bridge_delivers_states() {
        let subs: Subscribers<String> = Subscribers::new();
        let (id, mut rx) = subs.broadcast(8);

        subs.publish(&"first".to_string());
        subs.publish(&"second".to_string());

        assert_eq!(rx.recv().await.unwrap(), "first");
        assert_eq!(rx.recv().await.unwrap(), "second");

        assert!(subs.unsubscribe(id));
        subs.publish(&"dropped".to_string());
        assert!(rx.try_recv().is_err());
    }
}
