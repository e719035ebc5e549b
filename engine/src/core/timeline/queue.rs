//! Recompute Queue
//!
//! Serializes state-affecting requests coming from several producers (a
//! periodic playback tick, a seek, a user retime) against one shared model.
//!
//! Requests are appended to a FIFO and drained by a single owner at a time:
//! - at most one request is applied to the model at once
//! - a caller submitting while another drain is running waits for it
//! - each request's notification is published only after the model lock is
//!   released, so subscribers may read the model from their callback
//!
//! Subscriber callbacks must not submit into the same queue; the drain lock
//! is held while they run.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{trace, warn};

use super::model::{TimelineModel, TimelineRequest};
use crate::core::TimeSec;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("{} lock poisoned, recovering", what);
        poisoned.into_inner()
    })
}

/// Single-owner FIFO of pending timeline requests
#[derive(Debug)]
pub struct RecomputeQueue {
    /// Shared model
    model: Arc<Mutex<TimelineModel>>,
    /// Requests waiting to be applied
    pending: Mutex<VecDeque<TimelineRequest>>,
    /// Held by whoever is currently draining
    drain: Mutex<()>,
    /// Total requests applied
    processed: AtomicU64,
}

impl RecomputeQueue {
    /// Wraps a model for serialized access
    pub fn new(model: TimelineModel) -> Self {
        Self::from_shared(Arc::new(Mutex::new(model)))
    }

    /// Wraps an already shared model
    pub fn from_shared(model: Arc<Mutex<TimelineModel>>) -> Self {
        Self {
            model,
            pending: Mutex::new(VecDeque::new()),
            drain: Mutex::new(()),
            processed: AtomicU64::new(0),
        }
    }

    /// Enqueues a request and returns once it has been applied and published
    pub fn submit(&self, request: TimelineRequest) {
        lock(&self.pending, "Pending queue").push_back(request);
        self.drain_pending();
    }

    /// Enqueues an active-set recomputation
    pub fn update_active(&self, current_time: TimeSec) {
        self.submit(TimelineRequest::UpdateActive { current_time });
    }

    /// Enqueues a retime
    pub fn retime(&self, offset: TimeSec, current_time: TimeSec) {
        self.submit(TimelineRequest::Retime {
            offset,
            current_time,
        });
    }

    fn drain_pending(&self) {
        let _drain = lock(&self.drain, "Drain");

        loop {
            let Some(request) = lock(&self.pending, "Pending queue").pop_front() else {
                break;
            };

            let published = {
                let mut model = lock(&self.model, "Timeline model");
                if model.apply_silently(&request) {
                    Some((model.subscribers(), model.snapshot()))
                } else {
                    None
                }
            };
            self.processed.fetch_add(1, Ordering::Relaxed);
            trace!("Applied queued request {:?}", request);

            if let Some((subscribers, snapshot)) = published {
                subscribers.publish(&snapshot);
            }
        }
    }

    /// Number of requests waiting to be applied
    pub fn pending_len(&self) -> usize {
        lock(&self.pending, "Pending queue").len()
    }

    /// Total requests applied since creation
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Runs `f` with shared read access to the model
    pub fn with_model<R>(&self, f: impl FnOnce(&TimelineModel) -> R) -> R {
        let model = lock(&self.model, "Timeline model");
        f(&model)
    }

    /// The shared model handle
    pub fn model(&self) -> Arc<Mutex<TimelineModel>> {
        Arc::clone(&self.model)
    }
}
