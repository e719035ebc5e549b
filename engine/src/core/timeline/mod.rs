//! Timeline Module
//!
//! The subtitle timeline: ordered cues, active-set tracking, retiming,
//! boundary navigation and saved flags.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Timeline                                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  model.rs      - TimelineModel (state + mutations + queries)    │
//! │  navigator.rs  - next/prev boundary projections                 │
//! │  events.rs     - per-instance observer registry                 │
//! │  queue.rs      - FIFO serializing requests from many producers  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod events;
mod model;
pub mod navigator;
mod queue;

pub use events::{SubscriptionId, Subscribers, TimelineSnapshot};
pub use model::{TimelineModel, TimelineRequest};
pub use queue::RecomputeQueue;
