//! Collection Types
//!
//! Containers shared by the timeline and the saved-cue collection.

mod sorted_set;

pub use sorted_set::SortedSet;
