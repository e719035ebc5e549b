//! Cueline Core Library
//!
//! Subtitle timeline engine. This library owns the ordered cue list of a
//! subtitle session, tracks which cues are active at a playback time,
//! retimes cues relative to their as-loaded timing, navigates between cue
//! boundaries, and converts cues to and from the SRT interchange format.
//!
//! The library never touches media or the UI. Cues come in as plain data,
//! state changes go out as notifications, and persistence goes through an
//! injected [`core::storage::CueStore`].

pub mod core;
