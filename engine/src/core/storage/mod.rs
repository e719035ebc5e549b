//! Cue Persistence
//!
//! The engine is storage-agnostic: saved cues go through the small
//! [`CueStore`] capability, keyed by an opaque identifier (usually the
//! subtitle file name).
//!
//! Two implementations are provided:
//! - [`MemoryStore`] keeps lists in a map (tests, embedding)
//! - [`JsonFileStore`] writes one JSON file per key

mod json;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::captions::Cue;
use crate::core::{CoreError, CoreResult};

pub use json::{validate_store_key, JsonFileStore};

// =============================================================================
// Store Trait
// =============================================================================

/// Synchronous key -> cue list persistence
pub trait CueStore: Send + Sync {
    /// Returns the cues stored under `key`, or an empty list if none
    fn retrieve(&self, key: &str) -> CoreResult<Vec<Cue>>;

    /// Replaces whatever is stored under `key`
    fn store(&self, key: &str, cues: &[Cue]) -> CoreResult<()>;
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<Cue>>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with stored lists
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CueStore for MemoryStore {
    fn retrieve(&self, key: &str) -> CoreResult<Vec<Cue>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned().unwrap_or_default())
    }

    fn store(&self, key: &str, cues: &[Cue]) -> CoreResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), cues.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(store.retrieve("movie.srt").unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_replaces_list() {
        let store = MemoryStore::new();
        store
            .store("movie.srt", &[Cue::new("1", 0.0, 1.0, "a"), Cue::new("2", 1.0, 2.0, "b")])
            .unwrap();
        store.store("movie.srt", &[Cue::new("3", 2.0, 3.0, "c")]).unwrap();

        let cues = store.retrieve("movie.srt").unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].id, "3");
        assert_eq!(store.len(), 1);
    }
}
