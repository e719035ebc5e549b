//! JSON File Store
//!
//! Persists each key's cue list as `{dir}/{key}.json`.
//! Writes are atomic (temp file + rename) so a crash never leaves a
//! half-written list behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::CueStore;
use crate::core::captions::Cue;
use crate::core::{CoreError, CoreResult};

/// Validates that a store key is safe to use as a file name.
///
/// Rejects empty keys, the relative components `.` and `..`, separators
/// (`/`, `\`), drive indicators (`:`) and control characters.
pub fn validate_store_key(key: &str) -> CoreResult<()> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidStoreKey(
            "key is empty or contains only whitespace".to_string(),
        ));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(CoreError::InvalidStoreKey(format!(
            "{}: is a relative path component",
            key
        )));
    }
    if trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains(':')
    {
        return Err(CoreError::InvalidStoreKey(format!(
            "{}: contains path traversal characters",
            key
        )));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(CoreError::InvalidStoreKey(format!(
            "{:?}: contains control characters",
            key
        )));
    }
    Ok(())
}

/// One JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path for a key
    pub fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        validate_store_key(key)?;
        Ok(self.dir.join(format!("{}.json", key.trim())))
    }

    fn ensure_dir(&self) -> CoreResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                CoreError::Storage(format!(
                    "Failed to create store directory {}: {}",
                    self.dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

impl CueStore for JsonFileStore {
    fn retrieve(&self, key: &str) -> CoreResult<Vec<Cue>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            CoreError::Storage(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let cues: Vec<Cue> = serde_json::from_str(&content).map_err(|e| {
            CoreError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        debug!("Retrieved {} cue(s) from {}", cues.len(), path.display());
        Ok(cues)
    }

    fn store(&self, key: &str, cues: &[Cue]) -> CoreResult<()> {
        let path = self.path_for(key)?;
        self.ensure_dir()?;

        let temp_path = self.dir.join(format!(
            ".{}.json.tmp.{}",
            key.trim(),
            std::process::id()
        ));
        let content = serde_json::to_string_pretty(cues)?;

        fs::write(&temp_path, &content).map_err(|e| {
            CoreError::Storage(format!(
                "Failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CoreError::Storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        debug!("Stored {} cue(s) to {}", cues.len(), path.display());
        Ok(())
    }
}
