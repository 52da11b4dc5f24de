//! Entry Registry
//!
//! Per-source state owned exclusively by the relay loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::models::Entry;

/// In-memory record of an entry plus the last mtime recorded for its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceState {
    /// The configured pair
    pub entry: Entry,
    /// Baseline against which destination mtimes are compared
    pub last_source_mtime: SystemTime,
}

impl SourceState {
    /// Create a new source state
    pub fn new(entry: Entry, last_source_mtime: SystemTime) -> Self {
        Self {
            entry,
            last_source_mtime,
        }
    }
}

/// Mapping from configured source path to its state.
///
/// Filled once at startup; keys never change afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    states: HashMap<PathBuf, SourceState>,
    /// Canonical source path -> configured key
    aliases: HashMap<PathBuf, PathBuf>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the state for an entry, keyed by its source path
    pub fn insert(&mut self, state: SourceState) {
        let key = state.entry.src.clone();
        if let Ok(canonical) = key.canonicalize() {
            if canonical != key {
                self.aliases.insert(canonical, key.clone());
            }
        }
        self.states.insert(key, state);
    }

    /// Resolve a reported path to the configured key it belongs to.
    ///
    /// Exact match first, then the canonical form of `path`.
    pub fn resolve(&self, path: &Path) -> Option<&Path> {
        if let Some((key, _)) = self.states.get_key_value(path) {
            return Some(key.as_path());
        }
        if let Some(key) = self.aliases.get(path) {
            return Some(key.as_path());
        }
        let canonical = path.canonicalize().ok()?;
        if let Some((key, _)) = self.states.get_key_value(&canonical) {
            return Some(key.as_path());
        }
        self.aliases.get(&canonical).map(|k| k.as_path())
    }

    /// State for an exact configured source path
    pub fn get(&self, src: &Path) -> Option<&SourceState> {
        self.states.get(src)
    }

    /// Mutable state for an exact configured source path
    pub fn get_mut(&mut self, src: &Path) -> Option<&mut SourceState> {
        self.states.get_mut(src)
    }

    /// Whether `src` is a configured source path
    pub fn contains(&self, src: &Path) -> bool {
        self.states.contains_key(src)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
