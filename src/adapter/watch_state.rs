//! Recorded modification times for change detection.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexMap;

use crate::base::QualifiedName;

/// One observed source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEntry {
    /// Name the file backs.
    pub name: QualifiedName,
    /// Path of the file.
    pub path: PathBuf,
    /// Modification time seen at the last check.
    pub modified: SystemTime,
}

/// Last known state of every source file under one root.
///
/// Keyed by path, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchState {
    entries: IndexMap<PathBuf, WatchEntry>,
}

impl WatchState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) an entry.
    pub fn insert(&mut self, entry: WatchEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Look up the entry for a path.
    pub fn get(&self, path: &Path) -> Option<&WatchEntry> {
        self.entries.get(path)
    }

    /// Forget a path.
    pub fn remove(&mut self, path: &Path) -> Option<WatchEntry> {
        self.entries.shift_remove(path)
    }

    /// Names whose entry in `current` is newer than here, or absent here.
    ///
    /// Entries that vanished from `current` are not reported.
    pub fn changed_in(&self, current: &WatchState) -> Vec<QualifiedName> {
        let mut changed: Vec<QualifiedName> = Vec::new();
        for entry in current.iter() {
            let newer = match self.entries.get(&entry.path) {
                Some(known) => entry.modified > known.modified,
                None => true,
            };
            if newer && !changed.contains(&entry.name) {
                changed.push(entry.name.clone());
            }
        }
        changed
    }

    /// Iterate over all entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &WatchEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
