//! Change polling and reload.
//!
//! The [`Watcher`] has no timer of its own: every call to
//! [`Watcher::check`] compares the watched files against what was seen
//! last time and reloads the loaded names whose files got newer. How often
//! to call it is up to the caller.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use walkdir::WalkDir;

use crate::adapter::{ChainedAdapter, WatchEntry, WatchState};
use crate::base::QualifiedName;
use crate::error::Result;
use crate::loader::{Host, Resolver};

/// Reloads loaded names whose backing files changed.
///
/// Always covers the watched roots of the resolver's [`ChainedAdapter`];
/// further paths can be added with [`watch`](Watcher::watch).
#[derive(Debug, Default)]
pub struct Watcher {
    /// Extra paths and the file state last seen under each.
    extra: IndexMap<PathBuf, WatchState>,
}

impl Watcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also watch `path`, which should lie inside one of the resolver's
    /// load paths (files outside every load path map to no name).
    ///
    /// The current state is recorded immediately. Returns `false` if the
    /// path was already watched by this watcher.
    pub fn watch<H: Host>(&mut self, resolver: &Resolver<H>, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref().to_path_buf();
        if self.extra.contains_key(&path) {
            return false;
        }
        let state = snapshot(resolver.adapter(), &path);
        self.extra.insert(path, state);
        true
    }

    /// Stop watching an extra path.
    pub fn unwatch(&mut self, path: impl AsRef<Path>) -> bool {
        self.extra.shift_remove(path.as_ref()).is_some()
    }

    /// Every watched path: the resolver's watched roots, then extra paths.
    pub fn paths<H: Host>(&self, resolver: &Resolver<H>) -> Vec<PathBuf> {
        let mut paths = resolver.adapter().watched_roots();
        for path in self.extra.keys() {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    /// Reload every loaded name whose file changed since the last check.
    ///
    /// Changed names that aren't loaded are skipped: the watcher never
    /// loads anything for the first time. Returns the reloaded names.
    ///
    /// A failing reload doesn't stop the others: every changed name is
    /// attempted, and the first error is returned once all have run. The
    /// failed name is reported again only after its file changes again.
    pub fn check<H: Host>(&mut self, resolver: &Resolver<H>) -> Result<Vec<QualifiedName>> {
        let adapter = resolver.adapter();
        let mut changed: IndexSet<QualifiedName> = adapter.changed_names().into_iter().collect();

        for (path, known) in self.extra.iter_mut() {
            if adapter.is_watched_root(path) {
                continue;
            }
            let current = snapshot(adapter, path);
            changed.extend(known.changed_in(&current));
            *known = current;
        }

        let mut reloaded = Vec::new();
        let mut first_error = None;
        for name in changed {
            if !resolver.is_loaded(&name) {
                tracing::trace!("[WATCH] '{}' changed but was never loaded", name);
                continue;
            }
            match resolver.reload(&name) {
                Ok(_) => reloaded.push(name),
                Err(err) => {
                    tracing::warn!("[WATCH] reloading '{}' failed: {}", name, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(reloaded),
        }
    }
}

/// Source files under `path`, named through the chain's roots.
fn snapshot(adapter: &ChainedAdapter, path: &Path) -> WatchState {
    let mut state = WatchState::new();
    let entries = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == adapter.extension()));

    for entry in entries {
        let Some(name) = adapter.to_name(entry.path()) else {
            continue;
        };
        let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) else {
            continue;
        };
        state.insert(WatchEntry {
            name,
            path: entry.path().to_path_buf(),
            modified,
        });
    }
    state
}
