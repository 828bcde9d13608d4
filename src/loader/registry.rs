//! Load records and the registry holding them.

use std::path::PathBuf;
use std::thread::ThreadId;
use std::time::SystemTime;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use super::callbacks::Callbacks;
use crate::base::QualifiedName;

/// How a name came to be loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadKind {
    /// Materialized from a source file.
    File,
    /// Synthesized for a directory without its own file.
    Namespace,
}

/// Everything the resolver remembers about a loaded name.
#[derive(Clone, Debug)]
pub struct LoadRecord<D> {
    pub name: QualifiedName,
    pub kind: LoadKind,
    /// The backing file, or the directory for namespace containers.
    pub path: PathBuf,
    /// Modification time captured at (re)load; `None` for containers.
    pub modified: Option<SystemTime>,
    pub definition: D,
}

/// Mutable resolver state, always accessed under the resolver's lock.
#[derive(Debug)]
pub(crate) struct Registry<D> {
    /// Loaded names in load order.
    pub(crate) records: IndexMap<QualifiedName, LoadRecord<D>>,
    /// Names currently being resolved, with the thread resolving each.
    pub(crate) pending: FxHashMap<QualifiedName, ThreadId>,
    /// Threads blocked until another thread finishes a pending name.
    pub(crate) waiting: FxHashMap<ThreadId, QualifiedName>,
    pub(crate) callbacks: Callbacks<D>,
}

impl<D> Registry<D> {
    pub(crate) fn new() -> Self {
        Self {
            records: IndexMap::new(),
            pending: FxHashMap::default(),
            waiting: FxHashMap::default(),
            callbacks: Callbacks::new(),
        }
    }

    /// Whether resolving a name owned by `owner` would wait on `me`,
    /// following the chain of threads blocked on each other.
    pub(crate) fn waits_on(&self, mut owner: ThreadId, me: ThreadId) -> bool {
        for _ in 0..=self.waiting.len() {
            if owner == me {
                return true;
            }
            let Some(next) = self
                .waiting
                .get(&owner)
                .and_then(|wanted| self.pending.get(wanted))
            else {
                return false;
            };
            owner = *next;
        }
        false
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.pending.clear();
        self.callbacks.clear();
    }
}
