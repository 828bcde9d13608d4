//! Path adapters: mapping qualified names onto filesystem roots.
//!
//! A [`PathAdapter`] answers questions about one root: does a name exist,
//! what does its file contain, which path backs it and which name does a
//! path stand for. [`ChainedAdapter`] strings several roots together and
//! answers with the first match.
//!
//! ## Layout contract
//!
//! For the name `SomeNamespace::SomeClass` under root `lib/` with the
//! underscored convention and extension `src`:
//!
//! ```text
//! lib/some_namespace/some_class.src   ← file backing SomeNamespace::SomeClass
//! lib/some_namespace/                 ← directory standing for SomeNamespace
//! lib/some_namespace.src              ← optional file backing SomeNamespace
//! ```
//!
//! A file wins over a same-named directory.

mod chained;
mod file_system;
mod watch_state;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::base::QualifiedName;

pub use chained::ChainedAdapter;
pub use file_system::FileSystemAdapter;
pub use watch_state::{WatchEntry, WatchState};

/// What a qualified name points at inside a root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entry {
    /// A source file that defines the name.
    File(PathBuf),
    /// A directory only: the name is a namespace container.
    Directory(PathBuf),
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::File(path) | Entry::Directory(path) => path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }
}

/// Name ↔ path queries over a single root.
pub trait PathAdapter: fmt::Debug + Send + Sync {
    /// The directory this adapter serves.
    fn root(&self) -> &Path;

    /// Locate the file or directory backing `name`.
    fn entry(&self, name: &QualifiedName) -> Option<Entry>;

    /// Read the source file backing `name`.
    ///
    /// Fails with [`io::ErrorKind::NotFound`] when the name has no file,
    /// including when it only exists as a directory.
    fn read(&self, name: &QualifiedName) -> io::Result<String>;

    /// Map a path below the root back to the name it stands for.
    ///
    /// `None` when the path lies outside the root or fails translation.
    fn to_name(&self, path: &Path) -> Option<QualifiedName>;

    /// Every name under `path` (inclusive), depth-first in file-name order.
    fn names_under(&self, path: &Path) -> io::Result<Vec<QualifiedName>>;

    /// Current modification times of every source file under the root.
    fn snapshot(&self) -> WatchState;

    fn exists(&self, name: &QualifiedName) -> bool {
        self.entry(name).is_some()
    }

    fn to_path(&self, name: &QualifiedName) -> Option<PathBuf> {
        self.entry(name).map(|entry| entry.path().to_path_buf())
    }

    /// Modification time of the file backing `name`.
    fn modified(&self, name: &QualifiedName) -> Option<SystemTime> {
        match self.entry(name)? {
            Entry::File(path) => std::fs::metadata(path).and_then(|m| m.modified()).ok(),
            Entry::Directory(_) => None,
        }
    }

    /// Names whose files are newer than recorded in `known` (or new since).
    ///
    /// `known` is updated to what was observed.
    fn changed_since(&self, known: &mut WatchState) -> Vec<QualifiedName> {
        let current = self.snapshot();
        let changed = known.changed_in(&current);
        *known = current;
        changed
    }

    /// Whether `path` lies at or below the root.
    fn contains(&self, path: &Path) -> bool {
        path.starts_with(self.root())
    }
}
