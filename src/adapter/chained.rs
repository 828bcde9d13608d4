//! Several roots searched in registration order.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::{Mutex, RwLock};
use smol_str::SmolStr;

use super::{Entry, FileSystemAdapter, PathAdapter, WatchState};
use crate::base::{NameTranslator, QualifiedName};
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};

/// A registered root.
#[derive(Debug)]
struct Root {
    /// Normalized absolute path, used to reject duplicates.
    key: PathBuf,
    adapter: Arc<dyn PathAdapter>,
    watched: bool,
    /// Last observed state; only maintained for watched roots.
    state: Mutex<WatchState>,
}

/// Ordered collection of [`PathAdapter`]s.
///
/// Queries try each root in registration order and stop at the first one
/// that knows the name. A root path can be registered only once per chain.
///
/// Roots live behind a lock so a chain shared by a resolver can still gain
/// or lose roots through `&self`.
#[derive(Debug)]
pub struct ChainedAdapter {
    translator: Arc<dyn NameTranslator>,
    extension: SmolStr,
    roots: RwLock<Vec<Root>>,
}

impl ChainedAdapter {
    /// Create an empty chain; roots added by path use `translator` and
    /// `extension`.
    pub fn new(translator: Arc<dyn NameTranslator>, extension: impl Into<SmolStr>) -> Self {
        Self {
            translator,
            extension: extension.into(),
            roots: RwLock::new(Vec::new()),
        }
    }

    /// Create an empty chain from loader settings.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.translator().translator(), config.extension())
    }

    pub fn translator(&self) -> &Arc<dyn NameTranslator> {
        &self.translator
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    // ========================================================================
    // ROOT REGISTRATION
    // ========================================================================

    /// Register a directory as a search root.
    ///
    /// Watched roots are snapshotted right away, so the first modification
    /// after registration is reported by [`each_changed_name`].
    ///
    /// [`each_changed_name`]: ChainedAdapter::each_changed_name
    pub fn add_path(&self, root: impl AsRef<Path>, watched: bool) -> Result<()> {
        let adapter = FileSystemAdapter::new(
            root.as_ref(),
            self.translator.clone(),
            self.extension.clone(),
        );
        self.add_adapter(Arc::new(adapter), watched)
    }

    /// Register an already built adapter as a search root.
    pub fn add_adapter(&self, adapter: Arc<dyn PathAdapter>, watched: bool) -> Result<()> {
        let key = normalize(adapter.root());

        // Fast check under the read lock before snapshotting the tree
        if self.roots.read().iter().any(|r| r.key == key) {
            return Err(LoadError::DuplicateRoot { root: key });
        }

        let state = if watched {
            adapter.snapshot()
        } else {
            WatchState::new()
        };

        let mut roots = self.roots.write();
        if roots.iter().any(|r| r.key == key) {
            return Err(LoadError::DuplicateRoot { root: key });
        }

        tracing::debug!(
            "[ADAPTER] added root {} (watched={}, {} files)",
            key.display(),
            watched,
            state.len()
        );
        roots.push(Root {
            key,
            adapter,
            watched,
            state: Mutex::new(state),
        });
        Ok(())
    }

    /// Unregister a root. Returns whether it was registered.
    ///
    /// Duplicate detection only covers roots currently registered, so a
    /// removed root may be added again (as after [`clear`]).
    ///
    /// [`clear`]: ChainedAdapter::clear
    pub fn remove_path(&self, root: impl AsRef<Path>) -> bool {
        let key = normalize(root.as_ref());
        let mut roots = self.roots.write();
        let before = roots.len();
        roots.retain(|r| r.key != key);
        before != roots.len()
    }

    /// Drop every root. Each may be registered again afterwards.
    pub fn clear(&self) {
        self.roots.write().clear();
    }

    /// All roots in registration order.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots
            .read()
            .iter()
            .map(|r| r.adapter.root().to_path_buf())
            .collect()
    }

    /// Roots registered as watched, in registration order.
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        self.roots
            .read()
            .iter()
            .filter(|r| r.watched)
            .map(|r| r.adapter.root().to_path_buf())
            .collect()
    }

    /// Whether `path` is registered as a watched root.
    pub fn is_watched_root(&self, path: &Path) -> bool {
        let key = normalize(path);
        self.roots.read().iter().any(|r| r.watched && r.key == key)
    }

    pub fn len(&self) -> usize {
        self.roots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.read().is_empty()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Locate `name`: the first root holding a file for it, otherwise the
    /// first root holding a directory for it.
    pub fn entry(&self, name: &QualifiedName) -> Option<Entry> {
        let roots = self.roots.read();
        let mut directory = None;
        for root in roots.iter() {
            match root.adapter.entry(name) {
                Some(entry @ Entry::File(_)) => return Some(entry),
                Some(entry @ Entry::Directory(_)) if directory.is_none() => {
                    directory = Some(entry);
                }
                _ => {}
            }
        }
        directory
    }

    pub fn exists(&self, name: &QualifiedName) -> bool {
        self.roots.read().iter().any(|r| r.adapter.exists(name))
    }

    /// Read the file backing `name` from the first root that has one.
    pub fn read(&self, name: &QualifiedName) -> io::Result<String> {
        let roots = self.roots.read();
        for root in roots.iter() {
            if let Some(Entry::File(_)) = root.adapter.entry(name) {
                return root.adapter.read(name);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no source file for {} in any load path", name),
        ))
    }

    pub fn to_path(&self, name: &QualifiedName) -> Option<PathBuf> {
        self.entry(name).map(|entry| entry.path().to_path_buf())
    }

    /// Modification time of the file backing `name`.
    pub fn modified(&self, name: &QualifiedName) -> Option<std::time::SystemTime> {
        let roots = self.roots.read();
        roots
            .iter()
            .find(|r| matches!(r.adapter.entry(name), Some(Entry::File(_))))
            .and_then(|r| r.adapter.modified(name))
    }

    /// The first successful reverse mapping of `path`.
    pub fn to_name(&self, path: &Path) -> Option<QualifiedName> {
        self.roots
            .read()
            .iter()
            .find_map(|r| r.adapter.to_name(path))
    }

    /// Names under `path`, from the first root containing it.
    ///
    /// `None` when no registered root contains `path`.
    pub fn names_under(&self, path: &Path) -> Option<io::Result<Vec<QualifiedName>>> {
        let roots = self.roots.read();
        let root = roots.iter().find(|r| r.adapter.contains(path))?;
        Some(root.adapter.names_under(path))
    }

    // ========================================================================
    // CHANGE DETECTION
    // ========================================================================

    /// Invoke `callback` once per name whose file changed since the last
    /// call (or since the root was added).
    ///
    /// Only watched roots are consulted. Names come in root registration
    /// order, then discovery order inside a root.
    pub fn each_changed_name(&self, mut callback: impl FnMut(&QualifiedName)) {
        let changed = self.changed_names();
        for name in &changed {
            callback(name);
        }
    }

    /// Collecting form of [`each_changed_name`](ChainedAdapter::each_changed_name).
    pub fn changed_names(&self) -> Vec<QualifiedName> {
        let mut changed = IndexSet::new();
        {
            let roots = self.roots.read();
            for root in roots.iter().filter(|r| r.watched) {
                let mut state = root.state.lock();
                for name in root.adapter.changed_since(&mut state) {
                    changed.insert(name);
                }
            }
        }

        if !changed.is_empty() {
            tracing::debug!("[ADAPTER] {} changed name(s)", changed.len());
        }
        changed.into_iter().collect()
    }
}

impl Default for ChainedAdapter {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

/// Normalized absolute form of a root, for duplicate detection.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn name(s: &str) -> QualifiedName {
        QualifiedName::parse(s).unwrap()
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_first_match_wins() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        write(a.path(), "shared.src", "from a");
        write(b.path(), "shared.src", "from b");
        write(b.path(), "only_b.src", "b only");

        let chain = ChainedAdapter::default();
        chain.add_path(a.path(), false).unwrap();
        chain.add_path(b.path(), false).unwrap();

        assert_eq!(chain.read(&name("Shared")).unwrap(), "from a");
        assert_eq!(chain.read(&name("OnlyB")).unwrap(), "b only");
        assert_eq!(
            chain.to_path(&name("OnlyB")).unwrap(),
            b.path().join("only_b.src")
        );
    }

    #[test]
    fn test_file_in_later_root_beats_directory_in_earlier_root() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        fs::create_dir_all(a.path().join("some_namespace")).unwrap();
        write(b.path(), "some_namespace.src", "file");

        let chain = ChainedAdapter::default();
        chain.add_path(a.path(), false).unwrap();
        chain.add_path(b.path(), false).unwrap();

        assert!(chain.entry(&name("SomeNamespace")).unwrap().is_file());
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let dir = TempDir::new().unwrap();
        let chain = ChainedAdapter::default();
        chain.add_path(dir.path(), true).unwrap();

        let err = chain.add_path(dir.path(), false).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateRoot { .. }));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let chain = ChainedAdapter::default();
        chain.add_path(dir.path(), true).unwrap();

        assert!(chain.remove_path(dir.path()));
        assert!(!chain.remove_path(dir.path()));
        chain.add_path(dir.path(), true).unwrap();
        chain.clear();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_removed_root_can_be_added_again() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "some_class.src", "");
        let chain = ChainedAdapter::default();
        chain.add_path(dir.path(), false).unwrap();

        chain.remove_path(dir.path());
        assert!(!chain.exists(&name("SomeClass")));

        chain.add_path(dir.path(), true).unwrap();
        assert!(chain.exists(&name("SomeClass")));
        assert_eq!(chain.watched_roots(), vec![dir.path().to_path_buf()]);
        // still only once at a time
        assert!(matches!(
            chain.add_path(dir.path(), false),
            Err(LoadError::DuplicateRoot { .. })
        ));
    }

    #[test]
    fn test_names_under_unknown_path() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let chain = ChainedAdapter::default();
        chain.add_path(dir.path(), false).unwrap();

        assert!(chain.names_under(other.path()).is_none());
        assert!(chain.names_under(dir.path()).unwrap().unwrap().is_empty());
    }
}
