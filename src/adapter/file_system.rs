//! Adapter over one directory on the local filesystem.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;
use walkdir::WalkDir;

use super::{Entry, PathAdapter, WatchEntry, WatchState};
use crate::base::{NameTranslator, QualifiedName};
use crate::config::LoaderConfig;

/// Serves names from one root directory.
///
/// Each segment is translated to a basename and joined under the root; the
/// last one additionally gets the source extension when looking for a file.
#[derive(Clone, Debug)]
pub struct FileSystemAdapter {
    root: PathBuf,
    translator: Arc<dyn NameTranslator>,
    extension: SmolStr,
}

impl FileSystemAdapter {
    /// Create an adapter for `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        translator: Arc<dyn NameTranslator>,
        extension: impl Into<SmolStr>,
    ) -> Self {
        Self {
            root: root.into(),
            translator,
            extension: extension.into(),
        }
    }

    /// Create an adapter using the convention and extension from `config`.
    pub fn from_config(root: impl Into<PathBuf>, config: &LoaderConfig) -> Self {
        Self::new(root, config.translator().translator(), config.extension())
    }

    pub fn translator(&self) -> &Arc<dyn NameTranslator> {
        &self.translator
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `<root>/<basename>/<basename>…` without extension.
    fn base_path(&self, name: &QualifiedName) -> PathBuf {
        let mut path = self.root.clone();
        for segment in name.segments() {
            path.push(self.translator.to_basename(segment).as_str());
        }
        path
    }

    fn file_path(&self, base: &Path) -> PathBuf {
        let mut file = base.as_os_str().to_owned();
        file.push(".");
        file.push(self.extension.as_str());
        PathBuf::from(file)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.extension.as_str())
    }

    /// Path relative to the root, trying the canonical forms when the
    /// literal prefix doesn't match (symlinked temp dirs and the like).
    fn relative(&self, path: &Path) -> Option<PathBuf> {
        if let Ok(rel) = path.strip_prefix(&self.root) {
            return Some(rel.to_path_buf());
        }
        let root = self.root.canonicalize().ok()?;
        let path = path.canonicalize().ok()?;
        path.strip_prefix(&root).ok().map(Path::to_path_buf)
    }
}

impl PathAdapter for FileSystemAdapter {
    fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, name: &QualifiedName) -> Option<Entry> {
        let base = self.base_path(name);
        let file = self.file_path(&base);
        if file.is_file() {
            return Some(Entry::File(file));
        }
        if base.is_dir() {
            return Some(Entry::Directory(base));
        }
        None
    }

    fn read(&self, name: &QualifiedName) -> io::Result<String> {
        match self.entry(name) {
            Some(Entry::File(path)) => fs::read_to_string(path),
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no source file for {} under {}", name, self.root.display()),
            )),
        }
    }

    fn to_name(&self, path: &Path) -> Option<QualifiedName> {
        let rel = self.relative(path)?;
        let suffix = format!(".{}", self.extension);

        let mut segments = Vec::new();
        let mut components = rel.components().peekable();
        while let Some(component) = components.next() {
            let Component::Normal(part) = component else {
                return None;
            };
            let part = part.to_str()?;
            let basename = if components.peek().is_some() {
                part
            } else {
                match part.strip_suffix(suffix.as_str()) {
                    Some(stem) => stem,
                    None if part.contains('.') => return None,
                    None => part,
                }
            };

            match self.translator.to_segment(basename) {
                Some(segment) => segments.push(segment),
                None => {
                    tracing::trace!(
                        "[ADAPTER] '{}' has no segment form, skipping {}",
                        basename,
                        path.display()
                    );
                    return None;
                }
            }
        }

        QualifiedName::from_segments(segments).ok()
    }

    fn names_under(&self, path: &Path) -> io::Result<Vec<QualifiedName>> {
        let mut names = IndexSet::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            let file_type = entry.file_type();
            let candidate =
                file_type.is_dir() || (file_type.is_file() && self.is_source_file(entry.path()));
            if !candidate {
                continue;
            }
            if let Some(name) = self.to_name(entry.path()) {
                names.insert(name);
            }
        }
        Ok(names.into_iter().collect())
    }

    fn snapshot(&self) -> WatchState {
        let mut state = WatchState::new();
        let entries = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok);

        for entry in entries {
            if !entry.file_type().is_file() || !self.is_source_file(entry.path()) {
                continue;
            }
            let Some(name) = self.to_name(entry.path()) else {
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

    fn contains(&self, path: &Path) -> bool {
        self.relative(path).is_some()
    }
}
