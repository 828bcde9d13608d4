//! Name resolution: turning qualified names into loaded definitions.
//!
//! # Algorithm
//!
//! `resolve(A::B)`:
//!
//! 1. **Cache** - a loaded name returns its stored definition; the host is
//!    asked to materialize each name at most once.
//! 2. **Parent first** - `A` is resolved before `A::B` so the host always
//!    receives the enclosing namespace. When `A` is the file currently being
//!    loaded on this thread (its own source uses `A::B`), the child is
//!    loaded without a namespace instead.
//! 3. **Cycle check** - a name requested again while this thread (or a
//!    thread waiting on it) is still resolving it fails with
//!    [`LoadError::CyclicResolution`]. Other threads block until the owner
//!    finishes and then see its result.
//! 4. **Lookup** - the [`ChainedAdapter`] locates a file (materialized by the
//!    host and checked for the right name) or a directory (an empty namespace
//!    container is synthesized).
//! 5. **Record** - the load is stored and callbacks registered with
//!    [`Resolver::after`] fire.
//!
//! The registry lock is never held while the host or a callback runs, so
//! both may call back into the resolver.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

use super::callbacks::Handler;
use super::host::{Definition, Host, Materialize, Source};
use super::registry::{LoadKind, LoadRecord, Registry};
use crate::adapter::{ChainedAdapter, Entry};
use crate::base::{QualifiedName, round_trips};
use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};

/// The loading context: registry, pending set, callbacks and load paths.
///
/// All state that would otherwise be process-wide lives here; independent
/// resolvers don't share anything.
pub struct Resolver<H: Host> {
    host: H,
    adapter: ChainedAdapter,
    config: LoaderConfig,
    registry: Mutex<Registry<H::Definition>>,
    /// Signalled whenever a pending name is released.
    settled: Condvar,
}

/// Removes a name from the pending set however resolution ends.
struct PendingGuard<'a, D> {
    registry: &'a Mutex<Registry<D>>,
    settled: &'a Condvar,
    name: &'a QualifiedName,
}

impl<D> Drop for PendingGuard<'_, D> {
    fn drop(&mut self) {
        self.registry.lock().pending.remove(self.name);
        self.settled.notify_all();
    }
}

impl<H: Host> Resolver<H> {
    /// Create a resolver with default settings and no load paths.
    pub fn new(host: H) -> Self {
        Self::with_config(host, LoaderConfig::default())
    }

    pub fn with_config(host: H, config: LoaderConfig) -> Self {
        Self {
            host,
            adapter: ChainedAdapter::from_config(&config),
            config,
            registry: Mutex::new(Registry::new()),
            settled: Condvar::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn adapter(&self) -> &ChainedAdapter {
        &self.adapter
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Register a load path, watched according to the configuration.
    pub fn add_path(&self, root: impl AsRef<Path>) -> Result<()> {
        self.adapter.add_path(root, self.config.watch_by_default())
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Parse and resolve a `::`-separated name.
    pub fn resolve_str(&self, name: &str) -> Result<H::Definition> {
        self.resolve(&QualifiedName::parse(name)?)
    }

    /// Resolve `name`, loading it (and its enclosing namespaces) on first use.
    pub fn resolve(&self, name: &QualifiedName) -> Result<H::Definition> {
        if let Some(definition) = self.get(name) {
            return Ok(definition);
        }

        let parent = match name.parent() {
            Some(parent) if self.loading_here(&parent) => {
                tracing::trace!(
                    "[RESOLVE] '{}' is still loading, '{}' gets no namespace",
                    parent,
                    name
                );
                None
            }
            Some(parent) => Some(self.resolve(&parent)?),
            None => None,
        };

        let me = thread::current().id();
        let pending = {
            let mut registry = self.registry.lock();
            loop {
                // the parent's file (or another thread) may have loaded us already
                if let Some(record) = registry.records.get(name) {
                    return Ok(record.definition.clone());
                }
                let Some(&owner) = registry.pending.get(name) else {
                    break;
                };
                if registry.waits_on(owner, me) {
                    return Err(self.cycle(name));
                }
                tracing::trace!("[RESOLVE] waiting for another thread to load '{}'", name);
                registry.waiting.insert(me, name.clone());
                self.settled.wait(&mut registry);
                registry.waiting.remove(&me);
            }
            registry.pending.insert(name.clone(), me);
            PendingGuard {
                registry: &self.registry,
                settled: &self.settled,
                name,
            }
        };

        let record = self.load(name, parent.as_ref())?;
        let definition = record.definition.clone();
        let handlers = {
            let mut registry = self.registry.lock();
            registry.records.insert(name.clone(), record);
            registry.callbacks.take_unfired(name)
        };
        drop(pending);

        if !handlers.is_empty() {
            tracing::trace!("[RESOLVE] firing {} callback(s) for '{}'", handlers.len(), name);
        }
        for handler in handlers {
            handler(&definition);
        }
        Ok(definition)
    }

    /// Whether this thread is in the middle of resolving `name`.
    fn loading_here(&self, name: &QualifiedName) -> bool {
        self.registry.lock().pending.get(name) == Some(&thread::current().id())
    }

    fn cycle(&self, name: &QualifiedName) -> LoadError {
        let segment = name.last().clone();
        let basename = self.adapter.translator().to_basename(&segment);
        tracing::debug!("[RESOLVE] cycle on '{}' (file '{}')", name, basename);
        LoadError::CyclicResolution {
            name: name.clone(),
            segment,
            basename,
        }
    }

    /// Locate and materialize `name`. Registry bookkeeping is the caller's.
    fn load(
        &self,
        name: &QualifiedName,
        parent: Option<&H::Definition>,
    ) -> Result<LoadRecord<H::Definition>> {
        let segment = name.last();
        let translator = self.adapter.translator();
        if !round_trips(translator.as_ref(), segment) {
            return Err(LoadError::NamingConvention {
                name: name.clone(),
                segment: segment.clone(),
                basename: translator.to_basename(segment),
            });
        }

        match self.adapter.entry(name) {
            Some(Entry::File(path)) => {
                let source = self.read_source(name, path)?;
                let modified = self.adapter.modified(name);
                tracing::debug!("[RESOLVE] loading '{}' from {}", name, source.path.display());

                let definition = self.host.materialize(
                    self,
                    Materialize::Define {
                        name,
                        source: &source,
                        namespace: parent,
                    },
                )?;
                self.verify(name, &source.path, &definition)?;

                Ok(LoadRecord {
                    name: name.clone(),
                    kind: LoadKind::File,
                    path: source.path,
                    modified,
                    definition,
                })
            }
            Some(Entry::Directory(path)) => {
                tracing::debug!(
                    "[RESOLVE] generating namespace '{}' for {}",
                    name,
                    path.display()
                );
                let definition = self.host.namespace(name, parent)?;
                self.verify(name, &path, &definition)?;

                Ok(LoadRecord {
                    name: name.clone(),
                    kind: LoadKind::Namespace,
                    path,
                    modified: None,
                    definition,
                })
            }
            None => Err(LoadError::NotFound { name: name.clone() }),
        }
    }

    fn read_source(&self, name: &QualifiedName, path: PathBuf) -> Result<Source> {
        match self.adapter.read(name) {
            Ok(content) => Ok(Source { path, content }),
            Err(source) => Err(LoadError::Io { path, source }),
        }
    }

    fn verify(&self, name: &QualifiedName, path: &Path, definition: &H::Definition) -> Result<()> {
        if definition.name() == name {
            return Ok(());
        }
        Err(LoadError::NamespaceMismatch {
            name: name.clone(),
            path: path.to_path_buf(),
            defined: definition.name().clone(),
        })
    }

    // ========================================================================
    // CALLBACKS
    // ========================================================================

    /// Run `handler` once `name` is loaded.
    ///
    /// If it already is, the handler runs right now, before `after` returns.
    pub fn after<F>(&self, name: &QualifiedName, handler: F)
    where
        F: Fn(&H::Definition) + Send + Sync + 'static,
    {
        let handler: Handler<H::Definition> = Arc::new(handler);
        let loaded = {
            let mut registry = self.registry.lock();
            let loaded = registry.records.get(name).map(|r| r.definition.clone());
            registry
                .callbacks
                .register(name.clone(), handler.clone(), loaded.is_some());
            loaded
        };

        if let Some(definition) = loaded {
            handler(&definition);
        }
    }

    /// [`after`](Resolver::after) with a `::`-separated name.
    pub fn after_str<F>(&self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&H::Definition) + Send + Sync + 'static,
    {
        self.after(&QualifiedName::parse(name)?, handler);
        Ok(())
    }

    // ========================================================================
    // PRELOAD & RELOAD
    // ========================================================================

    /// Resolve every name found under `root`, depth-first.
    ///
    /// `root` must be a registered load path or lie inside one. Returns the
    /// names in the order they were resolved.
    pub fn preload(&self, root: impl AsRef<Path>) -> Result<Vec<QualifiedName>> {
        let root = root.as_ref();
        let names = match self.adapter.names_under(root) {
            Some(Ok(names)) => names,
            Some(Err(source)) => {
                return Err(LoadError::Io {
                    path: root.to_path_buf(),
                    source,
                });
            }
            None => {
                return Err(LoadError::UnknownRoot {
                    path: root.to_path_buf(),
                });
            }
        };

        for name in &names {
            self.resolve(name)?;
        }

        tracing::info!("[PRELOAD] {} name(s) under {}", names.len(), root.display());
        Ok(names)
    }

    /// Materialize an already loaded name again from its current file.
    ///
    /// Callbacks don't fire again. On failure the previous definition stays
    /// in place.
    pub fn reload(&self, name: &QualifiedName) -> Result<H::Definition> {
        let previous = self
            .record(name)
            .ok_or_else(|| LoadError::NotLoaded { name: name.clone() })?;
        if previous.kind == LoadKind::Namespace {
            return Ok(previous.definition);
        }

        let Some(Entry::File(path)) = self.adapter.entry(name) else {
            return Err(LoadError::NotFound { name: name.clone() });
        };
        let source = self.read_source(name, path)?;
        let modified = self.adapter.modified(name);
        tracing::warn!("[RELOAD] reloading '{}' from {}", name, source.path.display());

        let definition = self.host.materialize(
            self,
            Materialize::Redefine {
                name,
                source: &source,
                previous: &previous.definition,
            },
        )?;
        self.verify(name, &source.path, &definition)?;

        let mut registry = self.registry.lock();
        if let Some(record) = registry.records.get_mut(name) {
            record.definition = definition.clone();
            record.modified = modified;
            record.path = source.path;
        }
        Ok(definition)
    }

    // ========================================================================
    // INSPECTION & RESET
    // ========================================================================

    /// The definition of a loaded name, without loading anything.
    pub fn get(&self, name: &QualifiedName) -> Option<H::Definition> {
        self.registry
            .lock()
            .records
            .get(name)
            .map(|r| r.definition.clone())
    }

    pub fn is_loaded(&self, name: &QualifiedName) -> bool {
        self.registry.lock().records.contains_key(name)
    }

    /// A copy of the load record for `name`.
    pub fn record(&self, name: &QualifiedName) -> Option<LoadRecord<H::Definition>> {
        self.registry.lock().records.get(name).cloned()
    }

    /// Loaded names in load order.
    pub fn loaded_names(&self) -> Vec<QualifiedName> {
        self.registry.lock().records.keys().cloned().collect()
    }

    /// Callbacks registered for `name` that haven't fired yet.
    pub fn pending_callbacks(&self, name: &QualifiedName) -> usize {
        self.registry.lock().callbacks.pending_for(name)
    }

    pub fn callback_count(&self) -> usize {
        self.registry.lock().callbacks.len()
    }

    /// Forget every load, pending resolution and callback.
    ///
    /// Load paths are kept; see [`ChainedAdapter::clear`] for those.
    pub fn clear(&self) {
        self.registry.lock().clear();
        self.settled.notify_all();
    }

    /// Forget loaded names only.
    pub fn clear_loaded(&self) {
        self.registry.lock().records.clear();
    }

    /// Forget callbacks only.
    pub fn clear_callbacks(&self) {
        self.registry.lock().callbacks.clear();
    }
}

impl<H: Host> fmt::Debug for Resolver<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("Resolver")
            .field("roots", &self.adapter.roots())
            .field("loaded", &registry.records.len())
            .field("pending", &registry.pending.len())
            .field("callbacks", &registry.callbacks)
            .finish()
    }
}
