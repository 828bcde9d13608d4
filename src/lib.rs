//! # autoload
//!
//! Lazy, on-demand loading of namespaced code units from a directory tree
//! that mirrors the namespace hierarchy.
//!
//! A consumer asks the [`Resolver`] for a qualified name such as
//! `SomeNamespace::SomeClass`. The first request finds
//! `some_namespace/some_class.src` in one of the registered load paths,
//! hands its content to the [`Host`] to be defined, and caches the result;
//! later requests are free. A [`Watcher`] reloads names whose files changed,
//! and [`Resolver::preload`] loads a whole tree eagerly.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! watch    → Watcher: polling for changed files, triggering reload
//!   ↓
//! loader   → Resolver, load records, callbacks, host boundary
//!   ↓
//! adapter  → PathAdapter, FileSystemAdapter, ChainedAdapter
//!   ↓
//! base     → QualifiedName, naming conventions
//! ```
//!
//! ## Naming convention
//!
//! One segment is one directory or file basename. The default
//! [`UnderscoredTranslator`] maps `SomeClass` to `some_class`; the
//! [`CamelCaseTranslator`] keeps names as they are. Segments that don't
//! survive a round trip through the active convention are rejected with
//! [`LoadError::NamingConvention`].

/// Foundation types: QualifiedName, naming conventions
pub mod base;

/// Name ↔ path adapters over load paths
pub mod adapter;

/// Resolver and host boundary
pub mod loader;

/// Change detection and reload
pub mod watch;

pub mod config;
pub mod error;

pub use adapter::{ChainedAdapter, Entry, FileSystemAdapter, PathAdapter, WatchEntry, WatchState};
pub use base::{
    CamelCaseTranslator, NameError, NameTranslator, QualifiedName, TranslatorKind,
    UnderscoredTranslator,
};
pub use config::LoaderConfig;
pub use error::{LoadError, Result};
pub use loader::{Definition, Host, LoadKind, LoadRecord, Materialize, Resolver, Source};
pub use watch::Watcher;
