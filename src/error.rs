//! Error types for name resolution and loading.

use std::path::PathBuf;

use smol_str::SmolStr;

use crate::base::{NameError, QualifiedName};

/// Boxed error coming out of the host environment.
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T, E = LoadError> = std::result::Result<T, E>;

/// Everything that can go wrong while resolving, loading or reloading.
///
/// Every variant is fatal to the call that triggered it; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No file or directory backs the name in any registered root.
    #[error("{name} not found in any load path")]
    NotFound { name: QualifiedName },

    /// The name was requested again while it was still being resolved.
    ///
    /// Usually the file never defines what its name promises, so the message
    /// carries both the segment and the basename it was looked up under.
    #[error(
        "cyclic resolution of {name}: name {segment} doesn't correspond to file name '{basename}'"
    )]
    CyclicResolution {
        name: QualifiedName,
        segment: SmolStr,
        basename: SmolStr,
    },

    /// A segment that can't survive the segment → basename → segment trip.
    #[error("name {segment} in {name} doesn't correspond to file name '{basename}'")]
    NamingConvention {
        name: QualifiedName,
        segment: SmolStr,
        basename: SmolStr,
    },

    /// The file loaded for `name` defined something else.
    #[error("something wrong with {name}: {} defines {defined}", path.display())]
    NamespaceMismatch {
        name: QualifiedName,
        path: PathBuf,
        defined: QualifiedName,
    },

    #[error("root {} already added", root.display())]
    DuplicateRoot { root: PathBuf },

    #[error("{} is not inside any load path", path.display())]
    UnknownRoot { path: PathBuf },

    #[error("{name} is not loaded")]
    NotLoaded { name: QualifiedName },

    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error raised by the host's materialize primitive, passed through as is.
    #[error(transparent)]
    Host(HostError),
}

impl LoadError {
    /// Wrap an arbitrary host-side error.
    pub fn host(error: impl Into<HostError>) -> Self {
        LoadError::Host(error.into())
    }

    /// Short stable code for logs and assertions.
    pub fn code(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } => codes::NOT_FOUND,
            LoadError::CyclicResolution { .. } => codes::CYCLIC_RESOLUTION,
            LoadError::NamingConvention { .. } => codes::NAMING_CONVENTION,
            LoadError::NamespaceMismatch { .. } => codes::NAMESPACE_MISMATCH,
            LoadError::DuplicateRoot { .. } => codes::DUPLICATE_ROOT,
            LoadError::UnknownRoot { .. } => codes::UNKNOWN_ROOT,
            LoadError::NotLoaded { .. } => codes::NOT_LOADED,
            LoadError::InvalidName(_) => codes::INVALID_NAME,
            LoadError::Io { .. } => codes::IO,
            LoadError::Host(_) => codes::HOST,
        }
    }
}

/// Error codes reported by [`LoadError::code`].
pub mod codes {
    pub const NOT_FOUND: &str = "E0001";
    pub const CYCLIC_RESOLUTION: &str = "E0002";
    pub const NAMESPACE_MISMATCH: &str = "E0003";
    pub const DUPLICATE_ROOT: &str = "E0004";
    pub const UNKNOWN_ROOT: &str = "E0005";
    pub const NOT_LOADED: &str = "E0006";
    pub const INVALID_NAME: &str = "E0007";
    pub const IO: &str = "E0008";
    pub const HOST: &str = "E0009";

    /// Naming convention violation.
    pub const NAMING_CONVENTION: &str = "W0001";
}
