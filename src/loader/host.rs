//! The boundary to the host environment that turns source text into
//! definitions.

use std::path::PathBuf;

use super::Resolver;
use crate::base::QualifiedName;
use crate::error::Result;

/// A handle to something the host defined.
pub trait Definition: Clone {
    /// The qualified name the definition reports for itself.
    ///
    /// Compared against the requested name after every load to catch files
    /// that define something under the wrong namespace.
    fn name(&self) -> &QualifiedName;
}

/// Content of a backing file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    pub content: String,
}

/// What the host is asked to do with a source file.
#[derive(Debug)]
pub enum Materialize<'a, D> {
    /// First definition of `name` inside `namespace` (`None` at top level).
    Define {
        name: &'a QualifiedName,
        source: &'a Source,
        namespace: Option<&'a D>,
    },
    /// Replace `previous` with what `source` now says.
    Redefine {
        name: &'a QualifiedName,
        source: &'a Source,
        previous: &'a D,
    },
}

impl<'a, D> Materialize<'a, D> {
    pub fn name(&self) -> &'a QualifiedName {
        match self {
            Materialize::Define { name, .. } | Materialize::Redefine { name, .. } => *name,
        }
    }

    pub fn source(&self) -> &'a Source {
        match self {
            Materialize::Define { source, .. } | Materialize::Redefine { source, .. } => *source,
        }
    }

    pub fn is_redefinition(&self) -> bool {
        matches!(self, Materialize::Redefine { .. })
    }
}

/// The host environment's definition primitive.
///
/// The resolver hands itself to [`materialize`](Host::materialize) so the
/// host can resolve further names while evaluating a file. Errors returned
/// here reach the caller of `resolve`/`reload` unchanged; wrap foreign
/// errors with [`LoadError::host`](crate::LoadError::host).
pub trait Host: Sized {
    type Definition: Definition;

    /// Define (or redefine) the entity described by a source file.
    fn materialize(
        &self,
        resolver: &Resolver<Self>,
        request: Materialize<'_, Self::Definition>,
    ) -> Result<Self::Definition>;

    /// Create an empty namespace container for a directory-only segment.
    fn namespace(
        &self,
        name: &QualifiedName,
        parent: Option<&Self::Definition>,
    ) -> Result<Self::Definition>;
}
