//! Qualified names for namespaced code units.

use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Separator between namespace segments.
pub const SEPARATOR: &str = "::";

/// A hierarchical symbolic name such as `SomeNamespace::SomeClass`.
///
/// Segments are ordered outer-to-inner. The name is immutable once built
/// and cheap to clone (segments live behind an `Arc`).
///
/// Equality, hashing and ordering are segment-wise.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct QualifiedName {
    segments: Arc<[SmolStr]>,
}

/// Errors produced when building a [`QualifiedName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("invalid qualified name '{input}': name is empty")]
    Empty { input: String },

    #[error("invalid qualified name '{input}': segment {index} is empty")]
    EmptySegment { input: String, index: usize },
}

impl QualifiedName {
    /// Parse a `::`-separated name.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        if input.is_empty() {
            return Err(NameError::Empty {
                input: input.to_string(),
            });
        }

        let mut segments = Vec::new();
        for (index, part) in input.split(SEPARATOR).enumerate() {
            if part.is_empty() {
                return Err(NameError::EmptySegment {
                    input: input.to_string(),
                    index,
                });
            }
            segments.push(SmolStr::new(part));
        }

        Ok(Self {
            segments: segments.into(),
        })
    }

    /// Build a name from already split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, NameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let segments: Vec<SmolStr> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(NameError::Empty {
                input: String::new(),
            });
        }
        if let Some(index) = segments.iter().position(|s| s.is_empty()) {
            return Err(NameError::EmptySegment {
                input: segments.join(SEPARATOR),
                index,
            });
        }

        Ok(Self {
            segments: segments.into(),
        })
    }

    /// All segments, outermost first.
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// The innermost segment (`SomeClass` for `SomeNamespace::SomeClass`).
    pub fn last(&self) -> &SmolStr {
        // never empty: both constructors reject empty input
        &self.segments[self.segments.len() - 1]
    }

    /// The enclosing namespace, `None` for a top-level name.
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].into(),
        })
    }

    /// A nested name one level below this one.
    pub fn child(&self, segment: impl Into<SmolStr>) -> Result<QualifiedName, NameError> {
        let segment = segment.into();
        let mut segments = self.segments.to_vec();
        segments.push(segment);
        Self::from_segments(segments)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether this name is `other` or nested somewhere below it.
    pub fn starts_with(&self, other: &QualifiedName) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self)
    }
}

impl FromStr for QualifiedName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for QualifiedName {
    type Error = NameError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}
