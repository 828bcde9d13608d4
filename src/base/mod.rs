//! Foundation types for the loader.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`QualifiedName`] - Hierarchical `A::B::C` names
//! - [`NameTranslator`] - Segment ↔ basename naming conventions
//!
//! This module has NO dependencies on other autoload modules.

mod name;
mod translate;

pub use name::{NameError, QualifiedName, SEPARATOR};
pub use translate::{
    CamelCaseTranslator, NameTranslator, TranslatorKind, UnderscoredTranslator, round_trips,
};
