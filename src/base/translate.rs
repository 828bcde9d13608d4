//! Segment ↔ basename naming conventions.
//!
//! Every namespace segment maps to exactly one filesystem basename and back.
//! Directories map 1:1 to namespace segments; files carry an extension on
//! top of the basename (the extension is the adapter's business, not the
//! translator's).
//!
//! | Convention              | Segment     | Basename     |
//! |-------------------------|-------------|--------------|
//! | [`UnderscoredTranslator`] | `SomeClass` | `some_class` |
//! | [`CamelCaseTranslator`]   | `SomeClass` | `SomeClass`  |
//!
//! A translator must be a strict inverse pair for segments that follow its
//! convention. Segments that don't (e.g. `HTTPServer` under the underscored
//! convention, which maps to `http_server` and back to `HttpServer`) are
//! detected with [`round_trips`] and rejected by the resolver.

use heck::{ToSnakeCase, ToUpperCamelCase};
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

/// Bidirectional mapping between one namespace segment and one basename.
pub trait NameTranslator: fmt::Debug + Send + Sync {
    /// Translate a symbolic segment into the basename it is stored under.
    fn to_basename(&self, segment: &str) -> SmolStr;

    /// Translate a basename back into a segment.
    ///
    /// Returns `None` when the basename is not a valid form for this
    /// convention. This is never an error: callers treat it as "no such
    /// name".
    fn to_segment(&self, basename: &str) -> Option<SmolStr>;
}

/// Check that `segment` survives a basename round trip unchanged.
pub fn round_trips(translator: &dyn NameTranslator, segment: &str) -> bool {
    let basename = translator.to_basename(segment);
    translator
        .to_segment(&basename)
        .is_some_and(|back| back == segment)
}

/// Which naming convention a loader uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TranslatorKind {
    /// `SomeClass` ↔ `some_class`
    #[default]
    Underscored,
    /// `SomeClass` ↔ `SomeClass`
    CamelCase,
}

impl TranslatorKind {
    /// Build the translator for this convention.
    pub fn translator(self) -> Arc<dyn NameTranslator> {
        match self {
            TranslatorKind::Underscored => Arc::new(UnderscoredTranslator),
            TranslatorKind::CamelCase => Arc::new(CamelCaseTranslator),
        }
    }
}

/// Upper camel case segments stored under snake case basenames.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnderscoredTranslator;

impl NameTranslator for UnderscoredTranslator {
    fn to_basename(&self, segment: &str) -> SmolStr {
        SmolStr::new(segment.to_snake_case())
    }

    fn to_segment(&self, basename: &str) -> Option<SmolStr> {
        let mut chars = basename.chars();
        let first = chars.next()?;
        if !first.is_lowercase() || !unicode_ident::is_xid_start(first) {
            return None;
        }
        if basename.chars().any(|c| c.is_uppercase() || !unicode_ident::is_xid_continue(c)) {
            return None;
        }
        if basename.split('_').any(str::is_empty) {
            return None;
        }

        // `v_2` would become `V2`, which is stored as `v2`
        let segment = basename.to_upper_camel_case();
        if segment.to_snake_case() != basename {
            return None;
        }
        Some(SmolStr::new(segment))
    }
}

/// Segments stored under identical basenames.
#[derive(Clone, Copy, Debug, Default)]
pub struct CamelCaseTranslator;

impl NameTranslator for CamelCaseTranslator {
    fn to_basename(&self, segment: &str) -> SmolStr {
        SmolStr::new(segment)
    }

    fn to_segment(&self, basename: &str) -> Option<SmolStr> {
        let mut chars = basename.chars();
        let first = chars.next()?;
        if !first.is_uppercase() || !unicode_ident::is_xid_start(first) {
            return None;
        }
        if !chars.all(unicode_ident::is_xid_continue) {
            return None;
        }

        Some(SmolStr::new(basename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscored_basename() {
        let t = UnderscoredTranslator;

        assert_eq!(t.to_basename("SomeClass"), "some_class");
        assert_eq!(t.to_basename("SomeNamespace"), "some_namespace");
        assert_eq!(t.to_basename("Tmp"), "tmp");
    }

    #[test]
    fn test_underscored_segment() {
        let t = UnderscoredTranslator;

        assert_eq!(t.to_segment("some_class").as_deref(), Some("SomeClass"));
        assert_eq!(t.to_segment("tmp").as_deref(), Some("Tmp"));
    }

    #[test]
    fn test_underscored_rejects_invalid_basenames() {
        let t = UnderscoredTranslator;

        assert!(t.to_segment("").is_none());
        assert!(t.to_segment("SomeClass").is_none());
        assert!(t.to_segment("_private").is_none());
        assert!(t.to_segment("trailing_").is_none());
        assert!(t.to_segment("double__underscore").is_none());
        assert!(t.to_segment("1st").is_none());
        assert!(t.to_segment("with-dash").is_none());
        assert!(t.to_segment("v_2").is_none());
    }

    #[test]
    fn test_underscored_segment_maps_back_to_basename() {
        let t = UnderscoredTranslator;

        assert_eq!(t.to_segment("v2").as_deref(), Some("V2"));
        for basename in ["v2", "some_class", "tmp", "v_2", "version_2_beta"] {
            if let Some(segment) = t.to_segment(basename) {
                assert_eq!(t.to_basename(&segment), basename);
            }
        }
    }

    #[test]
    fn test_camel_case_identity() {
        let t = CamelCaseTranslator;

        assert_eq!(t.to_basename("SomeClass"), "SomeClass");
        assert_eq!(t.to_segment("SomeClass").as_deref(), Some("SomeClass"));
        assert!(t.to_segment("some_class").is_none());
        assert!(t.to_segment("Some.Class").is_none());
    }

    #[test]
    fn test_round_trips() {
        let underscored = UnderscoredTranslator;

        assert!(round_trips(&underscored, "SomeClass"));
        assert!(round_trips(&underscored, "NamespaceA"));
        // acronyms collapse and come back differently
        assert!(!round_trips(&underscored, "HTTPServer"));
        assert!(!round_trips(&underscored, "some_class"));

        assert!(round_trips(&CamelCaseTranslator, "HTTPServer"));
    }

    #[test]
    fn test_translator_kind_default() {
        let t = TranslatorKind::default().translator();
        assert_eq!(t.to_basename("SomeClass"), "some_class");
    }
}
