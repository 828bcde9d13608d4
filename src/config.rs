//! Loader configuration.

use smol_str::SmolStr;

use crate::base::TranslatorKind;

/// Extension of source files when nothing else is configured.
pub const DEFAULT_EXTENSION: &str = "src";

/// Settings shared by the adapters and the resolver.
///
/// Built with `with_*` methods:
///
/// ```
/// use autoload::{LoaderConfig, TranslatorKind};
///
/// let config = LoaderConfig::new()
///     .with_extension("unit")
///     .with_translator(TranslatorKind::CamelCase);
/// assert_eq!(config.extension(), "unit");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    extension: SmolStr,
    translator: TranslatorKind,
    watch_by_default: bool,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source file extension (without the leading dot).
    pub fn with_extension(mut self, extension: impl Into<SmolStr>) -> Self {
        let extension: SmolStr = extension.into();
        self.extension = SmolStr::new(extension.trim_start_matches('.'));
        self
    }

    /// Set the segment ↔ basename convention.
    pub fn with_translator(mut self, translator: TranslatorKind) -> Self {
        self.translator = translator;
        self
    }

    /// Whether roots added through the resolver are watched unless stated
    /// otherwise.
    pub fn with_watch_by_default(mut self, watch: bool) -> Self {
        self.watch_by_default = watch;
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn translator(&self) -> TranslatorKind {
        self.translator
    }

    pub fn watch_by_default(&self) -> bool {
        self.watch_by_default
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extension: SmolStr::new_static(DEFAULT_EXTENSION),
            translator: TranslatorKind::default(),
            watch_by_default: true,
        }
    }
}
