//! Shortcode registry.
//!
//! Maps tag names to factories that create handler instances. Names are matched
//! case-insensitively (ASCII): `<?# meta /?>` and `<?# Meta /?>` resolve to the
//! same entry and share one instance within a pass.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::builtins::{
    ForEachShortcode, IfShortcode, IncludeShortcode, MetaShortcode, RawShortcode,
};
use crate::{Shortcode, ShortcodeError};

/// Creates a fresh handler instance.
pub type ShortcodeFactory = Arc<dyn Fn() -> Box<dyn Shortcode> + Send + Sync>;

/// How the processor treats a registered shortcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortcodeKind {
    /// Inner content is scanned for nesting; output is expanded again.
    #[default]
    Standard,
    /// Inner content is opaque (the tag ends at its first closing marker) and
    /// output is spliced in verbatim.
    Raw,
}

/// A registered shortcode.
#[derive(Clone)]
pub struct ShortcodeEntry {
    name: String,
    kind: ShortcodeKind,
    factory: ShortcodeFactory,
}

impl ShortcodeEntry {
    /// Name as registered.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Processing kind.
    #[must_use]
    pub fn kind(&self) -> ShortcodeKind {
        self.kind
    }

    /// Create a new handler instance.
    #[must_use]
    pub fn create(&self) -> Box<dyn Shortcode> {
        (self.factory)()
    }
}

impl fmt::Debug for ShortcodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcodeEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Read-only lookup table from tag name to shortcode factory.
///
/// Registries are shared between passes; each pass creates its own instances.
///
/// # Example
///
/// ```
/// use rw_shortcodes::{ShortcodeKind, ShortcodeRegistry};
///
/// let registry = ShortcodeRegistry::with_builtins();
/// assert_eq!(registry.resolve("raw").unwrap().kind(), ShortcodeKind::Raw);
/// assert!(registry.resolve("Missing").is_err());
/// ```
#[derive(Clone, Default)]
pub struct ShortcodeRegistry {
    entries: HashMap<String, ShortcodeEntry>,
}

impl ShortcodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in shortcodes:
    /// `Raw`, `Meta`, `ForEach`, `If`, and `Include`.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new()
            .with_raw::<RawShortcode>("Raw")
            .with::<MetaShortcode>("Meta")
            .with::<ForEachShortcode>("ForEach")
            .with::<IfShortcode>("If")
            .with::<IncludeShortcode>("Include")
    }

    /// Register a shortcode type, creating instances with `Default`.
    #[must_use]
    pub fn with<S: Shortcode + Default + 'static>(mut self, name: &str) -> Self {
        self.add::<S>(name);
        self
    }

    /// Register a raw shortcode type, creating instances with `Default`.
    #[must_use]
    pub fn with_raw<S: Shortcode + Default + 'static>(mut self, name: &str) -> Self {
        self.add_factory(name, ShortcodeKind::Raw, || Box::new(S::default()));
        self
    }

    /// Register a shortcode type, creating instances with `Default`.
    ///
    /// Replaces any existing entry with the same (case-insensitive) name.
    pub fn add<S: Shortcode + Default + 'static>(&mut self, name: &str) {
        self.add_factory(name, ShortcodeKind::Standard, || Box::new(S::default()));
    }

    /// Register a shortcode with a custom factory.
    ///
    /// Replaces any existing entry with the same (case-insensitive) name.
    pub fn add_factory<F>(&mut self, name: &str, kind: ShortcodeKind, factory: F)
    where
        F: Fn() -> Box<dyn Shortcode> + Send + Sync + 'static,
    {
        self.entries.insert(
            normalize_name(name),
            ShortcodeEntry {
                name: name.to_owned(),
                kind,
                factory: Arc::new(factory),
            },
        );
    }

    /// Look up a shortcode by name.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::Unknown`] if no shortcode has this name.
    pub fn resolve(&self, name: &str) -> Result<&ShortcodeEntry, ShortcodeError> {
        self.entries
            .get(&normalize_name(name))
            .ok_or_else(|| ShortcodeError::Unknown {
                name: name.to_owned(),
            })
    }

    /// Check if a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Check if a name is registered as raw. Unknown names are not raw.
    #[must_use]
    pub fn is_raw(&self, name: &str) -> bool {
        self.entries
            .get(&normalize_name(name))
            .is_some_and(|e| e.kind == ShortcodeKind::Raw)
    }

    /// Registered names, sorted case-insensitively.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.name.as_str()).collect();
        names.sort_by_key(|n| n.to_ascii_lowercase());
        names
    }

    /// Number of registered shortcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ShortcodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcodeRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Key used for registry lookup and the per-pass instance arena.
pub(crate) fn normalize_name(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShortcodeErrorKind;

    #[test]
    fn test_empty_registry() {
        let registry = ShortcodeRegistry::new();
        assert!(registry.is_empty());
        let err = registry.resolve("Bar").unwrap_err();
        assert_eq!(err.kind(), ShortcodeErrorKind::UnknownShortcode);
        assert_eq!(err.to_string(), "unknown shortcode `Bar`");
    }

    #[test]
    fn test_builtins() {
        let registry = ShortcodeRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["ForEach", "If", "Include", "Meta", "Raw"]
        );
        assert!(registry.is_raw("Raw"));
        assert!(!registry.is_raw("Meta"));
        assert!(!registry.is_raw("Unknown"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ShortcodeRegistry::new().with::<MetaShortcode>("Meta");
        assert!(registry.contains("meta"));
        assert!(registry.contains("META"));
        assert_eq!(registry.resolve("mEtA").unwrap().name(), "Meta");
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = ShortcodeRegistry::new().with::<MetaShortcode>("Foo");
        registry.add_factory("foo", ShortcodeKind::Raw, || Box::new(RawShortcode));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("Foo").unwrap().kind(), ShortcodeKind::Raw);
        assert_eq!(registry.resolve("Foo").unwrap().name(), "foo");
    }

    #[test]
    fn test_factory_creates_fresh_instances() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let mut registry = ShortcodeRegistry::new();
        registry.add_factory("Raw", ShortcodeKind::Raw, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(RawShortcode)
        });

        let entry = registry.resolve("Raw").unwrap();
        let _a = entry.create();
        let _b = entry.create();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }
}
