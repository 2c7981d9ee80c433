//! Immutable content + metadata value passed into and out of shortcodes.

use serde_json::Value;

use crate::Metadata;

/// A piece of content with its metadata.
///
/// Documents are values: every modification produces a new document and the
/// original is never touched.
///
/// # Example
///
/// ```
/// use rw_shortcodes::{Document, Metadata};
///
/// let doc = Document::new("body").with_item("Foo", 10);
///
/// let mut delta = Metadata::new();
/// delta.insert("Foo", 11);
/// let clone = doc.clone_with(Some(&delta), Some("other"));
///
/// assert_eq!(doc.content(), "body");
/// assert_eq!(doc.metadata().get_i64("Foo"), Some(10));
/// assert_eq!(clone.content(), "other");
/// assert_eq!(clone.metadata().get_i64("Foo"), Some(11));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    content: String,
    metadata: Metadata,
}

impl Document {
    /// Create a document with content and no metadata.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Create a document with metadata only.
    #[must_use]
    pub fn from_metadata(metadata: Metadata) -> Self {
        Self {
            content: String::new(),
            metadata,
        }
    }

    /// Replace the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add or overwrite a single metadata entry.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Produce a new document from this one.
    ///
    /// The new metadata is this document's metadata overwritten by `delta`; the new
    /// content is `content` when given, otherwise a copy of the current content.
    #[must_use]
    pub fn clone_with(&self, delta: Option<&Metadata>, content: Option<&str>) -> Self {
        Self {
            content: content.map_or_else(|| self.content.clone(), str::to_owned),
            metadata: delta.map_or_else(|| self.metadata.clone(), |d| self.metadata.merged(d)),
        }
    }

    /// Document content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Document metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Shorthand for `metadata().get(key)`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Split into content and metadata.
    #[must_use]
    pub fn into_parts(self) -> (String, Metadata) {
        (self.content, self.metadata)
    }
}
