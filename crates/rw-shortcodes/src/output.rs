//! Shortcode output types.
//!
//! Defines the result set a shortcode handler returns for one occurrence.

use crate::Document;

/// Output from one shortcode invocation.
///
/// - [`None`](Self::None): remove the tag and contribute nothing
/// - [`Documents`](Self::Documents): documents whose content is expanded again
/// - [`Raw`](Self::Raw): documents whose content is spliced in verbatim
///
/// In both document variants every document's metadata is merged into the running
/// metadata, in order. An empty document list is valid and behaves like a tag
/// that produced empty content.
///
/// # Example
///
/// ```
/// use rw_shortcodes::{Document, ShortcodeOutput};
///
/// // Replace the tag with text that may itself contain tags
/// let output = ShortcodeOutput::content("ABC<?# Nested /?>XYZ");
///
/// // Replace the tag with text that is never scanned again
/// let output = ShortcodeOutput::raw("<?# Left /?> as-is");
///
/// // Contribute metadata only
/// let output = ShortcodeOutput::document(Document::default().with_item("Foo", 11));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ShortcodeOutput {
    /// No output; the tag is consumed and discarded.
    #[default]
    None,
    /// Documents whose content is recursively expanded.
    Documents(Vec<Document>),
    /// Documents whose content is not expanded.
    Raw(Vec<Document>),
}

impl ShortcodeOutput {
    /// Single document with this content and no metadata.
    #[must_use]
    pub fn content(s: impl Into<String>) -> Self {
        Self::Documents(vec![Document::new(s)])
    }

    /// Single document.
    #[must_use]
    pub fn document(document: Document) -> Self {
        Self::Documents(vec![document])
    }

    /// Several documents, concatenated in order.
    #[must_use]
    pub fn documents(documents: Vec<Document>) -> Self {
        Self::Documents(documents)
    }

    /// Single document with this content, not expanded further.
    #[must_use]
    pub fn raw(s: impl Into<String>) -> Self {
        Self::Raw(vec![Document::new(s)])
    }

    /// Check whether the output is exempt from recursive expansion.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Documents in emission order (empty for [`None`](Self::None)).
    #[must_use]
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            Self::None => Vec::new(),
            Self::Documents(docs) | Self::Raw(docs) => docs,
        }
    }
}
