//! Shortcode handler trait.

use async_trait::async_trait;

use crate::{Document, HandlerError, ShortcodeArgs, ShortcodeContext, ShortcodeOutput};

/// Handler for a shortcode tag.
///
/// One instance is created per tag name per pass, the first time the name is
/// encountered, and reused for every later occurrence of that name in the same
/// pass (including occurrences produced by recursive expansion). State kept in
/// `self` therefore persists across occurrences within a document, but never
/// across documents.
///
/// # Thread Safety
///
/// Handlers implement `Send` only (not `Sync`) since each pass owns its instances.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use rw_shortcodes::{
///     Document, HandlerError, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput,
/// };
///
/// #[derive(Default)]
/// struct Counter {
///     next: i64,
/// }
///
/// #[async_trait]
/// impl Shortcode for Counter {
///     async fn execute(
///         &mut self,
///         _args: &ShortcodeArgs,
///         _content: &str,
///         _document: &Document,
///         _ctx: &ShortcodeContext<'_>,
///     ) -> Result<ShortcodeOutput, HandlerError> {
///         self.next += 1;
///         Ok(ShortcodeOutput::content(self.next.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Shortcode: Send {
    /// Execute one occurrence.
    ///
    /// - `args`: arguments from the opening tag
    /// - `content`: inner content of a paired tag (empty when self-closing)
    /// - `document`: the document's original content with the metadata as it
    ///   stands at this occurrence
    /// - `ctx`: ambient capabilities for this invocation
    async fn execute(
        &mut self,
        args: &ShortcodeArgs,
        content: &str,
        document: &Document,
        ctx: &ShortcodeContext<'_>,
    ) -> Result<ShortcodeOutput, HandlerError>;

    /// Release resources held by this instance.
    ///
    /// Called exactly once at the end of the pass that created the instance,
    /// whether the pass succeeded or failed.
    fn dispose(&mut self) {}
}
