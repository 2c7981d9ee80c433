//! Built-in shortcodes.
//!
//! Registered by [`ShortcodeRegistry::with_builtins`](crate::ShortcodeRegistry::with_builtins).

mod conditional;
mod for_each;
mod include;
mod meta;
mod raw;

pub use conditional::IfShortcode;
pub use for_each::ForEachShortcode;
pub use include::IncludeShortcode;
pub use meta::MetaShortcode;
pub use raw::RawShortcode;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use futures::FutureExt;

    use crate::{Document, HandlerError, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput};

    /// Run a handler once against a document with a context that reads nothing.
    pub(crate) async fn execute(
        shortcode: &mut dyn Shortcode,
        args: &str,
        content: &str,
        document: &Document,
    ) -> Result<ShortcodeOutput, HandlerError> {
        let ctx = ShortcodeContext {
            source_path: None,
            base_dir: Path::new("."),
            line: 1,
            depth: 0,
            read_file: &|path| {
                let err = std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                );
                async move { Err(err) }.boxed()
            },
            cancellation: None,
        };
        shortcode
            .execute(&ShortcodeArgs::parse(args), content, document, &ctx)
            .await
    }
}
