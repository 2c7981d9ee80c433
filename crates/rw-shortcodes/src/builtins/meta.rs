use async_trait::async_trait;

use crate::{Document, HandlerError, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput};

/// `<?# Meta Key [Default=...] /?>`: outputs a metadata value.
///
/// Strings are written verbatim, other values as JSON. The value is not
/// expanded again. A missing key outputs `Default` if given, otherwise nothing.
#[derive(Debug, Default)]
pub struct MetaShortcode;

#[async_trait]
impl Shortcode for MetaShortcode {
    async fn execute(
        &mut self,
        args: &ShortcodeArgs,
        _content: &str,
        document: &Document,
        _ctx: &ShortcodeContext<'_>,
    ) -> Result<ShortcodeOutput, HandlerError> {
        let args = args.bind(&["Key", "Default"])?;
        let key = args.require_non_empty("Key")?;

        let value = document
            .metadata()
            .get_display(key)
            .or_else(|| args.get("Default").map(str::to_owned));

        Ok(value.map_or(ShortcodeOutput::None, ShortcodeOutput::raw))
    }
}
