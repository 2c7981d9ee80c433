use async_trait::async_trait;

use crate::{Document, HandlerError, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput};

/// `<?# Raw ?>...<?#/ Raw ?>`: outputs its inner content untouched.
///
/// Register it with [`ShortcodeKind::Raw`](crate::ShortcodeKind::Raw) so the
/// scanner never looks inside.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawShortcode;

#[async_trait]
impl Shortcode for RawShortcode {
    async fn execute(
        &mut self,
        _args: &ShortcodeArgs,
        content: &str,
        _document: &Document,
        _ctx: &ShortcodeContext<'_>,
    ) -> Result<ShortcodeOutput, HandlerError> {
        Ok(ShortcodeOutput::raw(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::test_support::execute;

    #[tokio::test]
    async fn test_echoes_content_as_raw() {
        let output = execute(&mut RawShortcode, "", "<?# Bar /?>", &Document::default())
            .await
            .unwrap();
        assert_eq!(output, ShortcodeOutput::raw("<?# Bar /?>"));
    }
}
