use async_trait::async_trait;

use crate::{
    Document, HandlerError, Metadata, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput,
};

/// `<?# ForEach Key ValueKey [IndexKey] ?>...<?#/ ForEach ?>`: repeats its content
/// for every item of a metadata list.
///
/// Each item yields one copy of the current document with the inner content,
/// `ValueKey` set to the item and `IndexKey` (when given) set to its zero-based
/// index. Copies are expanded in order, so tags inside the content see the
/// values of their own iteration. A missing or non-list `Key` outputs nothing.
///
/// ```text
/// <?# ForEach Items Item Index ?>
/// <?# Meta Index /?>: <?# Meta Item /?>
/// <?#/ ForEach ?>
/// ```
#[derive(Debug, Default)]
pub struct ForEachShortcode;

#[async_trait]
impl Shortcode for ForEachShortcode {
    async fn execute(
        &mut self,
        args: &ShortcodeArgs,
        content: &str,
        document: &Document,
        _ctx: &ShortcodeContext<'_>,
    ) -> Result<ShortcodeOutput, HandlerError> {
        let args = args.bind(&["Key", "ValueKey", "IndexKey"])?;
        args.require(&["Key", "ValueKey"])?;
        let value_key = args.require_non_empty("ValueKey")?;
        let index_key = args.get("IndexKey").filter(|k| !k.is_empty());

        let Some(items) = args.get("Key").and_then(|key| document.metadata().get_list(key)) else {
            return Ok(ShortcodeOutput::None);
        };

        let documents = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let mut delta = Metadata::new();
                delta.insert(value_key, item.clone());
                if let Some(index_key) = index_key {
                    delta.insert(index_key, index);
                }
                document.clone_with(Some(&delta), Some(content))
            })
            .collect();

        Ok(ShortcodeOutput::documents(documents))
    }
}
