use async_trait::async_trait;
use serde_json::Value;

use crate::metadata::display_value;
use crate::{Document, HandlerError, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput};

/// `<?# If Key [Value] ?>...<?#/ If ?>`: outputs its content conditionally.
///
/// With `Value`, the content is kept when the metadata value for `Key` renders
/// to exactly that string. Without it, the content is kept when the value is
/// truthy: present and not `null`, `false`, `0`, `""`, or an empty list or map.
#[derive(Debug, Default)]
pub struct IfShortcode;

#[async_trait]
impl Shortcode for IfShortcode {
    async fn execute(
        &mut self,
        args: &ShortcodeArgs,
        content: &str,
        document: &Document,
        _ctx: &ShortcodeContext<'_>,
    ) -> Result<ShortcodeOutput, HandlerError> {
        let args = args.bind(&["Key", "Value"])?;
        let key = args.require_non_empty("Key")?;
        let value = document.metadata().get(key);

        let matched = match args.get("Value") {
            Some(expected) => value.is_some_and(|v| display_value(v) == expected),
            None => value.is_some_and(is_truthy),
        };

        Ok(if matched {
            ShortcodeOutput::content(content)
        } else {
            ShortcodeOutput::None
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
