//! Shortcode argument parsing.
//!
//! Parses the text between a tag name and its terminator:
//! `<?# Name first key="second value" third=3 /?>`

use std::collections::HashMap;

use crate::HandlerError;

/// One argument: a bare positional value or a `key=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodeArg {
    /// Key for `key=value` arguments, `None` for positional values.
    pub key: Option<String>,
    /// Argument value with quotes removed.
    pub value: String,
}

/// Ordered arguments of a tag occurrence.
///
/// # Example
///
/// ```
/// use rw_shortcodes::ShortcodeArgs;
///
/// let args = ShortcodeArgs::parse(r#"Items key="val 2" flag=on"#);
/// assert_eq!(args.len(), 3);
/// assert_eq!(args.positional(0), Some("Items"));
/// assert_eq!(args.get("key"), Some("val 2"));
/// assert_eq!(args.get("FLAG"), Some("on"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcodeArgs {
    items: Vec<ShortcodeArg>,
}

impl ShortcodeArgs {
    /// Parse raw argument text.
    ///
    /// Whitespace outside quotes separates arguments. Supported forms are
    /// `value`, `"value"`, `'value'`, `key=value`, `key="value"` and `key='value'`.
    /// Inside quotes a backslash escapes the quote character or another backslash.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut items = Vec::new();
        let mut remaining = text.trim_start();

        while !remaining.is_empty() {
            let (arg, rest) = parse_arg(remaining);
            items.push(arg);
            remaining = rest.trim_start();
        }

        Self { items }
    }

    /// All arguments in order.
    #[must_use]
    pub fn items(&self) -> &[ShortcodeArg] {
        &self.items
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Value of the first argument with this key (case-insensitive).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.key.as_deref().is_some_and(|k| k.eq_ignore_ascii_case(key)))
            .map(|a| a.value.as_str())
    }

    /// Value of the `index`-th positional (keyless) argument.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.items
            .iter()
            .filter(|a| a.key.is_none())
            .nth(index)
            .map(|a| a.value.as_str())
    }

    /// Map arguments onto a fixed list of keys.
    ///
    /// Positional values fill `keys` in order, named values match a key
    /// case-insensitively. A named value for a key not in `keys`, more positional
    /// values than keys, or the same key given twice is an argument error.
    ///
    /// # Example
    ///
    /// ```
    /// use rw_shortcodes::ShortcodeArgs;
    ///
    /// let args = ShortcodeArgs::parse("Items valuekey=Item");
    /// let bound = args.bind(&["Key", "ValueKey", "IndexKey"]).unwrap();
    /// assert_eq!(bound.get("Key"), Some("Items"));
    /// assert_eq!(bound.get("ValueKey"), Some("Item"));
    /// assert_eq!(bound.get("IndexKey"), None);
    /// ```
    pub fn bind(&self, keys: &[&str]) -> Result<BoundArgs, HandlerError> {
        let mut values: HashMap<String, String> = HashMap::new();
        let mut next_positional = 0;

        for arg in &self.items {
            let key = match &arg.key {
                Some(key) => keys
                    .iter()
                    .find(|k| k.eq_ignore_ascii_case(key))
                    .ok_or_else(|| HandlerError::argument(format!("Unknown argument `{key}`")))?,
                None => {
                    // Skip keys already supplied by name
                    while next_positional < keys.len()
                        && values.contains_key(&normalize(keys[next_positional]))
                    {
                        next_positional += 1;
                    }
                    let key = keys.get(next_positional).ok_or_else(|| {
                        HandlerError::argument(format!(
                            "Too many positional arguments (expected at most {})",
                            keys.len()
                        ))
                    })?;
                    next_positional += 1;
                    key
                }
            };

            let normalized = normalize(key);
            if values.contains_key(&normalized) {
                return Err(HandlerError::argument(format!("Duplicate argument `{key}`")));
            }
            values.insert(normalized, arg.value.clone());
        }

        Ok(BoundArgs { values })
    }
}

/// Arguments bound to known keys by [`ShortcodeArgs::bind`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BoundArgs {
    values: HashMap<String, String>,
}

impl BoundArgs {
    /// Bound value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize(key)).map(String::as_str)
    }

    /// Fail unless every key was supplied.
    pub fn require(&self, keys: &[&str]) -> Result<(), HandlerError> {
        for key in keys {
            if self.get(key).is_none() {
                return Err(HandlerError::argument(format!("Missing required argument `{key}`")));
            }
        }
        Ok(())
    }

    /// Value for a key that must be present and non-empty.
    pub fn require_non_empty(&self, key: &str) -> Result<&str, HandlerError> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(HandlerError::argument(format!("Invalid {key}"))),
        }
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Parse one argument from the front of `s` (no leading whitespace).
fn parse_arg(s: &str) -> (ShortcodeArg, &str) {
    if s.starts_with(['"', '\'']) {
        let (value, rest) = parse_quoted(s);
        return (ShortcodeArg { key: None, value }, rest);
    }

    // Key runs until `=`, whitespace, or a quote
    let key_end = s
        .find(|c: char| c == '=' || c.is_whitespace() || c == '"' || c == '\'')
        .unwrap_or(s.len());

    if key_end > 0 && s[key_end..].starts_with('=') {
        let key = s[..key_end].to_owned();
        let after_eq = &s[key_end + 1..];
        let (value, rest) = if after_eq.starts_with(['"', '\'']) {
            parse_quoted(after_eq)
        } else {
            parse_bare(after_eq)
        };
        return (ShortcodeArg { key: Some(key), value }, rest);
    }

    let (value, rest) = parse_bare(s);
    (ShortcodeArg { key: None, value }, rest)
}

/// Unquoted value: runs until whitespace.
fn parse_bare(s: &str) -> (String, &str) {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (s[..end].to_owned(), &s[end..])
}

/// Quoted value starting at the opening quote. An unterminated quote runs to the end.
fn parse_quoted(s: &str) -> (String, &str) {
    let mut chars = s.char_indices();
    let Some((_, quote)) = chars.next() else {
        return (String::new(), s);
    };

    let mut value = String::new();
    let mut escaped = false;
    for (idx, c) in chars {
        if escaped {
            if c != quote && c != '\\' {
                value.push('\\');
            }
            value.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return (value, &s[idx + c.len_utf8()..]);
        } else {
            value.push(c);
        }
    }

    if escaped {
        value.push('\\');
    }
    (value, "")
}
