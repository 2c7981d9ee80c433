//! Shortcode tag scanning.
//!
//! Splits content into literal spans and tag occurrences:
//!
//! - Self-closing: `<?# Name args /?>`
//! - Paired: `<?# Name args ?>inner<?#/ Name ?>`
//!
//! Paired tags must nest properly, and a tag may contain another occurrence of
//! the same name. Raw tags end at their first closing marker and nothing inside
//! them is interpreted.

use std::ops::Range;

use crate::{ShortcodeArgs, ShortcodeError};

/// Opening sequence shared by every marker.
pub(crate) const MARKER_START: &str = "<?#";
const MARKER_END: &str = "?>";

/// A tag found in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    /// Tag name as written.
    pub name: String,
    /// Parsed arguments.
    pub args: ShortcodeArgs,
    /// Inner content between the opening and closing markers (empty when self-closing).
    pub content: String,
    /// `true` for `<?# Name /?>`.
    pub self_closing: bool,
    /// Byte range of the whole tag, markers included.
    pub span: Range<usize>,
    /// Line of the opening marker (1-indexed).
    pub line: usize,
}

/// Piece of scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    /// Text outside any tag.
    Literal(&'a str),
    /// A complete tag occurrence.
    Tag(TagOccurrence),
}

/// Scan content into literal and tag spans.
///
/// `is_raw` reports whether a tag name is handled raw; raw tags are closed by
/// their first closing marker and their inner content is not inspected.
///
/// Concatenating the literal text and the source text of each tag span
/// reproduces `content` exactly.
///
/// The content is walked once, front to back. Open paired tags are tracked on a
/// heap stack, so nesting depth does not grow the call stack.
///
/// # Errors
///
/// Returns [`ShortcodeError::Malformed`] for unterminated markers, paired tags
/// without a closing marker, and closing markers without an opening tag.
///
/// # Example
///
/// ```
/// use rw_shortcodes::{Span, scan};
///
/// let spans = scan("123<?# Bar /?>456", &|_| false).unwrap();
/// assert_eq!(spans.len(), 3);
/// assert!(matches!(&spans[1], Span::Tag(tag) if tag.name == "Bar" && tag.self_closing));
/// ```
pub fn scan<'a>(
    content: &'a str,
    is_raw: &dyn Fn(&str) -> bool,
) -> Result<Vec<Span<'a>>, ShortcodeError> {
    let mut spans = SpanCollector::new(content);
    let mut open: Vec<OpenTag<'a>> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find(MARKER_START) {
        let start = pos + offset;
        let marker = parse_marker(content, start)?;

        pos = match marker.kind {
            MarkerKind::Open {
                name,
                args,
                self_closing: true,
            } => {
                if open.is_empty() {
                    spans.tag(name, args, start..marker.end, None);
                }
                marker.end
            }
            MarkerKind::Open {
                name,
                args,
                self_closing: false,
            } if is_raw(name) => {
                let close = find_raw_closer(content, &marker, name)?;
                if open.is_empty() {
                    spans.tag(name, args, start..close.end, Some(marker.end..close.start));
                }
                close.end
            }
            MarkerKind::Open { name, args, .. } => {
                open.push(OpenTag {
                    name,
                    args,
                    start,
                    body_start: marker.end,
                });
                marker.end
            }
            MarkerKind::Close { name } => {
                let Some(tag) = open.pop() else {
                    return Err(ShortcodeError::malformed(
                        name,
                        content,
                        start,
                        "closing tag without a matching opening tag",
                    ));
                };
                if !names_match(tag.name, name) {
                    // Closing an outer tag leaves the innermost one unclosed
                    if open.iter().any(|outer| names_match(outer.name, name)) {
                        return Err(missing_closer(content, &tag));
                    }
                    return Err(ShortcodeError::malformed(
                        name,
                        content,
                        start,
                        "closing tag without a matching opening tag",
                    ));
                }
                if open.is_empty() {
                    spans.tag(
                        tag.name,
                        tag.args,
                        tag.start..marker.end,
                        Some(tag.body_start..start),
                    );
                }
                marker.end
            }
        };
    }

    if let Some(tag) = open.first() {
        return Err(missing_closer(content, tag));
    }

    Ok(spans.finish())
}

/// Check whether content contains anything that looks like a marker.
#[must_use]
pub fn contains_marker(content: &str) -> bool {
    content.contains(MARKER_START)
}

/// Compare tag names the way the registry does.
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[derive(Debug, Clone, Copy)]
enum MarkerKind<'a> {
    Open {
        name: &'a str,
        args: &'a str,
        self_closing: bool,
    },
    Close {
        name: &'a str,
    },
}

#[derive(Debug)]
struct Marker<'a> {
    kind: MarkerKind<'a>,
    start: usize,
    end: usize,
}

/// Parse the marker beginning at `start` (which must point at `<?#`).
fn parse_marker(content: &str, start: usize) -> Result<Marker<'_>, ShortcodeError> {
    let mut pos = start + MARKER_START.len();
    let closing = content[pos..].starts_with('/');
    if closing {
        pos += 1;
    }

    let after = &content[pos..];
    let name_start = pos + (after.len() - after.trim_start().len());
    let rest = &content[name_start..];
    let name_len = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '?' | '/' | '"' | '\''))
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    let name_end = name_start + name_len;

    if name.is_empty() {
        return Err(ShortcodeError::malformed(
            "",
            content,
            start,
            "missing shortcode name",
        ));
    }

    let Some(terminator) = find_terminator(content, name_end) else {
        return Err(ShortcodeError::malformed(
            name,
            content,
            start,
            "unterminated tag (missing `?>`)",
        ));
    };
    let body = &content[name_end..terminator];
    let end = terminator + MARKER_END.len();

    let kind = if closing {
        if !body.trim().is_empty() {
            return Err(ShortcodeError::malformed(
                name,
                content,
                start,
                "closing tag cannot have arguments",
            ));
        }
        MarkerKind::Close { name }
    } else {
        let trimmed = body.trim_end();
        match trimmed.strip_suffix('/') {
            Some(args) => MarkerKind::Open {
                name,
                args,
                self_closing: true,
            },
            None => MarkerKind::Open {
                name,
                args: trimmed,
                self_closing: false,
            },
        }
    };

    Ok(Marker { kind, start, end })
}

/// Find the `?>` that ends a marker, skipping quoted argument values.
///
/// A quote only opens a quoted section at the start of a value (after whitespace
/// or `=`), so apostrophes inside bare words are literal. Hitting another `<?#`
/// outside quotes means this marker is unterminated.
fn find_terminator(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    let mut prev = b' ';
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if bytes[i..].starts_with(MARKER_END.as_bytes()) {
                    return Some(i);
                }
                if bytes[i..].starts_with(MARKER_START.as_bytes()) {
                    return None;
                }
                if (b == b'"' || b == b'\'') && (prev.is_ascii_whitespace() || prev == b'=') {
                    quote = Some(b);
                }
            }
        }
        prev = b;
        i += 1;
    }

    None
}

/// A paired tag waiting for its closing marker.
#[derive(Debug)]
struct OpenTag<'a> {
    name: &'a str,
    args: &'a str,
    start: usize,
    body_start: usize,
}

fn missing_closer(content: &str, tag: &OpenTag<'_>) -> ShortcodeError {
    ShortcodeError::malformed(
        tag.name,
        content,
        tag.start,
        format!("missing closing tag `<?#/ {} ?>`", tag.name),
    )
}

/// Find the first closing marker of a raw tag.
///
/// Nothing between the markers is interpreted, so text that does not parse as a
/// marker is skipped.
fn find_raw_closer<'a>(
    content: &'a str,
    open: &Marker<'a>,
    name: &str,
) -> Result<Marker<'a>, ShortcodeError> {
    let mut pos = open.end;

    while let Some(offset) = content[pos..].find(MARKER_START) {
        let start = pos + offset;
        match parse_marker(content, start) {
            Ok(marker) => {
                if let MarkerKind::Close { name: other } = marker.kind
                    && names_match(other, name)
                {
                    return Ok(marker);
                }
                pos = marker.end;
            }
            Err(_) => pos = start + MARKER_START.len(),
        }
    }

    Err(ShortcodeError::malformed(
        name,
        content,
        open.start,
        format!("missing closing tag `<?#/ {name} ?>`"),
    ))
}

/// Builds the span list for top-level tags, tracking line numbers as it goes.
struct SpanCollector<'a> {
    content: &'a str,
    spans: Vec<Span<'a>>,
    literal_start: usize,
    line: usize,
    line_pos: usize,
}

impl<'a> SpanCollector<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            spans: Vec::new(),
            literal_start: 0,
            line: 1,
            line_pos: 0,
        }
    }

    /// Record a top-level tag and the literal text before it.
    ///
    /// Tags arrive in content order, so the line count only moves forward.
    fn tag(&mut self, name: &str, args: &str, span: Range<usize>, inner: Option<Range<usize>>) {
        let content = self.content;
        if span.start > self.literal_start {
            self.spans
                .push(Span::Literal(&content[self.literal_start..span.start]));
        }

        self.line += content.as_bytes()[self.line_pos..span.start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line_pos = span.start;

        let self_closing = inner.is_none();
        let inner = inner.map_or("", |range| &content[range]);
        self.literal_start = span.end;
        self.spans.push(Span::Tag(TagOccurrence {
            name: name.to_owned(),
            args: ShortcodeArgs::parse(args),
            content: inner.to_owned(),
            self_closing,
            span,
            line: self.line,
        }));
    }

    fn finish(mut self) -> Vec<Span<'a>> {
        if self.literal_start < self.content.len() {
            self.spans.push(Span::Literal(&self.content[self.literal_start..]));
        }
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShortcodeErrorKind;
    use pretty_assertions::assert_eq;

    fn no_raw(_: &str) -> bool {
        false
    }

    fn raw_named_raw(name: &str) -> bool {
        name.eq_ignore_ascii_case("Raw")
    }

    fn tag<'a>(span: &'a Span<'_>) -> &'a TagOccurrence {
        match span {
            Span::Tag(tag) => tag,
            Span::Literal(text) => panic!("expected tag, got literal {text:?}"),
        }
    }

    fn reconstruct(content: &str, spans: &[Span<'_>]) -> String {
        spans
            .iter()
            .map(|s| match s {
                Span::Literal(text) => *text,
                Span::Tag(tag) => &content[tag.span.clone()],
            })
            .collect()
    }

    #[test]
    fn test_no_tags() {
        let spans = scan("plain text", &no_raw).unwrap();
        assert_eq!(spans, vec![Span::Literal("plain text")]);
    }

    #[test]
    fn test_empty_content() {
        let spans = scan("", &no_raw).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_self_closing() {
        let spans = scan("123<?# Bar /?>456", &no_raw).unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], Span::Literal("123"));
        let bar = tag(&spans[1]);
        assert_eq!(bar.name, "Bar");
        assert!(bar.self_closing);
        assert_eq!(bar.content, "");
        assert_eq!(bar.span, 3..14);
        assert_eq!(spans[2], Span::Literal("456"));
    }

    #[test]
    fn test_self_closing_without_space() {
        let spans = scan("<?#Bar/?>", &no_raw).unwrap();
        let bar = tag(&spans[0]);
        assert_eq!(bar.name, "Bar");
        assert!(bar.self_closing);
    }

    #[test]
    fn test_paired_with_args() {
        let content = r#"<?# Foo arg1 key2="val 2" ?>inner<?#/ Foo ?>"#;
        let spans = scan(content, &no_raw).unwrap();
        assert_eq!(spans.len(), 1);
        let foo = tag(&spans[0]);
        assert_eq!(foo.name, "Foo");
        assert!(!foo.self_closing);
        assert_eq!(foo.content, "inner");
        assert_eq!(foo.args.positional(0), Some("arg1"));
        assert_eq!(foo.args.get("key2"), Some("val 2"));
        assert_eq!(foo.span, 0..content.len());
    }

    #[test]
    fn test_same_name_nesting_uses_depth() {
        let content = "<?# A ?>x<?# A ?>y<?#/ A ?>z<?#/ A ?>tail";
        let spans = scan(content, &no_raw).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(tag(&spans[0]).content, "x<?# A ?>y<?#/ A ?>z");
        assert_eq!(spans[1], Span::Literal("tail"));
    }

    #[test]
    fn test_nested_self_closing_same_name_does_not_count() {
        let content = "<?# A ?><?# A /?><?#/ A ?>";
        let spans = scan(content, &no_raw).unwrap();
        assert_eq!(tag(&spans[0]).content, "<?# A /?>");
    }

    #[test]
    fn test_reconstructs_input() {
        let content = "a<?# X /?>b<?# Y k=v ?>c<?# Z /?>d<?#/ Y ?>e\n<?# X/?>";
        let spans = scan(content, &no_raw).unwrap();
        assert_eq!(reconstruct(content, &spans), content);
    }

    #[test]
    fn test_names_case_insensitive_pairing() {
        let spans = scan("<?# foo ?>x<?#/ FOO ?>", &no_raw).unwrap();
        assert_eq!(tag(&spans[0]).content, "x");
    }

    #[test]
    fn test_terminator_inside_quotes() {
        let spans = scan(r#"<?# Foo title="a ?> b" /?>"#, &no_raw).unwrap();
        let foo = tag(&spans[0]);
        assert!(foo.self_closing);
        assert_eq!(foo.args.get("title"), Some("a ?> b"));
    }

    #[test]
    fn test_apostrophe_in_bare_word() {
        let spans = scan("<?# Say it's /?>", &no_raw).unwrap();
        assert_eq!(tag(&spans[0]).args.positional(0), Some("it's"));
    }

    #[test]
    fn test_line_numbers() {
        let spans = scan("one\ntwo <?# A /?>\n<?# B /?>", &no_raw).unwrap();
        assert_eq!(tag(&spans[1]).line, 2);
        assert_eq!(tag(&spans[3]).line, 3);
    }

    #[test]
    fn test_unmatched_open_fails() {
        let err = scan("123<?# Foo ?>456", &no_raw).unwrap_err();
        assert_eq!(err.kind(), ShortcodeErrorKind::MalformedShortcode);
        assert!(matches!(
            err,
            ShortcodeError::Malformed { ref name, position: 3, .. } if name == "Foo"
        ));
    }

    #[test]
    fn test_stray_close_fails() {
        let err = scan("abc<?#/ Foo ?>", &no_raw).unwrap_err();
        assert_eq!(err.kind(), ShortcodeErrorKind::MalformedShortcode);
        assert!(err.to_string().contains("without a matching opening tag"));
    }

    #[test]
    fn test_unterminated_marker_fails() {
        let err = scan("abc <?# Foo bar", &no_raw).unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_missing_name_fails() {
        let err = scan("<?# /?>", &no_raw).unwrap_err();
        assert!(err.to_string().contains("missing shortcode name"));
    }

    #[test]
    fn test_closing_tag_with_arguments_fails() {
        let err = scan("<?# A ?>x<?#/ A extra ?>", &no_raw).unwrap_err();
        assert_eq!(err.kind(), ShortcodeErrorKind::MalformedShortcode);
    }

    #[test]
    fn test_unterminated_inside_paired_tag_fails() {
        let content = "<?# A ?> <?# B <?#/ A ?>";
        let err = scan(content, &no_raw).unwrap_err();
        match err {
            ShortcodeError::Malformed { name, position, .. } => {
                assert_eq!(name, "B");
                assert_eq!(position, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unclosed_inside_paired_tag_fails() {
        let err = scan("<?# A ?><?# B ?><?#/ A ?>", &no_raw).unwrap_err();
        assert!(matches!(err, ShortcodeError::Malformed { ref name, .. } if name == "B"));
    }

    #[test]
    fn test_raw_content_not_inspected() {
        let content = "123<?# Raw ?>ABC<?# Bar /?>XYZ<?#/ Raw ?>456";
        let spans = scan(content, &raw_named_raw).unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(tag(&spans[1]).content, "ABC<?# Bar /?>XYZ");
    }

    #[test]
    fn test_raw_directly_nested_self_closing() {
        let spans = scan("123<?# Raw ?><?# Bar /?><?#/ Raw ?>456", &raw_named_raw).unwrap();
        assert_eq!(tag(&spans[1]).content, "<?# Bar /?>");
    }

    #[test]
    fn test_raw_allows_malformed_inner() {
        let spans = scan("<?# Raw ?><?# Unclosed ?><?#/ Nope ?><?#/ Raw ?>", &raw_named_raw)
            .unwrap();
        assert_eq!(tag(&spans[0]).content, "<?# Unclosed ?><?#/ Nope ?>");
    }

    #[test]
    fn test_raw_ends_at_first_closer() {
        let spans = scan("<?# Raw ?><?# Raw ?>x<?#/ Raw ?>", &raw_named_raw).unwrap();
        assert_eq!(tag(&spans[0]).content, "<?# Raw ?>x");
    }

    #[test]
    fn test_raw_region_skipped_when_matching_outer() {
        let content = "<?# A ?><?# Raw ?><?#/ A ?><?#/ Raw ?><?#/ A ?>";
        let spans = scan(content, &raw_named_raw).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(tag(&spans[0]).content, "<?# Raw ?><?#/ A ?><?#/ Raw ?>");
    }

    #[test]
    fn test_multibyte_content() {
        let content = "é<?# Tag title=\"ü ?> ß\" /?>ñ";
        let spans = scan(content, &no_raw).unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(tag(&spans[1]).args.get("title"), Some("ü ?> ß"));
        assert_eq!(reconstruct(content, &spans), content);
    }

    #[test]
    fn test_interleaved_tags_fail() {
        let err = scan("<?# A ?><?# B ?><?#/ A ?><?#/ B ?>", &no_raw).unwrap_err();
        assert!(matches!(
            err,
            ShortcodeError::Malformed { ref name, position: 8, .. } if name == "B"
        ));
    }

    #[test]
    fn test_mismatched_close_inside_paired_tag_fails() {
        let err = scan("<?# A ?>x<?#/ B ?>y<?#/ A ?>", &no_raw).unwrap_err();
        assert!(matches!(
            err,
            ShortcodeError::Malformed { ref name, position: 9, .. } if name == "B"
        ));
        assert!(err.to_string().contains("without a matching opening tag"));
    }

    #[test]
    fn test_line_numbers_after_paired_tags() {
        let content = "<?# A ?>\n\n<?#/ A ?>\n<?# B /?><?# Raw ?>\n<?#/ Raw ?>\n<?# C /?>";
        let spans = scan(content, &raw_named_raw).unwrap();
        let lines: Vec<_> = spans
            .iter()
            .filter_map(|span| match span {
                Span::Tag(tag) => Some((tag.name.as_str(), tag.line)),
                Span::Literal(_) => None,
            })
            .collect();
        assert_eq!(lines, vec![("A", 1), ("B", 4), ("Raw", 4), ("C", 6)]);
    }

    #[test]
    fn test_deep_nesting_scans_iteratively() {
        let depth = 50_000;
        let content = format!("{}x{}", "<?# A ?>".repeat(depth), "<?#/ A ?>".repeat(depth));
        let spans = scan(&content, &no_raw).unwrap();
        assert_eq!(spans.len(), 1);
        let outer = tag(&spans[0]);
        assert_eq!(outer.span, 0..content.len());
        assert_eq!(outer.content.len(), content.len() - "<?# A ?>".len() - "<?#/ A ?>".len());
    }

    #[test]
    fn test_deep_nesting_unclosed_reports_outermost() {
        let content = format!("{}x", "<?# A ?>".repeat(20_000));
        let err = scan(&content, &no_raw).unwrap_err();
        assert!(matches!(err, ShortcodeError::Malformed { position: 0, .. }));
    }

    #[test]
    fn test_contains_marker() {
        assert!(contains_marker("a <?# B /?>"));
        assert!(!contains_marker("a <? B ?>"));
    }
}
