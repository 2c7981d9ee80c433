//! Splicing shortcode results back into content.
//!
//! [`SpliceBuffer`] collects the output of one expansion level. [`RunningMetadata`]
//! is the metadata snapshot threaded through a whole pass: it starts as the
//! document's metadata and is overwritten by every result document in content order.

use crate::{Document, Metadata};

/// Output content of one expansion level.
#[derive(Debug, Default)]
pub(crate) struct SpliceBuffer {
    content: String,
}

impl SpliceBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            content: String::with_capacity(capacity),
        }
    }

    /// Append literal text or already-expanded output.
    pub(crate) fn push(&mut self, text: &str) {
        self.content.push_str(text);
    }

    pub(crate) fn finish(self) -> String {
        self.content
    }
}

/// Metadata as seen by the next shortcode invocation.
#[derive(Debug)]
pub(crate) struct RunningMetadata {
    current: Metadata,
}

impl RunningMetadata {
    pub(crate) fn new(initial: &Metadata) -> Self {
        Self {
            current: initial.clone(),
        }
    }

    /// Overwrite the snapshot key-by-key with a result document's metadata.
    pub(crate) fn merge(&mut self, delta: &Metadata) {
        self.current.merge(delta);
    }

    /// Document handed to a shortcode: original content, current metadata.
    pub(crate) fn view(&self, original_content: &str) -> Document {
        Document::new(original_content).with_metadata(self.current.clone())
    }

    /// Final document of the pass.
    pub(crate) fn finish(self, content: String) -> Document {
        Document::new(content).with_metadata(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_concatenates_without_separator() {
        let mut buffer = SpliceBuffer::with_capacity(8);
        buffer.push("123");
        buffer.push("");
        buffer.push("aaa");
        buffer.push("BBB");
        assert_eq!(buffer.finish(), "123aaaBBB");
    }

    #[test]
    fn test_running_metadata_threads_overwrites() {
        let initial: Metadata = [("Foo", 10)].into_iter().collect();
        let mut running = RunningMetadata::new(&initial);

        running.merge(&[("Foo", 11)].into_iter().collect());
        let view = running.view("original");
        assert_eq!(view.content(), "original");
        assert_eq!(view.metadata().get_i64("Foo"), Some(11));

        running.merge(&[("Bar", 1)].into_iter().collect());
        let done = running.finish("final".to_owned());
        assert_eq!(done.content(), "final");
        assert_eq!(done.metadata().get_i64("Foo"), Some(11));
        assert_eq!(done.metadata().get_i64("Bar"), Some(1));
        assert_eq!(initial.get_i64("Foo"), Some(10));
    }
}
