//! Recursive shortcode expansion.
//!
//! Shortcodes are tags embedded in document content:
//!
//! - Self-closing: `<?# Name arg1 key2="val 2" /?>`
//! - Paired: `<?# Name args ?>inner content<?#/ Name ?>`
//!
//! A [`ShortcodeProcessor`] expands every tag in a [`Document`] by resolving its
//! name in a [`ShortcodeRegistry`] and splicing the handler's output back into
//! the content. Output is expanded again unless it is raw, and metadata produced
//! by each handler is visible to every later handler in the same document.
//!
//! # Passes
//!
//! Each call to [`ShortcodeProcessor::process`] is one pass over one document:
//!
//! - Tags run strictly in content order, each awaited before the next.
//! - A handler instance is created the first time its name appears and reused
//!   for every later occurrence, including ones produced by other handlers.
//! - Instances are disposed once when the pass ends, successfully or not.
//! - Any error aborts the pass; there is no partial output.
//!
//! Tag names are case-insensitive (ASCII): `Meta` and `meta` are the same
//! shortcode and share one instance.
//!
//! # Example
//!
//! ```
//! use rw_shortcodes::{Document, ShortcodeProcessor, ShortcodeRegistry};
//!
//! # futures::executor::block_on(async {
//! let processor = ShortcodeProcessor::new(ShortcodeRegistry::with_builtins());
//! let document = Document::new(
//!     "<?# ForEach Tags Tag ?>#<?# Meta Tag /?> <?#/ ForEach ?><?# Raw ?><?# Meta Tag /?><?#/ Raw ?>",
//! )
//! .with_item("Tags", serde_json::json!(["rust", "docs"]));
//!
//! let output = processor.process(&document).await.unwrap();
//! assert_eq!(output.content(), "#rust #docs <?# Meta Tag /?>");
//! assert_eq!(output.metadata().get_str("Tag"), Some("docs"));
//! # });
//! ```

mod arena;
mod args;
pub mod builtins;
mod context;
mod document;
mod error;
mod metadata;
mod output;
mod processor;
mod registry;
mod scanner;
mod shortcode;
mod splice;

pub use args::{BoundArgs, ShortcodeArg, ShortcodeArgs};
pub use context::{Cancellation, ReadFileFn, ShortcodeContext};
pub use document::Document;
pub use error::{HandlerError, ShortcodeError, ShortcodeErrorKind};
pub use metadata::Metadata;
pub use output::ShortcodeOutput;
pub use processor::{DEFAULT_MAX_DEPTH, ShortcodeProcessor, ShortcodeProcessorConfig};
pub use registry::{ShortcodeEntry, ShortcodeFactory, ShortcodeKind, ShortcodeRegistry};
pub use scanner::{Span, TagOccurrence, contains_marker, scan};
pub use shortcode::Shortcode;
