//! Shortcode processor.
//!
//! Runs one pass per document: scan, invoke handlers in content order, expand
//! their output again, and splice everything back together.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tracing::{debug, trace, warn};

use crate::arena::InstanceArena;
use crate::context::ReadFileFn;
use crate::scanner::{Span, TagOccurrence, contains_marker, scan};
use crate::splice::{RunningMetadata, SpliceBuffer};
use crate::{
    Cancellation, Document, ShortcodeContext, ShortcodeError, ShortcodeKind, ShortcodeOutput,
    ShortcodeRegistry,
};

/// Default maximum expansion depth.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Configuration for the shortcode processor.
#[derive(Clone)]
pub struct ShortcodeProcessorConfig {
    /// Base directory for resolving relative paths (e.g., for `Include`).
    pub base_dir: PathBuf,
    /// Path to the source document being processed (if known).
    pub source_path: Option<PathBuf>,
    /// Callback to read files from the file system.
    ///
    /// Default: `tokio::fs::read_to_string`
    pub read_file: Option<Arc<ReadFileFn>>,
    /// Maximum nesting of handler output expansions.
    ///
    /// The document's own content is depth 0. Default: 10
    pub max_depth: usize,
    /// Flag checked before every handler invocation.
    pub cancellation: Option<Cancellation>,
}

impl Default for ShortcodeProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcodeProcessorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            source_path: None,
            read_file: None,
            max_depth: DEFAULT_MAX_DEPTH,
            cancellation: None,
        }
    }

    /// Set the base directory for resolving relative paths.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the source document path.
    #[must_use]
    pub fn with_source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Set the file reading callback.
    ///
    /// The returned future must not borrow the path; clone it into the future
    /// when it is needed after the first poll.
    #[must_use]
    pub fn with_read_file<F, Fut>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = io::Result<String>> + Send + 'static,
    {
        self.read_file = Some(Arc::new(move |path: &Path| read_file(path).boxed()));
        self
    }

    /// Set the maximum expansion depth.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the cancellation flag.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    fn create_context(&self, line: usize, depth: usize) -> ShortcodeContext<'_> {
        ShortcodeContext {
            source_path: self.source_path.as_deref(),
            base_dir: &self.base_dir,
            line,
            depth,
            read_file: self.read_file.as_deref().unwrap_or(&default_read_file),
            cancellation: self.cancellation.as_ref(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(Cancellation::is_cancelled)
    }
}

fn default_read_file(path: &Path) -> BoxFuture<'static, io::Result<String>> {
    tokio::fs::read_to_string(path.to_path_buf()).boxed()
}

/// Expands shortcode tags in documents.
///
/// The registry is shared and read-only; every call to [`process`](Self::process)
/// is an independent pass with its own handler instances and metadata thread.
///
/// # Example
///
/// ```
/// use rw_shortcodes::{Document, ShortcodeProcessor, ShortcodeRegistry};
///
/// # futures::executor::block_on(async {
/// let processor = ShortcodeProcessor::new(ShortcodeRegistry::with_builtins());
/// let document = Document::new("Hello, <?# Meta Name /?>!").with_item("Name", "world");
///
/// let output = processor.process(&document).await.unwrap();
/// assert_eq!(output.content(), "Hello, world!");
/// # });
/// ```
#[derive(Clone)]
pub struct ShortcodeProcessor {
    registry: Arc<ShortcodeRegistry>,
    config: ShortcodeProcessorConfig,
}

impl ShortcodeProcessor {
    /// Create a processor with default configuration.
    #[must_use]
    pub fn new(registry: impl Into<Arc<ShortcodeRegistry>>) -> Self {
        Self::with_config(registry, ShortcodeProcessorConfig::default())
    }

    /// Create a processor with custom configuration.
    #[must_use]
    pub fn with_config(
        registry: impl Into<Arc<ShortcodeRegistry>>,
        config: ShortcodeProcessorConfig,
    ) -> Self {
        Self {
            registry: registry.into(),
            config,
        }
    }

    /// Registry used to resolve tag names.
    #[must_use]
    pub fn registry(&self) -> &ShortcodeRegistry {
        &self.registry
    }

    /// Processor configuration.
    #[must_use]
    pub fn config(&self) -> &ShortcodeProcessorConfig {
        &self.config
    }

    /// Expand every shortcode in a document.
    ///
    /// Returns a new document; the input is never modified. Handler instances
    /// created during the pass are disposed before this returns, on success and
    /// on failure alike.
    ///
    /// # Errors
    ///
    /// Returns the first error of the pass. No partial output is produced.
    pub async fn process(&self, document: &Document) -> Result<Document, ShortcodeError> {
        debug!(len = document.content().len(), "Starting shortcode pass");
        let mut pass = Pass::new(self, document);
        let result = pass.expand(document.content(), 0).await;

        let instances = pass.arena.len();
        pass.arena.dispose_all();

        match result {
            Ok(content) => {
                debug!(instances, "Shortcode pass complete");
                Ok(pass.metadata.finish(content))
            }
            Err(err) => {
                warn!(error = %err, instances, "Shortcode pass failed");
                Err(err)
            }
        }
    }

    /// Expand several independent documents concurrently.
    ///
    /// Results are returned in input order; one document failing does not
    /// affect the others.
    pub async fn process_all(
        &self,
        documents: &[Document],
    ) -> Vec<Result<Document, ShortcodeError>> {
        join_all(documents.iter().map(|document| self.process(document))).await
    }
}

/// State of one document pass.
struct Pass<'p> {
    processor: &'p ShortcodeProcessor,
    original: &'p str,
    arena: InstanceArena,
    metadata: RunningMetadata,
}

impl<'p> Pass<'p> {
    fn new(processor: &'p ShortcodeProcessor, document: &'p Document) -> Self {
        Self {
            processor,
            original: document.content(),
            arena: InstanceArena::new(),
            metadata: RunningMetadata::new(document.metadata()),
        }
    }

    /// Expand all tags in `content`, recursing into non-raw handler output.
    fn expand<'a>(
        &'a mut self,
        content: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<String, ShortcodeError>> {
        async move {
            if !contains_marker(content) {
                return Ok(content.to_owned());
            }

            let processor = self.processor;
            let limit = processor.config.max_depth;
            if depth > limit {
                return Err(ShortcodeError::RecursionLimit { limit });
            }

            let registry = &processor.registry;
            let spans = scan(content, &|name| registry.is_raw(name))?;

            let mut buffer = SpliceBuffer::with_capacity(content.len());
            for span in spans {
                let tag = match span {
                    Span::Literal(text) => {
                        buffer.push(text);
                        continue;
                    }
                    Span::Tag(tag) => tag,
                };

                let (output, kind) = self.invoke(&tag, depth).await?;
                let raw = kind == ShortcodeKind::Raw || output.is_raw();

                for document in output.into_documents() {
                    let (text, delta) = document.into_parts();
                    self.metadata.merge(&delta);
                    if raw {
                        buffer.push(&text);
                    } else {
                        let expanded = self
                            .expand(&text, depth + 1)
                            .await
                            .map_err(|err| err.in_output_of(&tag.name))?;
                        buffer.push(&expanded);
                    }
                }
            }

            Ok(buffer.finish())
        }
        .boxed()
    }

    /// Run the handler for one occurrence.
    async fn invoke(
        &mut self,
        tag: &TagOccurrence,
        depth: usize,
    ) -> Result<(ShortcodeOutput, ShortcodeKind), ShortcodeError> {
        let processor = self.processor;
        if processor.config.is_cancelled() {
            return Err(ShortcodeError::Cancelled);
        }

        let entry = processor.registry.resolve(&tag.name)?;
        let view = self.metadata.view(self.original);
        let ctx = processor.config.create_context(tag.line, depth);

        trace!(shortcode = %tag.name, line = tag.line, depth, "Executing shortcode");
        let instance = self.arena.get_or_create(entry);
        let output = instance
            .execute(&tag.args, &tag.content, &view, &ctx)
            .await
            .map_err(|err| ShortcodeError::from_handler(&tag.name, err))?;

        Ok((output, entry.kind()))
    }
}
