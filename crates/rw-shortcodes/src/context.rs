//! Shortcode execution context.
//!
//! Provides file system access, source location, and cancellation state to
//! shortcode handlers.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;

/// Signature of the file reading callback.
///
/// The returned future owns everything it needs, so reads can run on the
/// executor's I/O facilities while the pass is suspended.
pub type ReadFileFn = dyn Fn(&Path) -> BoxFuture<'static, io::Result<String>> + Send + Sync;

/// Shared cancellation flag.
///
/// Clones observe the same flag. A processor configured with a cancellation
/// stops at the next shortcode invocation after [`cancel`](Self::cancel) is called.
///
/// # Example
///
/// ```
/// use rw_shortcodes::Cancellation;
///
/// let cancel = Cancellation::new();
/// let observer = cancel.clone();
/// assert!(!observer.is_cancelled());
/// cancel.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// Create a flag that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Context provided to a shortcode for one invocation.
///
/// Created by [`ShortcodeProcessor`](crate::ShortcodeProcessor) for each occurrence.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use futures::FutureExt;
/// use rw_shortcodes::ShortcodeContext;
///
/// let ctx = ShortcodeContext {
///     source_path: Some(Path::new("docs/guide.md")),
///     base_dir: Path::new("docs"),
///     line: 42,
///     depth: 0,
///     read_file: &|_| async { Ok(String::new()) }.boxed(),
///     cancellation: None,
/// };
///
/// let resolved = ctx.resolve_path("snippets/example.md");
/// assert_eq!(resolved, Path::new("docs/snippets/example.md"));
/// assert!(ctx.resolve_path_safe("../secrets.txt").is_none());
/// ```
pub struct ShortcodeContext<'a> {
    /// Path to the source document (if known).
    pub source_path: Option<&'a Path>,
    /// Base directory for resolving relative paths.
    pub base_dir: &'a Path,
    /// Line of the occurrence within the content being expanded (1-indexed).
    pub line: usize,
    /// Expansion depth: 0 for the document's own content.
    pub depth: usize,
    /// Callback to read a file.
    pub read_file: &'a ReadFileFn,
    /// Cancellation flag of the running pass.
    pub cancellation: Option<&'a Cancellation>,
}

impl ShortcodeContext<'_> {
    /// Resolve a relative path against the base directory.
    #[must_use]
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative)
    }

    /// Resolve a relative path with path traversal protection.
    ///
    /// Returns `None` if the path is absolute or its `..` components climb above
    /// the base directory. An existing path is also canonicalized, so a symlink
    /// pointing outside the base directory is rejected too. Paths that do not
    /// exist are returned unresolved; reading them reports the failure.
    #[must_use]
    pub fn resolve_path_safe(&self, relative: &str) -> Option<PathBuf> {
        let mut resolved = self.base_dir.to_path_buf();
        let mut depth = 0usize;

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    depth = depth.checked_sub(1)?;
                    resolved.pop();
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if let (Ok(canonical), Ok(canonical_base)) =
            (resolved.canonicalize(), self.base_dir.canonicalize())
            && !canonical.starts_with(&canonical_base)
        {
            return None;
        }

        Some(resolved)
    }

    /// Read a file using the context's callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn read(&self, path: &Path) -> io::Result<String> {
        (self.read_file)(path).await
    }

    /// Check whether the pass has been asked to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_some_and(Cancellation::is_cancelled)
    }
}
