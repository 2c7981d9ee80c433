use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{Document, HandlerError, Shortcode, ShortcodeArgs, ShortcodeContext, ShortcodeOutput};

/// `<?# Include Path /?>`: inlines a file relative to the base directory.
///
/// The file content is expanded again, so included files may contain shortcodes.
/// Paths that leave the base directory are rejected as invalid arguments.
#[derive(Debug, Default)]
pub struct IncludeShortcode;

#[derive(Debug, thiserror::Error)]
#[error("failed to include {}", .path.display())]
struct IncludeError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

#[async_trait]
impl Shortcode for IncludeShortcode {
    async fn execute(
        &mut self,
        args: &ShortcodeArgs,
        _content: &str,
        _document: &Document,
        ctx: &ShortcodeContext<'_>,
    ) -> Result<ShortcodeOutput, HandlerError> {
        let args = args.bind(&["Path"])?;
        let relative = args.require_non_empty("Path")?;
        let Some(path) = ctx.resolve_path_safe(relative) else {
            return Err(HandlerError::argument(format!(
                "Path `{relative}` is outside the base directory"
            )));
        };

        match ctx.read(&path).await {
            Ok(contents) => Ok(ShortcodeOutput::content(contents)),
            Err(source) => Err(HandlerError::fault(IncludeError { path, source })),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::builtins::test_support::execute;
    use crate::{
        ShortcodeErrorKind, ShortcodeProcessor, ShortcodeProcessorConfig, ShortcodeRegistry,
    };

    #[tokio::test]
    async fn test_includes_and_expands_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("outer.md"), "A<?# Include inner.md /?>C").unwrap();
        std::fs::write(temp_dir.path().join("inner.md"), "B").unwrap();

        let processor = ShortcodeProcessor::with_config(
            ShortcodeRegistry::with_builtins(),
            ShortcodeProcessorConfig::new().with_base_dir(temp_dir.path()),
        );
        let output = processor
            .process(&Document::new("[<?# Include path=outer.md /?>]"))
            .await
            .unwrap();
        assert_eq!(output.content(), "[ABC]");
    }

    #[tokio::test]
    async fn test_read_failure_is_fault() {
        let err = execute(&mut IncludeShortcode, "missing.md", "", &Document::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Fault(_)));
        assert_eq!(err.to_string(), "failed to include ./missing.md");
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_missing_file_fails_pass() {
        let temp_dir = tempfile::tempdir().unwrap();
        let processor = ShortcodeProcessor::with_config(
            ShortcodeRegistry::with_builtins(),
            ShortcodeProcessorConfig::new().with_base_dir(temp_dir.path()),
        );

        let err = processor
            .process(&Document::new("<?# Include nope.md /?>"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ShortcodeErrorKind::HandlerFault);
    }

    #[tokio::test]
    async fn test_requires_path() {
        let err = execute(&mut IncludeShortcode, "", "", &Document::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid Path");
    }

    #[tokio::test]
    async fn test_rejects_paths_outside_base_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base_dir = temp_dir.path().join("docs");
        std::fs::create_dir(&base_dir).unwrap();
        std::fs::write(temp_dir.path().join("secret.txt"), "TOP-SECRET").unwrap();

        let processor = ShortcodeProcessor::with_config(
            ShortcodeRegistry::with_builtins(),
            ShortcodeProcessorConfig::new().with_base_dir(&base_dir),
        );

        for path in ["../secret.txt", "nested/../../secret.txt"] {
            let err = processor
                .process(&Document::new(format!("<?# Include {path} /?>")))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ShortcodeErrorKind::ArgumentError);
            assert!(err.to_string().contains("outside the base directory"));
        }
    }

    #[tokio::test]
    async fn test_rejects_absolute_paths() {
        let err = execute(&mut IncludeShortcode, "/etc/hostname", "", &Document::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Argument(_)));
    }
}
