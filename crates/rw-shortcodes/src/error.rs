//! Shortcode error types.
//!
//! [`ShortcodeError`] is what a pass surfaces to its caller. [`HandlerError`] is what
//! an individual [`Shortcode`](crate::Shortcode) returns; the processor tags it with
//! the name of the shortcode that produced it.

use std::io;

/// Semantic error categories for a failed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShortcodeErrorKind {
    /// Unmatched or unterminated tag markers.
    MalformedShortcode,
    /// Tag name not present in the registry.
    UnknownShortcode,
    /// Handler rejected its arguments.
    ArgumentError,
    /// Handler failed while executing.
    HandlerFault,
    /// Expansion nested deeper than the configured limit.
    RecursionLimitExceeded,
    /// Pass stopped by a cancellation request.
    Cancelled,
}

/// Error that aborts a shortcode pass.
#[derive(Debug, thiserror::Error)]
pub enum ShortcodeError {
    /// Tag markers could not be parsed.
    #[error(
        "malformed shortcode `{name}` at line {line} (byte {position}){}: {message}",
        OutputOf(.output_of.as_deref())
    )]
    Malformed {
        /// Tag name, empty when the name itself could not be read.
        name: String,
        /// Line of the offending marker (1-indexed) within the scanned content.
        line: usize,
        /// Byte offset of the offending marker within the scanned content.
        position: usize,
        /// What went wrong.
        message: String,
        /// Shortcode whose output was being expanded, if the markers did not come
        /// from the document itself. `line` and `position` are then relative to
        /// that output.
        output_of: Option<String>,
    },

    /// No shortcode is registered under this name.
    #[error("unknown shortcode `{name}`")]
    Unknown {
        /// Tag name as written in the content.
        name: String,
    },

    /// The handler reported invalid or missing arguments.
    #[error("invalid arguments for shortcode `{name}`: {message}")]
    Argument {
        /// Tag name.
        name: String,
        /// Handler-supplied description.
        message: String,
    },

    /// The handler failed.
    #[error("shortcode `{name}` failed: {source}")]
    Fault {
        /// Tag name.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Handler output kept reintroducing tags past the depth limit.
    #[error("maximum shortcode expansion depth ({limit}) exceeded")]
    RecursionLimit {
        /// Configured maximum depth.
        limit: usize,
    },

    /// The pass was cancelled before it completed.
    #[error("shortcode processing cancelled")]
    Cancelled,
}

impl ShortcodeError {
    /// Semantic category of this error.
    #[must_use]
    pub fn kind(&self) -> ShortcodeErrorKind {
        match self {
            Self::Malformed { .. } => ShortcodeErrorKind::MalformedShortcode,
            Self::Unknown { .. } => ShortcodeErrorKind::UnknownShortcode,
            Self::Argument { .. } => ShortcodeErrorKind::ArgumentError,
            Self::Fault { .. } => ShortcodeErrorKind::HandlerFault,
            Self::RecursionLimit { .. } => ShortcodeErrorKind::RecursionLimitExceeded,
            Self::Cancelled => ShortcodeErrorKind::Cancelled,
        }
    }

    pub(crate) fn malformed(
        name: impl Into<String>,
        content: &str,
        position: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            name: name.into(),
            line: line_at(content, position),
            position,
            message: message.into(),
            output_of: None,
        }
    }

    /// Attribute a malformed error to the output of shortcode `producer`.
    ///
    /// The innermost producer wins; errors that already name one are unchanged.
    pub(crate) fn in_output_of(self, producer: &str) -> Self {
        match self {
            Self::Malformed {
                name,
                line,
                position,
                message,
                output_of: None,
            } => Self::Malformed {
                name,
                line,
                position,
                message,
                output_of: Some(producer.to_owned()),
            },
            other => other,
        }
    }

    pub(crate) fn from_handler(name: &str, err: HandlerError) -> Self {
        match err {
            HandlerError::Argument(message) => Self::Argument {
                name: name.to_owned(),
                message,
            },
            HandlerError::Fault(source) => Self::Fault {
                name: name.to_owned(),
                source,
            },
        }
    }
}

/// Display suffix naming the shortcode whose output was malformed.
struct OutputOf<'a>(Option<&'a str>);

impl std::fmt::Display for OutputOf<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(name) => write!(f, " in output of `{name}`"),
            None => Ok(()),
        }
    }
}

/// 1-indexed line number of a byte offset.
fn line_at(content: &str, position: usize) -> usize {
    let end = position.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Failure reported by a shortcode handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Arguments were missing, empty, or not understood.
    #[error("{0}")]
    Argument(String),

    /// Anything else that went wrong while executing.
    #[error("{0}")]
    Fault(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create an argument error.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Wrap an arbitrary failure.
    #[must_use]
    pub fn fault(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Fault(source.into())
    }
}

impl From<io::Error> for HandlerError {
    fn from(err: io::Error) -> Self {
        Self::Fault(Box::new(err))
    }
}
