//! CLI error types.

use std::path::PathBuf;

use rw_config::ConfigError;
use rw_shortcodes::ShortcodeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid metadata file {}: {source}", path.display())]
    MetaFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    Shortcode(#[from] ShortcodeError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
