//! `rw expand` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use rw_config::{CliSettings, Config};
use rw_shortcodes::{
    Cancellation, Document, Metadata, ShortcodeProcessor, ShortcodeProcessorConfig,
    ShortcodeRegistry,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the expand command.
#[derive(Args)]
pub(crate) struct ExpandArgs {
    /// Document to expand.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory for included files (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Maximum shortcode expansion depth (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Document metadata entry; values are parsed as JSON, falling back to a string.
    #[arg(short, long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    meta: Vec<(String, Value)>,

    /// YAML file with document metadata (applied before --meta).
    #[arg(long, env = "RW_META_FILE")]
    meta_file: Option<PathBuf>,

    /// Write expanded content to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the final metadata as JSON to stderr.
    #[arg(long)]
    print_metadata: bool,

    /// Enable verbose output (debug logs for every pass).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExpandArgs {
    /// Execute the expand command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, or shortcode expansion fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            max_depth: self.max_depth,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let content = read_file(&self.file).await?;
        let metadata = load_metadata(self.meta_file.as_deref(), self.meta).await?;
        let document = Document::new(content).with_metadata(metadata);

        let cancellation = Cancellation::new();
        let processor = ShortcodeProcessor::with_config(
            ShortcodeRegistry::with_builtins(),
            ShortcodeProcessorConfig::new()
                .with_base_dir(&config.docs_resolved.source_dir)
                .with_source_path(&self.file)
                .with_max_depth(config.shortcodes.max_depth)
                .with_cancellation(cancellation.clone()),
        );

        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping at the next shortcode");
                cancellation.cancel();
            }
        });
        let result = processor.process(&document).await;
        interrupt.abort();
        let expanded = result?;

        info!(
            file = %self.file.display(),
            bytes = expanded.content().len(),
            "Expanded document"
        );

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, expanded.content()).await?;
                output.wrote(path);
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(expanded.content().as_bytes())?;
                stdout.flush()?;
            }
        }

        if self.print_metadata {
            output.metadata(&serde_json::to_string_pretty(expanded.metadata())?);
        }

        Ok(())
    }
}

async fn read_file(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Initial document metadata: the YAML file, then `--meta` entries on top.
async fn load_metadata(
    meta_file: Option<&Path>,
    entries: Vec<(String, Value)>,
) -> Result<Metadata, CliError> {
    let mut metadata = match meta_file {
        Some(path) => {
            let content = read_file(path).await?;
            if content.trim().is_empty() {
                Metadata::new()
            } else {
                serde_yaml::from_str(&content).map_err(|source| CliError::MetaFile {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        }
        None => Metadata::new(),
    };

    for (key, value) in entries {
        metadata.insert(key, value);
    }

    Ok(metadata)
}

/// Parse a `KEY=VALUE` metadata argument.
fn parse_meta(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{arg}`"))?;
    if key.is_empty() {
        return Err("metadata key cannot be empty".to_owned());
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((key.to_owned(), value))
}
