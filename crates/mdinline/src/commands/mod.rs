//! CLI command implementations.

mod check;
mod convert;
mod copy;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use mdinline_cache::{Cache, FileCache, NullCache};
use mdinline_config::{CliSettings, Config};
use mdinline_core::{ConvertSettings, Converter};
use mdinline_diagrams::{DiagramFormat, DiagramProvider, ProviderSettings};

use crate::error::CliError;

pub(crate) use check::CheckArgs;
pub(crate) use convert::ConvertArgs;
pub(crate) use copy::CopyArgs;

/// Application version, used to invalidate the diagram cache on upgrade.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cache bucket holding rendered diagrams.
const DIAGRAM_BUCKET: &str = "diagrams";

/// Document and conversion options shared by `copy` and `convert`.
#[derive(Args)]
pub(crate) struct ConvertOptions {
    /// Markdown document to convert ("-" reads from stdin).
    document: PathBuf,

    /// Vault root for resolving images (overrides config; without a config
    /// file the document's folder is used).
    #[arg(long)]
    vault: Option<PathBuf>,

    /// Default diagram output format (overrides config).
    #[arg(long, value_parser = ["png", "svg"])]
    format: Option<String>,

    /// Diagram server URL (overrides config).
    #[arg(long)]
    server_url: Option<String>,

    /// Local renderer jar or executable; renders diagrams locally instead of linking to a server.
    #[arg(long)]
    local_jar: Option<String>,

    /// Drop alt text and file names from inlined images.
    #[arg(long)]
    no_description: bool,

    /// Disable the diagram cache.
    #[arg(long)]
    no_cache: bool,

    /// Path to configuration file (default: auto-discover mdinline.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// A converter ready to run on a loaded document.
pub(crate) struct Prepared {
    pub converter: Converter,
    pub document: String,
    pub source_path: PathBuf,
}

impl ConvertOptions {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            vault_root: self.vault.clone(),
            cache_enabled: self.no_cache.then_some(false),
            keep_description: self.no_description.then_some(false),
            format: self.format.clone(),
            server_url: self.server_url.clone(),
            local_jar: self.local_jar.clone(),
            document_dir: self.document_dir(),
        }
    }

    /// Folder holding the document, `None` for stdin.
    fn document_dir(&self) -> Option<PathBuf> {
        if self.document == Path::new("-") {
            return None;
        }
        canonical(&self.document)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// Load configuration, build the converter and read the document.
    pub(crate) fn prepare(&self) -> Result<Prepared, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        let converter = build_converter(&config)?;
        let (document, source_path) = read_document(&self.document)?;
        Ok(Prepared {
            converter,
            document,
            source_path,
        })
    }
}

/// Build a converter from resolved configuration.
pub(crate) fn build_converter(config: &Config) -> Result<Converter, CliError> {
    let vault_root = canonical(&config.vault_resolved.root);

    let cache: Box<dyn Cache> = if config.vault_resolved.cache_enabled {
        Box::new(FileCache::new(config.vault_resolved.cache_dir(), VERSION))
    } else {
        Box::new(NullCache)
    };

    let provider_settings = ProviderSettings {
        local_jar: config.diagrams.local_jar.clone(),
        java_path: config.diagrams.java_path.clone(),
        dot_path: config.diagrams.dot_path.clone(),
        server_url: config.diagrams.server_url.clone(),
        vault_root: vault_root.clone(),
    };
    let provider = DiagramProvider::from_settings(&provider_settings, cache.bucket(DIAGRAM_BUCKET));

    let default_format = DiagramFormat::parse(&config.diagrams.format).ok_or_else(|| {
        CliError::Validation(format!("unknown diagram format: {}", config.diagrams.format))
    })?;

    let settings = ConvertSettings {
        keep_description: config.images.keep_description,
        default_format,
        vault_root,
    };
    Ok(Converter::new(settings, provider))
}

/// Read a document from a path, or stdin for `-`.
///
/// Returns the text and the path used to resolve relative links. Stdin
/// documents resolve links as if they lived in the current directory.
pub(crate) fn read_document(path: &Path) -> Result<(String, PathBuf), CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok((text, std::env::current_dir()?.join("stdin.md")));
    }
    let text = std::fs::read_to_string(path)?;
    Ok((text, canonical(path)))
}

/// Absolute form of a path, or the path itself if it can't be resolved.
fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
