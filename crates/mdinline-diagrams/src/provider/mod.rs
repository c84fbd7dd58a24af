//! Diagram payload providers.
//!
//! Every backend satisfies one capability: given diagram source and an
//! output format, produce something that can be inlined into Markdown.
//! [`DiagramProvider`] dispatches over the three implementations.

mod in_process;
mod local;
mod remote;

use std::path::PathBuf;

use mdinline_cache::CacheBucket;

use crate::error::DiagramError;
use crate::language::DiagramFormat;

pub use in_process::{DiagramRenderer, InProcessProvider};
pub use local::LocalProcessProvider;
pub use remote::RemoteServiceProvider;

/// Rendered diagram content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramPayload {
    /// PNG bytes, to be inlined as a base64 data URI.
    Raster(Vec<u8>),
    /// SVG document text, to be inlined as a base64 data URI.
    Vector(String),
    /// Image URL fetched lazily by whoever displays the document.
    Url(String),
}

/// Result of a [`DiagramProvider::render`] call.
#[derive(Debug)]
pub struct Rendered {
    pub payload: DiagramPayload,
    /// Whether the payload came from the cache instead of the renderer.
    pub from_cache: bool,
}

impl Rendered {
    pub(crate) fn fresh(payload: DiagramPayload) -> Self {
        Self {
            payload,
            from_cache: false,
        }
    }
}

/// Settings that select and configure a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Local `PlantUML` jar or executable. Empty selects the remote server.
    pub local_jar: String,
    /// Java runtime used when `local_jar` ends in `.jar`.
    pub java_path: String,
    /// Graphviz `dot` executable passed to `PlantUML`.
    pub dot_path: String,
    /// `PlantUML` server base URL.
    pub server_url: String,
    /// Vault root: base for relative `local_jar` paths and renderer working directory.
    pub vault_root: PathBuf,
}

/// A diagram rendering backend.
pub enum DiagramProvider {
    /// Pipe source through a local `PlantUML` process.
    Local(LocalProcessProvider),
    /// Point at a `PlantUML` server URL.
    Remote(RemoteServiceProvider),
    /// Render with a host-supplied renderer.
    InProcess(InProcessProvider),
}

impl DiagramProvider {
    /// Select a provider from settings.
    ///
    /// A configured local path wins; otherwise the remote server is used.
    /// The cache bucket is only consulted by the local provider.
    #[must_use]
    pub fn from_settings(settings: &ProviderSettings, cache: Box<dyn CacheBucket>) -> Self {
        if settings.local_jar.is_empty() {
            Self::Remote(RemoteServiceProvider::new(settings.server_url.as_str()))
        } else {
            Self::Local(LocalProcessProvider::new(settings.clone(), cache))
        }
    }

    /// Render diagram source in the requested format.
    pub fn render(&self, source: &str, format: DiagramFormat) -> Result<Rendered, DiagramError> {
        match self {
            Self::Local(provider) => provider.render(source, format),
            Self::Remote(provider) => Ok(Rendered::fresh(DiagramPayload::Url(
                provider.url(source, format)?,
            ))),
            Self::InProcess(provider) => provider.render(source).map(Rendered::fresh),
        }
    }

    /// Short provider name for log messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
            Self::InProcess(_) => "in-process",
        }
    }
}
