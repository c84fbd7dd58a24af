//! `PlantUML` diagram rendering for mdinline.
//!
//! This crate turns diagram fence sources into payloads that can be inlined
//! into a Markdown document:
//! - [`DiagramProvider`] dispatches to one of three backends: a local
//!   `PlantUML` process, a remote `PlantUML` server (URL construction only),
//!   or a host-supplied in-process [`DiagramRenderer`]
//! - [`encode`]/[`decode`] implement the `PlantUML` text encoding used in
//!   server URLs and cache keys
//! - Local renders are cached in a content-addressed [`mdinline_cache::CacheBucket`]
//!
//! # Architecture
//!
//! - [`language`]: Fence tags (`DiagramLanguage`) and output formats (`DiagramFormat`)
//! - [`encoding`]: Reversible deflate + base64 text encoding
//! - [`cache`]: Cache key computation
//! - [`provider`]: The provider capability and its three implementations
//!
//! # Example
//!
//! ```
//! use mdinline_diagrams::{DiagramFormat, DiagramPayload, DiagramProvider, RemoteServiceProvider};
//!
//! let provider = DiagramProvider::Remote(RemoteServiceProvider::new("https://x.test"));
//! let rendered = provider.render("A->B", DiagramFormat::Svg).unwrap();
//! let DiagramPayload::Url(url) = rendered.payload else { unreachable!() };
//! assert!(url.starts_with("https://x.test/svg/"));
//! ```

mod cache;
mod consts;
mod encoding;
mod error;
mod language;
mod provider;

pub use cache::DiagramKey;
pub use consts::DEFAULT_SERVER_URL;
pub use encoding::{decode, encode};
pub use error::{DiagramError, EncodingError};
pub use language::{DiagramFormat, DiagramLanguage};
pub use provider::{
    DiagramPayload, DiagramProvider, DiagramRenderer, InProcessProvider, LocalProcessProvider,
    ProviderSettings, RemoteServiceProvider, Rendered,
};
