//! Markdown image and diagram inlining pipeline.
//!
//! Rewrites a Markdown document so that every embedded image and diagram is
//! self-contained:
//!
//! 1. [`extract`] finds references (diagram fences, `![[wiki]]` embeds,
//!    `![alt](path)` links) by pattern matching, one kind per pass
//! 2. [`Resolver`] maps image links to files using the vault index
//! 3. images are read from disk and diagrams are rendered by a
//!    [`DiagramProvider`](mdinline_diagrams::DiagramProvider)
//! 4. [`Rewriter`] splices `![desc](data:...)` replacements back in a single
//!    pass per kind
//!
//! [`Converter`] runs the whole pipeline; [`copy_to_clipboard`] also hands
//! the result to a [`ClipboardSink`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use mdinline_core::{ConvertSettings, Converter};
//! use mdinline_diagrams::{DiagramProvider, RemoteServiceProvider};
//!
//! let settings = ConvertSettings::new("/notes");
//! let provider = DiagramProvider::Remote(RemoteServiceProvider::new(""));
//! let converter = Converter::new(settings, provider);
//!
//! let doc = std::fs::read_to_string("/notes/today.md").unwrap();
//! let result = converter.convert(&doc, Path::new("/notes/today.md")).unwrap();
//! println!("{}", result.text);
//! ```

mod check;
mod clipboard;
mod convert;
mod extract;
mod payload;
mod resolve;
mod rewrite;

pub use check::{BoldIssue, check_bold_spacing};
pub use clipboard::{ClipboardError, ClipboardSink, CopyError, copy_to_clipboard};
pub use convert::{ConvertError, ConvertSettings, ConvertStats, Conversion, Converter};
pub use extract::{IMAGE_EXTENSIONS, Reference, ReferenceKind, extract};
pub use payload::{Payload, mime_for_path, read_image};
pub use resolve::{ResolvedResource, Resolver, VaultIndex};
pub use rewrite::{Rewriter, image_description, render_image};
