//! Inlineable image content.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use mdinline_diagrams::{DiagramFormat, DiagramPayload};

use crate::convert::ConvertError;

/// Image content ready to be embedded in Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes embedded as a `data:` URI.
    Inline { mime: String, data: Vec<u8> },
    /// URL embedded as-is.
    Url(String),
}

impl Payload {
    /// Link target for this payload.
    #[must_use]
    pub fn to_src(&self) -> String {
        match self {
            Self::Inline { mime, data } => {
                format!("data:{mime};base64,{}", BASE64_STANDARD.encode(data))
            }
            Self::Url(url) => url.clone(),
        }
    }
}

impl From<DiagramPayload> for Payload {
    fn from(payload: DiagramPayload) -> Self {
        match payload {
            DiagramPayload::Raster(data) => Self::Inline {
                mime: DiagramFormat::Png.mime().to_owned(),
                data,
            },
            DiagramPayload::Vector(svg) => Self::Inline {
                mime: DiagramFormat::Svg.mime().to_owned(),
                data: svg.into_bytes(),
            },
            DiagramPayload::Url(url) => Self::Url(url),
        }
    }
}

/// MIME type for an image path, from its extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_owned(),
        "svg" => "image/svg+xml".to_owned(),
        "" => "application/octet-stream".to_owned(),
        other => format!("image/{other}"),
    }
}

/// Read an image file into an inline payload.
///
/// # Errors
///
/// Returns [`ConvertError::Read`] when the file can't be read.
pub fn read_image(path: &Path) -> Result<Payload, ConvertError> {
    let data = fs::read(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Payload::Inline {
        mime: mime_for_path(path),
        data,
    })
}
