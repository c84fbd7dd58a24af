//! Diagram rendering errors.

use std::path::PathBuf;

/// Failure to encode or decode diagram text.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("deflate failed: {0}")]
    Deflate(#[source] std::io::Error),
    #[error("invalid encoded text: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("inflate failed: {0}")]
    Inflate(#[source] std::io::Error),
    #[error("decoded diagram is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Configured renderer path resolved to nothing usable.
    #[error("invalid local PlantUML path: {0:?}")]
    InvalidExecutable(String),
    /// The renderer process could not be started.
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// I/O error while talking to the renderer process.
    #[error("renderer I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The renderer reported a failure.
    #[error("PlantUML failed: {stderr}")]
    Process { stderr: String },
    /// The renderer exited without producing output.
    #[error("PlantUML produced no output")]
    EmptyOutput,
    /// Rendered SVG was not valid UTF-8.
    #[error("PlantUML produced invalid SVG text")]
    InvalidSvg(#[from] std::string::FromUtf8Error),
    /// An in-process renderer failed.
    #[error("diagram rendering failed: {0}")]
    Render(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
