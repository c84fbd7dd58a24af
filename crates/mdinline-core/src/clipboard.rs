//! Clipboard output.

use std::path::Path;

use crate::convert::{ConvertError, Conversion, Converter};

/// Clipboard access failure.
#[derive(Debug, thiserror::Error)]
#[error("clipboard error: {0}")]
pub struct ClipboardError(pub String);

/// Destination for converted text.
pub trait ClipboardSink {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError`] when the clipboard is unavailable.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Error from [`copy_to_clipboard`].
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Convert a document and write the result to the clipboard.
///
/// The clipboard is left untouched when conversion fails.
///
/// # Errors
///
/// Returns the conversion error, or the clipboard error after a successful
/// conversion.
pub fn copy_to_clipboard(
    converter: &Converter,
    document: &str,
    source_path: &Path,
    sink: &mut dyn ClipboardSink,
) -> Result<Conversion, CopyError> {
    let conversion = converter.convert(document, source_path)?;
    sink.write_text(&conversion.text)?;
    tracing::debug!(bytes = conversion.text.len(), "Copied to clipboard");
    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mdinline_diagrams::{DiagramProvider, RemoteServiceProvider};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::convert::ConvertSettings;

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<String>,
        fail: bool,
    }

    impl ClipboardSink for RecordingSink {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError("no display".to_owned()));
            }
            self.writes.push(text.to_owned());
            Ok(())
        }
    }

    fn converter(root: &Path) -> Converter {
        Converter::new(
            ConvertSettings::new(root),
            DiagramProvider::Remote(RemoteServiceProvider::new("https://x.test")),
        )
    }

    #[test]
    fn test_copy_writes_converted_text() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.png"), b"PNGDATA").unwrap();
        let mut sink = RecordingSink::default();

        let conversion = copy_to_clipboard(
            &converter(temp.path()),
            "![[a.png]]",
            &temp.path().join("doc.md"),
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.writes, vec![conversion.text]);
        assert_eq!(sink.writes[0], "![a.png](data:image/png;base64,UE5HREFUQQ==)");
    }

    #[test]
    fn test_failed_conversion_leaves_clipboard_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let mut sink = RecordingSink::default();

        let err = copy_to_clipboard(
            &converter(temp.path()),
            "![[missing.png]]",
            &temp.path().join("doc.md"),
            &mut sink,
        )
        .unwrap_err();

        assert!(matches!(err, CopyError::Convert(ConvertError::Read { .. })));
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_clipboard_failure_reported() {
        let temp = tempfile::tempdir().unwrap();
        let mut sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };

        let err = copy_to_clipboard(
            &converter(temp.path()),
            "plain",
            &temp.path().join("doc.md"),
            &mut sink,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "clipboard error: no display");
    }
}
