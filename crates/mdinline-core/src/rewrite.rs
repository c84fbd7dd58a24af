//! Span-based document rewriting.

use std::ops::Range;

use crate::extract::{Reference, ReferenceKind};
use crate::payload::Payload;

/// Markdown image syntax for a payload.
#[must_use]
pub fn render_image(description: &str, payload: &Payload) -> String {
    format!("![{description}]({})", payload.to_src())
}

/// Description to keep for a reference.
///
/// Wiki embeds keep their file name and links their alt text. Diagrams never
/// carry a description.
#[must_use]
pub fn image_description<'r>(reference: &'r Reference<'_>, keep_description: bool) -> &'r str {
    if !keep_description || reference.kind == ReferenceKind::Diagram {
        return "";
    }
    &reference.alt
}

/// Collects span replacements for single-pass application.
///
/// Spans refer to the text passed to [`apply()`](Self::apply). All of them
/// are spliced in one left-to-right pass, so earlier replacements changing
/// the text length don't invalidate later spans.
///
/// # Example
///
/// ```
/// use mdinline_core::Rewriter;
///
/// let text = "a ![[x.png]] b";
/// let mut rewriter = Rewriter::new();
/// rewriter.add(2..12, "IMG");
///
/// assert_eq!(rewriter.apply(text), "a IMG b");
/// ```
#[derive(Debug, Default)]
pub struct Rewriter {
    items: Vec<(Range<usize>, String)>,
}

impl Rewriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a replacement for the bytes in `span`.
    pub fn add(&mut self, span: Range<usize>, replacement: impl Into<String>) {
        self.items.push((span, replacement.into()));
    }

    /// Splice all replacements into `text`.
    ///
    /// A span overlapping an earlier one, or not on `text` char boundaries,
    /// is skipped with a warning.
    #[must_use]
    pub fn apply(mut self, text: &str) -> String {
        if self.items.is_empty() {
            return text.to_owned();
        }

        self.items.sort_by_key(|(span, _)| span.start);

        let extra: usize = self.items.iter().map(|(_, r)| r.len()).sum();
        let mut out = String::with_capacity(text.len() + extra);
        let mut cursor = 0;

        for (span, replacement) in self.items {
            let valid = span.start >= cursor
                && span.start <= span.end
                && text.is_char_boundary(span.start)
                && text.is_char_boundary(span.end)
                && span.end <= text.len();
            if !valid {
                tracing::warn!(?span, cursor, "Skipping overlapping replacement");
                continue;
            }
            out.push_str(&text[cursor..span.start]);
            out.push_str(&replacement);
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use pretty_assertions::assert_eq;

    fn png() -> Payload {
        Payload::Inline {
            mime: "image/png".to_owned(),
            data: b"PNGDATA".to_vec(),
        }
    }

    #[test]
    fn test_render_image() {
        assert_eq!(
            render_image("cat", &png()),
            "![cat](data:image/png;base64,UE5HREFUQQ==)"
        );
        assert_eq!(
            render_image("", &Payload::Url("https://x.test/png/abc".to_owned())),
            "![](https://x.test/png/abc)"
        );
    }

    #[test]
    fn test_description_policy() {
        let wiki = extract("![[cat.png]]", ReferenceKind::WikiImage).next().unwrap();
        let link = extract("![A cat](cat.png)", ReferenceKind::StandardImage)
            .next()
            .unwrap();
        let diagram = extract("```puml\nA\n```", ReferenceKind::Diagram).next().unwrap();

        assert_eq!(image_description(&wiki, true), "cat.png");
        assert_eq!(image_description(&link, true), "A cat");
        assert_eq!(image_description(&diagram, true), "");
        assert_eq!(image_description(&wiki, false), "");
        assert_eq!(image_description(&link, false), "");
    }

    #[test]
    fn test_empty_rewriter() {
        assert_eq!(Rewriter::new().apply("unchanged"), "unchanged");
    }

    #[test]
    fn test_replacements_shift_offsets() {
        let text = "aa XX bb YY cc";
        let mut rewriter = Rewriter::new();
        rewriter.add(3..5, "longer replacement");
        rewriter.add(9..11, "Z");

        assert_eq!(rewriter.apply(text), "aa longer replacement bb Z cc");
    }

    #[test]
    fn test_out_of_order_spans() {
        let text = "0123456789";
        let mut rewriter = Rewriter::new();
        rewriter.add(7..9, "b");
        rewriter.add(1..3, "a");

        assert_eq!(rewriter.len(), 2);
        assert_eq!(rewriter.apply(text), "0a3456b9");
    }

    #[test]
    fn test_overlapping_span_skipped() {
        let text = "0123456789";
        let mut rewriter = Rewriter::new();
        rewriter.add(1..5, "a");
        rewriter.add(3..7, "b");

        assert_eq!(rewriter.apply(text), "0a56789");
    }

    #[test]
    fn test_every_occurrence_replaced() {
        let text = "![[a.png]] then ![[a.png]] again";
        let mut rewriter = Rewriter::new();
        for reference in extract(text, ReferenceKind::WikiImage) {
            rewriter.add(reference.span, "IMG");
        }

        assert_eq!(rewriter.apply(text), "IMG then IMG again");
    }
}
