//! Reference extraction.
//!
//! References are found by pattern matching, one kind at a time. Each pass
//! runs over the text produced by the previous pass, so the order in
//! [`ReferenceKind::PASSES`] matters: diagram fences are replaced before
//! image syntax is looked for.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use mdinline_diagrams::DiagramLanguage;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

/// Image file extensions recognized in wiki embeds and standard links.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// `` ```plantuml\n...\n``` `` fences. Longest tag first so `puml-svg` wins over `puml`.
static DIAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(puml-svg|plantuml|puml)\r?\n((?s:.*?))\r?\n```").unwrap()
});

/// `![[name.ext]]` and `![[name.ext|alias]]` embeds.
static WIKI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[\[([^\]|\n]+?\.(?i:png|jpe?g|gif|webp|svg|bmp))(?:\|[^\]\n]*)?\]\]").unwrap()
});

/// `![alt](path.ext)` and `![alt](path.ext "title")` links.
static STANDARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"!\[([^\]\n]*)\]\(\s*([^)\n]+?\.(?i:png|jpe?g|gif|webp|svg|bmp))(?:\s+"[^"\n]*")?\s*\)"#,
    )
    .unwrap()
});

/// Kind of embedded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Fenced `PlantUML` block.
    Diagram,
    /// `![[file.png]]` embed.
    WikiImage,
    /// `![alt](file.png)` link.
    StandardImage,
}

impl ReferenceKind {
    /// Extraction order.
    pub const PASSES: [Self; 3] = [Self::Diagram, Self::WikiImage, Self::StandardImage];

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Diagram => &DIAGRAM_RE,
            Self::WikiImage => &WIKI_RE,
            Self::StandardImage => &STANDARD_RE,
        }
    }
}

/// A single embed found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub kind: ReferenceKind,
    /// Byte range of the whole match in the scanned text.
    pub span: Range<usize>,
    /// Exact matched text.
    pub matched: &'a str,
    /// Percent-decoded image path, or diagram source.
    pub target: String,
    /// Description candidate: alt text for links, file name for wiki embeds.
    pub alt: String,
    /// Fence language, for diagrams only.
    pub language: Option<DiagramLanguage>,
}

/// Lazily yield references of one kind, in document order.
///
/// Text that matches nothing yields nothing. Remote URLs and `data:` URIs in
/// standard links are skipped.
pub fn extract(text: &str, kind: ReferenceKind) -> impl Iterator<Item = Reference<'_>> {
    kind.pattern()
        .captures_iter(text)
        .filter_map(move |caps| build_reference(kind, &caps))
}

fn build_reference<'a>(kind: ReferenceKind, caps: &Captures<'a>) -> Option<Reference<'a>> {
    let whole = caps.get(0)?;
    let (target, alt, language) = match kind {
        ReferenceKind::Diagram => {
            let language = DiagramLanguage::parse(&caps[1])?;
            (caps[2].to_owned(), String::new(), Some(language))
        }
        ReferenceKind::WikiImage => {
            let name = decode_path(caps[1].trim());
            (name.clone(), name, None)
        }
        ReferenceKind::StandardImage => {
            let raw = caps[2].trim();
            if is_external(raw) {
                return None;
            }
            (decode_path(raw), caps[1].to_owned(), None)
        }
    };

    Some(Reference {
        kind,
        span: whole.range(),
        matched: whole.as_str(),
        target,
        alt,
        language,
    })
}

fn is_external(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

/// Percent-decode a link target, keeping the raw text if it decodes to invalid UTF-8.
fn decode_path(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(Cow::Borrowed(s)) => s.to_owned(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => raw.to_owned(),
    }
}
