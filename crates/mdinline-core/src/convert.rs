//! Conversion orchestration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mdinline_diagrams::{DiagramError, DiagramFormat, DiagramProvider};

use crate::extract::{Reference, ReferenceKind, extract};
use crate::payload::{Payload, read_image};
use crate::resolve::{ResolvedResource, Resolver};
use crate::rewrite::{Rewriter, image_description, render_image};

/// Conversion error. Any error aborts the whole conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// An image file could not be read.
    #[error("failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A diagram fence could not be rendered.
    #[error("failed to render diagram at line {line}: {source}")]
    Diagram {
        line: usize,
        #[source]
        source: DiagramError,
    },
}

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertSettings {
    /// Keep alt text and wiki file names as image descriptions.
    pub keep_description: bool,
    /// Output format for fences that don't force one.
    pub default_format: DiagramFormat,
    /// Vault root used for image resolution.
    pub vault_root: PathBuf,
}

impl ConvertSettings {
    /// Default settings for a vault: descriptions kept, PNG diagrams.
    #[must_use]
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            keep_description: true,
            default_format: DiagramFormat::default(),
            vault_root: vault_root.into(),
        }
    }
}

/// Reference counts for one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub diagrams: usize,
    pub wiki_images: usize,
    pub standard_images: usize,
    /// Diagrams served from the provider cache.
    pub cache_hits: usize,
}

impl ConvertStats {
    /// Total number of replaced references.
    #[must_use]
    pub fn total(&self) -> usize {
        self.diagrams + self.wiki_images + self.standard_images
    }

    fn record(&mut self, kind: ReferenceKind) {
        match kind {
            ReferenceKind::Diagram => self.diagrams += 1,
            ReferenceKind::WikiImage => self.wiki_images += 1,
            ReferenceKind::StandardImage => self.standard_images += 1,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub text: String,
    pub stats: ConvertStats,
}

/// Diagrams rendered during one run, keyed by format and source.
type DiagramMemo = HashMap<(DiagramFormat, String), Payload>;

/// Inlines every image and diagram of a Markdown document.
///
/// The vault is indexed once on construction; a converter can then convert
/// any number of documents from that vault.
pub struct Converter {
    settings: ConvertSettings,
    provider: DiagramProvider,
    resolver: Resolver,
}

impl Converter {
    /// Create a converter, indexing the vault.
    #[must_use]
    pub fn new(settings: ConvertSettings, provider: DiagramProvider) -> Self {
        let resolver = Resolver::new(settings.vault_root.clone());
        Self {
            settings,
            provider,
            resolver,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ConvertSettings {
        &self.settings
    }

    /// Convert a document read from `source_path`.
    ///
    /// Runs the diagram, wiki embed and standard link passes in that order.
    /// Text without any recognized reference is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first image read or diagram render failure.
    pub fn convert(&self, document: &str, source_path: &Path) -> Result<Conversion, ConvertError> {
        tracing::info!(
            path = %source_path.display(),
            provider = self.provider.name(),
            "Converting document"
        );

        let mut stats = ConvertStats::default();
        let mut memo = DiagramMemo::new();
        let mut text = document.to_owned();

        for kind in ReferenceKind::PASSES {
            text = self.run_pass(text, kind, source_path, &mut memo, &mut stats)?;
        }

        tracing::info!(
            diagrams = stats.diagrams,
            wiki_images = stats.wiki_images,
            standard_images = stats.standard_images,
            cache_hits = stats.cache_hits,
            "Conversion complete"
        );
        Ok(Conversion { text, stats })
    }

    fn run_pass(
        &self,
        text: String,
        kind: ReferenceKind,
        source_path: &Path,
        memo: &mut DiagramMemo,
        stats: &mut ConvertStats,
    ) -> Result<String, ConvertError> {
        let mut rewriter = Rewriter::new();
        for reference in extract(&text, kind) {
            tracing::debug!(?kind, matched = reference.matched, "Found reference");
            let payload = self.payload(&text, &reference, source_path, memo, stats)?;
            let description = image_description(&reference, self.settings.keep_description);
            rewriter.add(reference.span.clone(), render_image(description, &payload));
            stats.record(kind);
        }

        if rewriter.is_empty() {
            return Ok(text);
        }
        Ok(rewriter.apply(&text))
    }

    fn payload(
        &self,
        text: &str,
        reference: &Reference<'_>,
        source_path: &Path,
        memo: &mut DiagramMemo,
        stats: &mut ConvertStats,
    ) -> Result<Payload, ConvertError> {
        match self.resolver.resolve(reference, source_path) {
            ResolvedResource::File(path) => {
                tracing::debug!(path = %path.display(), "Reading image");
                read_image(&path)
            }
            ResolvedResource::Diagram { source, language } => {
                let format = language
                    .forced_format()
                    .unwrap_or(self.settings.default_format);
                let key = (format, source);
                if let Some(payload) = memo.get(&key) {
                    tracing::debug!(format = format.as_str(), "Reusing diagram from this run");
                    return Ok(payload.clone());
                }

                let rendered = self
                    .provider
                    .render(&key.1, format)
                    .map_err(|source| ConvertError::Diagram {
                        line: line_number(text, reference.span.start),
                        source,
                    })?;
                if rendered.from_cache {
                    stats.cache_hits += 1;
                }
                let payload = Payload::from(rendered.payload);
                memo.insert(key, payload.clone());
                Ok(payload)
            }
        }
    }
}

/// 1-based line number of a byte offset.
fn line_number(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mdinline_diagrams::{
        DiagramRenderer, InProcessProvider, RemoteServiceProvider, encode,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    struct CountingRenderer {
        calls: AtomicUsize,
    }

    impl DiagramRenderer for CountingRenderer {
        fn render_svg(
            &self,
            source: &str,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if source.contains("fail") {
                return Err("syntax error".into());
            }
            Ok(format!("<svg>{source}</svg>"))
        }
    }

    fn remote() -> DiagramProvider {
        DiagramProvider::Remote(RemoteServiceProvider::new("https://x.test"))
    }

    fn vault() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("img")).unwrap();
        fs::write(temp.path().join("img/a.png"), b"PNGDATA").unwrap();
        fs::write(temp.path().join("img/my file.png"), b"SPACE").unwrap();
        temp
    }

    fn converter(root: &Path, provider: DiagramProvider) -> Converter {
        Converter::new(ConvertSettings::new(root), provider)
    }

    #[test]
    fn test_plain_text_unchanged() {
        let temp = vault();
        let doc = "# Notes\n\n```rust\nfn main() {}\n```\n\n[link](a.png) **bold**\n";

        let result = converter(temp.path(), remote())
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(result.text, doc);
        assert_eq!(result.stats, ConvertStats::default());
    }

    #[test]
    fn test_wiki_embed_inlined() {
        let temp = vault();
        let doc = "Look: ![[a.png]]";

        let result = converter(temp.path(), remote())
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(result.text, "Look: ![a.png](data:image/png;base64,UE5HREFUQQ==)");
        assert_eq!(result.stats.wiki_images, 1);
    }

    #[test]
    fn test_standard_link_inlined() {
        let temp = vault();
        let doc = "![Figure 1](img/a.png)";

        let result = converter(temp.path(), remote())
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(result.text, "![Figure 1](data:image/png;base64,UE5HREFUQQ==)");
        assert_eq!(result.stats.standard_images, 1);
    }

    #[test]
    fn test_descriptions_dropped() {
        let temp = vault();
        let settings = ConvertSettings {
            keep_description: false,
            ..ConvertSettings::new(temp.path())
        };
        let converter = Converter::new(settings, remote());

        let result = converter
            .convert("![[a.png]] ![alt](img/a.png)", &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(
            result.text,
            "![](data:image/png;base64,UE5HREFUQQ==) ![](data:image/png;base64,UE5HREFUQQ==)"
        );
    }

    #[test]
    fn test_percent_encoded_link() {
        let temp = vault();

        let result = converter(temp.path(), remote())
            .convert("![x](my%20file.png)", &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(result.text, "![x](data:image/png;base64,U1BBQ0U=)");
    }

    #[test]
    fn test_percent_encoded_unicode_name() {
        let temp = vault();
        fs::write(temp.path().join("img/图.png"), b"UNICODE").unwrap();

        let result = converter(temp.path(), remote())
            .convert(
                "![[%E5%9B%BE.png]]\n![图](img/%E5%9B%BE.png)",
                &temp.path().join("doc.md"),
            )
            .unwrap();

        assert_eq!(
            result.text,
            "![图.png](data:image/png;base64,VU5JQ09ERQ==)\n![图](data:image/png;base64,VU5JQ09ERQ==)"
        );
    }

    #[test]
    fn test_repeated_embeds_all_replaced() {
        let temp = vault();
        let doc = "![[a.png]]\n\n![[a.png]]\n";

        let result = converter(temp.path(), remote())
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        let image = "![a.png](data:image/png;base64,UE5HREFUQQ==)";
        assert_eq!(result.text, format!("{image}\n\n{image}\n"));
        assert_eq!(result.stats.wiki_images, 2);
    }

    #[test]
    fn test_missing_image_aborts() {
        let temp = vault();

        let err = converter(temp.path(), remote())
            .convert("![[a.png]] ![[missing.png]]", &temp.path().join("doc.md"))
            .unwrap_err();

        let ConvertError::Read { path, .. } = &err else {
            panic!("Expected read error, got {err:?}");
        };
        assert_eq!(path, &temp.path().join("missing.png"));
    }

    #[test]
    fn test_remote_diagram_url() {
        let temp = vault();
        let doc = "```plantuml\nA->B\n```";

        let result = converter(temp.path(), remote())
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(
            result.text,
            format!("![](https://x.test/png/{})", encode("A->B").unwrap())
        );
        assert_eq!(result.stats.diagrams, 1);
    }

    #[test]
    fn test_svg_fence_forces_svg() {
        let temp = vault();

        let result = converter(temp.path(), remote())
            .convert("```puml-svg\nA->B\n```", &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(
            result.text,
            format!("![](https://x.test/svg/{})", encode("A->B").unwrap())
        );
    }

    #[test]
    fn test_in_process_diagram_inlined_and_memoized() {
        let temp = vault();
        let renderer = Arc::new(CountingRenderer {
            calls: AtomicUsize::new(0),
        });
        let provider = DiagramProvider::InProcess(InProcessProvider::new(renderer.clone()));
        let doc = "```puml\nA\n```\ntext\n```puml\nA\n```";

        let result = converter(temp.path(), provider)
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        // "<svg>A</svg>" in base64
        let image = "![](data:image/svg+xml;base64,PHN2Zz5BPC9zdmc+)";
        assert_eq!(result.text, format!("{image}\ntext\n{image}"));
        assert_eq!(result.stats.diagrams, 2);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_diagram_error_reports_line() {
        let temp = vault();
        let renderer = Arc::new(CountingRenderer {
            calls: AtomicUsize::new(0),
        });
        let provider = DiagramProvider::InProcess(InProcessProvider::new(renderer));
        let doc = "# Title\n\n```puml\nfail\n```";

        let err = converter(temp.path(), provider)
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap_err();

        assert!(matches!(err, ConvertError::Diagram { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_mixed_document() {
        let temp = vault();
        let doc = "```puml\nA->B\n```\n![[a.png]]\n![b](img/a.png)\n";

        let result = converter(temp.path(), remote())
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();

        assert_eq!(
            result.stats,
            ConvertStats {
                diagrams: 1,
                wiki_images: 1,
                standard_images: 1,
                cache_hits: 0,
            }
        );
        assert_eq!(result.stats.total(), 3);
        assert!(!result.text.contains("![[a.png]]"));
        assert!(!result.text.contains("```puml"));
    }

    #[test]
    fn test_line_number() {
        assert_eq!(line_number("abc", 0), 1);
        assert_eq!(line_number("a\nb\nc", 4), 3);
        assert_eq!(line_number("a\n", 100), 2);
    }

    #[cfg(unix)]
    mod local {
        use std::os::unix::fs::PermissionsExt;

        use mdinline_cache::{Cache, MemoryCache};
        use mdinline_diagrams::ProviderSettings;
        use pretty_assertions::assert_eq;

        use super::*;

        /// Fake renderer that counts invocations and prints fixed PNG bytes.
        fn fake_renderer(dir: &Path) -> PathBuf {
            let path = dir.join("plantuml.sh");
            let script = format!(
                "#!/bin/sh\ncat > /dev/null\necho run >> '{}'\nprintf PNGDATA\n",
                dir.join("calls").display()
            );
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn calls(dir: &Path) -> usize {
            fs::read_to_string(dir.join("calls"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }

        #[test]
        fn test_second_conversion_served_from_cache() {
            let temp = vault();
            let renderer = fake_renderer(temp.path());
            let cache = MemoryCache::new();
            let settings = ProviderSettings {
                local_jar: renderer.display().to_string(),
                dot_path: "dot".to_owned(),
                vault_root: temp.path().to_path_buf(),
                ..ProviderSettings::default()
            };
            let doc = "```plantuml\nA->B\n```";
            let expected = "![](data:image/png;base64,UE5HREFUQQ==)";

            let first = converter(
                temp.path(),
                DiagramProvider::from_settings(&settings, cache.bucket("diagrams")),
            )
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();
            assert_eq!(first.text, expected);
            assert_eq!(first.stats.cache_hits, 0);
            assert_eq!(calls(temp.path()), 1);

            let second = converter(
                temp.path(),
                DiagramProvider::from_settings(&settings, cache.bucket("diagrams")),
            )
            .convert(doc, &temp.path().join("doc.md"))
            .unwrap();
            assert_eq!(second.text, expected);
            assert_eq!(second.stats.cache_hits, 1);
            assert_eq!(calls(temp.path()), 1);
        }
    }
}
