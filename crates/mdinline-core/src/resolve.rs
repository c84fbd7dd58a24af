//! Mapping references to concrete resources.
//!
//! Image links follow the editor's link resolution: explicit paths are tried
//! relative to the referencing document and then the vault root, bare file
//! names are looked up in a vault-wide index.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use mdinline_diagrams::DiagramLanguage;

use crate::extract::{Reference, ReferenceKind};

/// A reference mapped to something that can produce a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedResource {
    /// Image file on disk. May not exist; reading it reports the error.
    File(PathBuf),
    /// Diagram source, unchanged.
    Diagram {
        source: String,
        language: DiagramLanguage,
    },
}

/// Files in the vault, keyed by lowercase file name.
#[derive(Debug, Default)]
pub struct VaultIndex {
    files: HashMap<String, Vec<PathBuf>>,
}

impl VaultIndex {
    /// Walk `root` and index every non-hidden file.
    ///
    /// Returns an empty index if the root doesn't exist.
    #[must_use]
    pub fn scan(root: &Path) -> Self {
        let mut index = Self::default();
        if root.is_dir() {
            index.scan_directory(root);
        }
        for paths in index.files.values_mut() {
            paths.sort();
        }
        index
    }

    fn scan_directory(&mut self, dir: &Path) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.scan_directory(&path);
            } else {
                self.files.entry(name).or_default().push(path);
            }
        }
    }

    /// Files whose name matches `name`, case-insensitively, sorted by path.
    #[must_use]
    pub fn lookup(&self, name: &str) -> &[PathBuf] {
        self.files
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Resolves references against a vault.
#[derive(Debug)]
pub struct Resolver {
    root: PathBuf,
    index: VaultIndex,
}

impl Resolver {
    /// Create a resolver for `root`, scanning it once.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let index = VaultIndex::scan(&root);
        tracing::debug!(root = %root.display(), files = index.len(), "Indexed vault");
        Self { root, index }
    }

    /// Map a reference from the document at `source_path` to a resource.
    #[must_use]
    pub fn resolve(&self, reference: &Reference<'_>, source_path: &Path) -> ResolvedResource {
        match (reference.kind, reference.language) {
            (ReferenceKind::Diagram, Some(language)) => ResolvedResource::Diagram {
                source: reference.target.clone(),
                language,
            },
            _ => ResolvedResource::File(self.resolve_image(&reference.target, source_path)),
        }
    }

    /// Resolve an image link to a file path.
    ///
    /// Falls back to `root/link` when nothing matches.
    #[must_use]
    pub fn resolve_image(&self, link: &str, source_path: &Path) -> PathBuf {
        let source_dir = source_path.parent().unwrap_or(Path::new(""));

        if link.contains(['/', '\\']) {
            let candidates = [source_dir.join(link), self.root.join(link)];
            if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
                return found;
            }
        }

        if let Some(found) = self.lookup_by_name(link, source_dir) {
            return found;
        }

        self.root.join(link)
    }

    fn lookup_by_name(&self, link: &str, source_dir: &Path) -> Option<PathBuf> {
        let link_path = Path::new(link);
        let name = link_path.file_name()?.to_string_lossy();
        let candidates = self
            .index
            .lookup(&name)
            .iter()
            .filter(|p| link_path.components().count() == 1 || p.ends_with(link_path));

        let mut best: Option<&PathBuf> = None;
        for candidate in candidates {
            if candidate.parent() == Some(source_dir) {
                return Some(candidate.clone());
            }
            if best.is_none_or(|b| candidate.components().count() < b.components().count()) {
                best = Some(candidate);
            }
        }
        best.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "a.png");
        write(temp.path(), "sub/b.png");
        write(temp.path(), ".obsidian/c.png");
        write(temp.path(), ".hidden.png");

        let index = VaultIndex::scan(temp.path());

        assert_eq!(index.len(), 2);
        assert!(index.lookup("c.png").is_empty());
        assert!(index.lookup(".hidden.png").is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let index = VaultIndex::scan(Path::new("/nonexistent/vault"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let temp = tempfile::tempdir().unwrap();
        let path = write(temp.path(), "img/Photo.PNG");

        let index = VaultIndex::scan(temp.path());

        assert_eq!(index.lookup("photo.png"), &[path]);
    }

    #[test]
    fn test_bare_name_found_anywhere() {
        let temp = tempfile::tempdir().unwrap();
        let image = write(temp.path(), "attachments/diagram.png");
        let doc = temp.path().join("notes/today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(resolver.resolve_image("diagram.png", &doc), image);
    }

    #[test]
    fn test_bare_name_prefers_document_folder() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "a.png");
        let local = write(temp.path(), "notes/deep/a.png");
        let doc = temp.path().join("notes/deep/today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(resolver.resolve_image("a.png", &doc), local);
    }

    #[test]
    fn test_bare_name_prefers_shortest_path() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "z/y/x/a.png");
        let shallow = write(temp.path(), "m/a.png");
        let doc = temp.path().join("notes/today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(resolver.resolve_image("a.png", &doc), shallow);
    }

    #[test]
    fn test_path_relative_to_document() {
        let temp = tempfile::tempdir().unwrap();
        let image = write(temp.path(), "notes/img/a.png");
        write(temp.path(), "img/a.png");
        let doc = temp.path().join("notes/today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(resolver.resolve_image("img/a.png", &doc), image);
    }

    #[test]
    fn test_path_relative_to_root() {
        let temp = tempfile::tempdir().unwrap();
        let image = write(temp.path(), "assets/a.png");
        let doc = temp.path().join("notes/today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(resolver.resolve_image("assets/a.png", &doc), image);
    }

    #[test]
    fn test_partial_path_matches_index_suffix() {
        let temp = tempfile::tempdir().unwrap();
        let image = write(temp.path(), "archive/assets/a.png");
        write(temp.path(), "other/a.png");
        let doc = temp.path().join("notes/today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(resolver.resolve_image("assets/a.png", &doc), image);
    }

    #[test]
    fn test_missing_falls_back_to_root() {
        let temp = tempfile::tempdir().unwrap();
        let doc = temp.path().join("today.md");

        let resolver = Resolver::new(temp.path());

        assert_eq!(
            resolver.resolve_image("missing.png", &doc),
            temp.path().join("missing.png")
        );
    }

    #[test]
    fn test_percent_decoded_name_resolves() {
        let temp = tempfile::tempdir().unwrap();
        let image = write(temp.path(), "pics/my file.png");
        let doc = temp.path().join("today.md");
        let resolver = Resolver::new(temp.path());

        let reference = extract("![x](my%20file.png)", ReferenceKind::StandardImage)
            .next()
            .unwrap();

        assert_eq!(resolver.resolve(&reference, &doc), ResolvedResource::File(image));
    }

    #[test]
    fn test_diagram_passes_through() {
        let resolver = Resolver::new("/nonexistent");
        let reference = extract("```puml-svg\nA -> B\n```", ReferenceKind::Diagram)
            .next()
            .unwrap();

        assert_eq!(
            resolver.resolve(&reference, Path::new("doc.md")),
            ResolvedResource::Diagram {
                source: "A -> B".to_owned(),
                language: DiagramLanguage::PlantUmlSvg,
            }
        );
    }
}
