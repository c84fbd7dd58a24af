//! Diagram fence tags and output formats.

/// Diagram fence languages recognized in Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLanguage {
    /// `plantuml` or `puml`: rendered in the configured default format.
    PlantUml,
    /// `puml-svg`: always rendered as SVG.
    PlantUmlSvg,
}

impl DiagramLanguage {
    /// Every fence tag that marks a diagram block.
    pub const TAGS: [&'static str; 3] = ["plantuml", "puml", "puml-svg"];

    /// Parse language from a code fence info string.
    ///
    /// Returns None if the tag is not a diagram fence.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plantuml" | "puml" => Some(Self::PlantUml),
            "puml-svg" => Some(Self::PlantUmlSvg),
            _ => None,
        }
    }

    /// Output format this fence requires regardless of configuration.
    #[must_use]
    pub fn forced_format(self) -> Option<DiagramFormat> {
        match self {
            Self::PlantUml => None,
            Self::PlantUmlSvg => Some(DiagramFormat::Svg),
        }
    }
}

/// Output format for rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiagramFormat {
    /// Raster PNG image (default).
    #[default]
    Png,
    /// Vector SVG document.
    Svg,
}

impl DiagramFormat {
    /// Parse format from a configuration value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Format name as used in `PlantUML` flags, server paths and cache keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// MIME type of rendered output.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}
