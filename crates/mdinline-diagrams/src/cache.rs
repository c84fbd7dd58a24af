//! Diagram cache key computation.
//!
//! Provides [`DiagramKey`] for computing content-addressed cache keys.

use crate::encoding::encode;
use crate::error::EncodingError;
use crate::language::DiagramFormat;

/// Diagram parameters for cache key computation.
///
/// Contains everything that affects the rendered output: the source text
/// and the output format. Raster and vector renders of the same source are
/// cached separately.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram source exactly as written in the fence.
    pub source: &'a str,
    /// Output format.
    pub format: DiagramFormat,
}

impl DiagramKey<'_> {
    /// Compute the cache key for this diagram.
    ///
    /// # Key Format
    ///
    /// `"{format}-{encoded}"` where `encoded` is the `PlantUML` text
    /// encoding of the source, e.g. `png-SyfFKj2rKt3CoKnELR1Io4ZDoSa70000`.
    pub fn compute_key(&self) -> Result<String, EncodingError> {
        Ok(format!("{}-{}", self.format.as_str(), encode(self.source)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::decode;

    #[test]
    fn test_diagram_key_is_deterministic() {
        let key1 = DiagramKey {
            source: "Bob->Alice",
            format: DiagramFormat::Png,
        };
        let key2 = DiagramKey {
            source: "Bob->Alice",
            format: DiagramFormat::Png,
        };
        let key3 = DiagramKey {
            source: "Alice->Bob",
            format: DiagramFormat::Png,
        };

        assert_eq!(key1.compute_key().unwrap(), key2.compute_key().unwrap());
        assert_ne!(key1.compute_key().unwrap(), key3.compute_key().unwrap());
    }

    #[test]
    fn test_diagram_key_format_matters() {
        let png = DiagramKey {
            source: "Bob->Alice",
            format: DiagramFormat::Png,
        };
        let svg = DiagramKey {
            format: DiagramFormat::Svg,
            ..png
        };

        assert!(png.compute_key().unwrap().starts_with("png-"));
        assert!(svg.compute_key().unwrap().starts_with("svg-"));
    }

    #[test]
    fn test_diagram_key_embeds_encoded_source() {
        let key = DiagramKey {
            source: "Bob->Alice",
            format: DiagramFormat::Svg,
        }
        .compute_key()
        .unwrap();

        let encoded = key.strip_prefix("svg-").unwrap();
        assert_eq!(decode(encoded).unwrap(), "Bob->Alice");
    }
}
