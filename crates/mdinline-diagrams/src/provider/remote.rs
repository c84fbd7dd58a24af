//! Remote `PlantUML` server provider.

use crate::consts::DEFAULT_SERVER_URL;
use crate::encoding::encode;
use crate::error::EncodingError;
use crate::language::DiagramFormat;

/// Builds `PlantUML` server image URLs.
///
/// No request is made: the URL is embedded in the document and fetched by
/// whatever eventually displays it.
#[derive(Debug, Clone)]
pub struct RemoteServiceProvider {
    base_url: String,
}

impl RemoteServiceProvider {
    /// Create a provider for the given server. An empty URL selects
    /// [`DEFAULT_SERVER_URL`].
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/');
        let base_url = if trimmed.is_empty() {
            DEFAULT_SERVER_URL.to_owned()
        } else {
            trimmed.to_owned()
        };
        Self { base_url }
    }

    /// Server base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Image URL in the form `{base_url}/{svg|png}/{encoded}`.
    pub fn url(&self, source: &str, format: DiagramFormat) -> Result<String, EncodingError> {
        let url = format!("{}/{}/{}", self.base_url, format.as_str(), encode(source)?);
        tracing::debug!(%url, "built PlantUML server URL");
        Ok(url)
    }
}
