//! In-process renderer provider.

use std::sync::Arc;

use crate::error::DiagramError;
use crate::provider::DiagramPayload;

/// A diagram renderer running inside the host process.
///
/// `render_svg` returns only once rendering has completed, so callers never
/// need to poll for "rendering finished".
pub trait DiagramRenderer: Send + Sync {
    /// Render diagram source to an SVG document.
    fn render_svg(&self, source: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Provider backed by a host-supplied [`DiagramRenderer`].
///
/// Always produces vector output.
#[derive(Clone)]
pub struct InProcessProvider {
    renderer: Arc<dyn DiagramRenderer>,
}

impl InProcessProvider {
    #[must_use]
    pub fn new(renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self { renderer }
    }

    pub(crate) fn render(&self, source: &str) -> Result<DiagramPayload, DiagramError> {
        self.renderer
            .render_svg(source)
            .map(DiagramPayload::Vector)
            .map_err(|e| DiagramError::Render(e.to_string()))
    }
}
