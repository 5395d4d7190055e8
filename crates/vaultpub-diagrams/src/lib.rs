//! Diagram rendering via Kroki for vaultpub.
//!
//! Mermaid sources pulled out of a note are rendered to SVG before they are
//! attached to the published page. Rendering sits behind the
//! [`DiagramRenderer`] trait so the publisher can be exercised without a
//! Kroki server.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use vaultpub_diagrams::{DiagramRenderer, KrokiRenderer};
//!
//! let renderer = KrokiRenderer::new("https://kroki.io", Duration::from_secs(30));
//! let svg = renderer.render_svg("graph TD\nA-->B")?;
//! # Ok::<(), vaultpub_diagrams::DiagramError>(())
//! ```

mod kroki;

pub use kroki::{DiagramError, KrokiRenderer};

/// Turns diagram source into SVG bytes.
pub trait DiagramRenderer {
    /// Render mermaid source to an SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer is unreachable or rejects the source.
    fn render_svg(&self, source: &str) -> Result<Vec<u8>, DiagramError>;
}

/// Renderer used when no Kroki server is configured.
///
/// Every diagram fails, so notes still publish with their diagram
/// placeholders left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRenderer;

impl DiagramRenderer for DisabledRenderer {
    fn render_svg(&self, _source: &str) -> Result<Vec<u8>, DiagramError> {
        Err(DiagramError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_renderer_fails() {
        let err = DisabledRenderer.render_svg("graph TD").unwrap_err();
        assert!(matches!(err, DiagramError::NotConfigured));
    }
}
