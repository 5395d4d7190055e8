//! Kroki HTTP rendering.
//!
//! Diagrams are sent one at a time as plain-text POST bodies to
//! `{server}/{endpoint}/{format}`; error responses carry Kroki's message in
//! the body, which is surfaced as is.

use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::DiagramRenderer;

/// Kroki endpoint for mermaid diagrams.
const MERMAID_ENDPOINT: &str = "mermaid";

/// Diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Kroki returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Kroki response is not an SVG document")]
    InvalidSvg,

    #[error("no Kroki server configured (set --kroki-url or [diagrams] kroki_url)")]
    NotConfigured,
}

/// Renders diagrams through a Kroki server.
pub struct KrokiRenderer {
    agent: Agent,
    server_url: String,
}

impl KrokiRenderer {
    /// Create a renderer for the Kroki server at `server_url`.
    #[must_use]
    pub fn new(server_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            server_url: server_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Kroki server URL without trailing slash.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Send diagram source to Kroki and return the response body.
    fn render(&self, endpoint: &str, format: &str, source: &str) -> Result<Vec<u8>, DiagramError> {
        let url = format!("{}/{endpoint}/{format}", self.server_url);
        debug!(url = %url, "Rendering diagram");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(DiagramError::Status {
                status,
                body: error_body,
            });
        }

        Ok(body.read_to_vec()?)
    }
}

impl DiagramRenderer for KrokiRenderer {
    fn render_svg(&self, source: &str) -> Result<Vec<u8>, DiagramError> {
        let data = self.render(MERMAID_ENDPOINT, "svg", source)?;
        if !looks_like_svg(&data) {
            return Err(DiagramError::InvalidSvg);
        }
        Ok(data)
    }
}

/// Whether the payload contains an `<svg` root element near the start.
fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    head.windows(4).any(|w| w == b"<svg")
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_svg() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/mermaid/svg")
            .match_header("content-type", "text/plain")
            .match_body("graph TD\nA-->B")
            .with_status(200)
            .with_body("<svg xmlns=\"http://www.w3.org/2000/svg\"/>")
            .create();
        let renderer = KrokiRenderer::new(&format!("{}/", server.url()), Duration::from_secs(5));

        let svg = renderer.render_svg("graph TD\nA-->B").unwrap();

        assert!(String::from_utf8(svg).unwrap().starts_with("<svg"));
        mock.assert();
    }

    #[test]
    fn test_render_error_body_surfaced() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/mermaid/svg")
            .with_status(400)
            .with_body("Syntax error in graph")
            .create();
        let renderer = KrokiRenderer::new(&server.url(), Duration::from_secs(5));

        let err = renderer.render_svg("graph ???").unwrap_err();

        assert!(matches!(err, DiagramError::Status { status: 400, .. }));
        assert_eq!(err.to_string(), "Kroki returned HTTP 400: Syntax error in graph");
        mock.assert();
    }

    #[test]
    fn test_non_svg_response_rejected() {
        let mut server = Server::new();
        let _mock = server
            .mock("POST", "/mermaid/svg")
            .with_status(200)
            .with_body("<html>proxy login</html>")
            .create();
        let renderer = KrokiRenderer::new(&server.url(), Duration::from_secs(5));

        let err = renderer.render_svg("graph TD").unwrap_err();

        assert!(matches!(err, DiagramError::InvalidSvg));
    }

    #[test]
    fn test_server_url_trailing_slash_trimmed() {
        let renderer = KrokiRenderer::new("https://kroki.io/", Duration::from_secs(1));
        assert_eq!(renderer.server_url(), "https://kroki.io");
    }

    #[test]
    fn test_looks_like_svg() {
        assert!(looks_like_svg(b"<?xml version=\"1.0\"?>\n<svg></svg>"));
        assert!(!looks_like_svg(b"PNG"));
    }
}
