//! Transcoding pipeline.

use tracing::debug;

use crate::placeholder::{DiagramSource, ImageEmbed, extract_diagrams, extract_images};
use crate::{block, inline, list, paragraph};

/// Default folder prefix of decorative icon images.
pub const DEFAULT_ICON_PREFIX: &str = "attachments/icons/";

type Stage = fn(&Transcoder, &str) -> String;

/// Rewrite stages in execution order.
///
/// Frontmatter is removed and placeholders are extracted before these run.
/// Order matters: code fences must become macros before the inline stages
/// run, and lists and paragraphs see the output of everything else.
const STAGES: &[(&str, Stage)] = &[
    ("dataview", |_, s| block::dataview_tags(s)),
    ("wiki_links", |_, s| inline::wiki_links(s)),
    ("icons", |t, s| inline::strip_icons(s, &t.icon_prefix)),
    ("headings", |_, s| block::headings(s)),
    ("fenced_code", |_, s| block::fenced_code(s)),
    ("url_images", |_, s| inline::url_images(s)),
    ("tables", |_, s| block::tables(s)),
    ("tasks", |_, s| block::tasks(s)),
    ("emphasis", |_, s| inline::emphasis(s)),
    ("strikethrough", |_, s| inline::strikethrough(s)),
    ("links", |_, s| inline::links(s)),
    ("inline_code", |_, s| inline::inline_code(s)),
    ("horizontal_rules", |_, s| block::horizontal_rules(s)),
    ("blockquotes", |_, s| block::blockquotes(s)),
    ("lists", |_, s| list::lists(s)),
    ("paragraphs", |_, s| paragraph::paragraphs(s)),
];

/// Result of transcoding one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    /// Storage format markup, possibly containing placeholder tokens.
    pub markup: String,
    /// Mermaid diagrams awaiting rendering.
    pub diagrams: Vec<DiagramSource>,
    /// Local images awaiting upload.
    pub images: Vec<ImageEmbed>,
}

impl Transcoded {
    /// Whether the markup still references attachments that do not exist yet.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        !self.diagrams.is_empty() || !self.images.is_empty()
    }
}

/// Markdown to Confluence storage format converter.
///
/// # Example
///
/// ```
/// use vaultpub_markup::Transcoder;
///
/// let transcoded = Transcoder::new().transcode("Hello **world**");
/// assert_eq!(transcoded.markup, "<p>Hello <strong>world</strong></p>");
/// ```
#[derive(Debug, Clone)]
pub struct Transcoder {
    icon_prefix: String,
}

impl Transcoder {
    /// Create a transcoder with the default icon prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            icon_prefix: DEFAULT_ICON_PREFIX.to_owned(),
        }
    }

    /// Set the vault folder whose images are dropped as decorative icons.
    #[must_use]
    pub fn icon_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.icon_prefix = prefix.into();
        self
    }

    /// Convert a markdown document.
    ///
    /// Never fails: constructs that do not match a stage pass through as text.
    #[must_use]
    pub fn transcode(&self, markdown: &str) -> Transcoded {
        let normalized = markdown.replace("\r\n", "\n");
        // Embeds in frontmatter properties are metadata, not content.
        let content = block::strip_frontmatter(&normalized);
        let (text, diagrams) = extract_diagrams(&content);
        let (mut text, images) = extract_images(&text, &self.icon_prefix);

        for (name, stage) in STAGES {
            text = stage(self, &text);
            debug!(stage = name, len = text.len(), "Applied stage");
        }

        debug!(
            diagrams = diagrams.len(),
            images = images.len(),
            "Transcoded document"
        );

        Transcoded {
            markup: text,
            diagrams,
            images,
        }
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a markdown document with default settings.
#[must_use]
pub fn transcode(markdown: &str) -> Transcoded {
    Transcoder::new().transcode(markdown)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(transcode("text").markup, "<p>text</p>");
    }

    #[test]
    fn test_single_code_block() {
        assert_eq!(
            transcode("```python\nprint(1)\n```").markup,
            r#"<ac:structured-macro ac:name="code" ac:schema-version="1"><ac:parameter ac:name="language">python</ac:parameter><ac:plain-text-body><![CDATA[print(1)]]></ac:plain-text-body></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_code_block_content_is_verbatim() {
        let out = transcode("```\n# not a heading\n**not bold** [[NotALink]]\n- item\n```").markup;
        assert!(out.contains("<![CDATA[# not a heading\n**not bold** [[NotALink]]\n- item]]>"));
        assert!(!out.contains("<h1>"));
        assert!(!out.contains("<ul>"));
    }

    #[test]
    fn test_frontmatter_removed() {
        assert_eq!(
            transcode("---\ntitle: x\n---\nBody").markup,
            "<p>Body</p>"
        );
    }

    #[test]
    fn test_frontmatter_embeds_not_extracted() {
        let transcoded = transcode("---\nbanner: \"![[cover.png]]\"\n---\nHello");
        assert_eq!(transcoded.markup, "<p>Hello</p>");
        assert!(transcoded.images.is_empty());
        assert!(!transcoded.has_placeholders());
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(transcode("# Title\r\n\r\nText").markup, "<h1>Title</h1>\n<p>Text</p>");
    }

    #[test]
    fn test_wiki_links_in_paragraph() {
        assert_eq!(
            transcode("See [[Notes/Projects/Alpha|Alpha Plan]].").markup,
            r#"<p>See <ac:link><ri:page ri:content-title="Alpha" /><ac:plain-text-link-body><![CDATA[Alpha Plan]]></ac:plain-text-link-body></ac:link>.</p>"#
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            transcode("- [x] Done thing\n- [ ] Todo").markup,
            concat!(
                "<ac:task-list>",
                "<ac:task><ac:task-status>complete</ac:task-status><ac:task-body>Done thing</ac:task-body></ac:task>",
                "<ac:task><ac:task-status>incomplete</ac:task-status><ac:task-body>Todo</ac:task-body></ac:task>",
                "</ac:task-list>"
            )
        );
    }

    #[test]
    fn test_diagram_placeholder() {
        let transcoded = transcode("Intro\n\n```mermaid\ngraph TD\n```\n\nOutro");
        assert_eq!(
            transcoded.markup,
            "<p>Intro</p>\n<p>MERMAID-PLACEHOLDER-0</p>\n<p>Outro</p>"
        );
        assert_eq!(transcoded.diagrams[0].code, "graph TD");
        assert!(transcoded.has_placeholders());
    }

    #[test]
    fn test_image_placeholder_and_icon() {
        let transcoded = Transcoder::new()
            .icon_prefix("_icons/")
            .transcode("![[_icons/dot.png]] ![[shot.png|200]]");
        assert_eq!(transcoded.markup, "<p>IMAGE-ATTACHMENT-0</p>");
        assert_eq!(transcoded.images[0].filename, "shot.png");
        assert_eq!(transcoded.images[0].width, Some(200));
    }

    #[test]
    fn test_document() {
        let markdown = "\
# Plan

Some *intro* text with `code` and ~~old~~ parts.

| Name | Role |
|------|------|
| Ada | Lead |

1. First
2. Second
   - detail

> [!note] Heads up
> Read this

---
";
        assert_eq!(
            transcode(markdown).markup,
            concat!(
                "<h1>Plan</h1>\n",
                "<p>Some <em>intro</em> text with <code>code</code> and <del>old</del> parts.</p>\n",
                "<table><tbody><tr><th>Name</th><th>Role</th></tr><tr><td>Ada</td><td>Lead</td></tr></tbody></table>\n",
                "<ol><li>First</li><li>Second<ul><li>detail</li></ul></li></ol>\n",
                r#"<ac:structured-macro ac:name="info" ac:schema-version="1"><ac:parameter ac:name="title">Heads up</ac:parameter><ac:rich-text-body><p>Read this</p></ac:rich-text-body></ac:structured-macro>"#,
                "\n<hr />"
            )
        );
    }
}
