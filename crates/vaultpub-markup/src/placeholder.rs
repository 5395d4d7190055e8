//! Placeholder extraction and substitution.
//!
//! Mermaid diagrams and image embeds cannot be rendered inline: they become
//! page attachments once the page exists. Extraction swaps them for unique
//! tokens before the main pipeline runs; the synchronizer later replaces each
//! token with an attachment image macro.

use std::sync::LazyLock;

use regex::Regex;

use crate::literal::outside_literals;

/// Token prefix for extracted mermaid diagrams.
pub const DIAGRAM_TOKEN_PREFIX: &str = "MERMAID-PLACEHOLDER-";

/// Token prefix for extracted image embeds.
pub const IMAGE_TOKEN_PREFIX: &str = "IMAGE-ATTACHMENT-";

/// Image extensions recognised in `![[...]]` embeds.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

static MERMAID_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^```mermaid[ \t]*\n(.*?)^```[ \t]*$").unwrap());

static EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\[\]|]+?)(?:\|([^\[\]]*))?\]\]").unwrap());

/// Mermaid source pulled out of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    /// Position among the document's diagrams.
    pub index: usize,
    /// Diagram source without the fence.
    pub code: String,
}

impl DiagramSource {
    /// Token standing in for the diagram.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{DIAGRAM_TOKEN_PREFIX}{}", self.index)
    }

    /// Attachment filename of the rendered diagram.
    #[must_use]
    pub fn attachment_name(&self) -> String {
        format!("{}.svg", self.token())
    }
}

/// Local image embed (`![[photo.png|300]]`) pulled out of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEmbed {
    /// Position among the document's image embeds.
    pub index: usize,
    /// File name inside the vault attachments folder.
    pub filename: String,
    /// Display width from the embed size suffix.
    pub width: Option<u32>,
}

impl ImageEmbed {
    /// Token standing in for the image.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{IMAGE_TOKEN_PREFIX}{}", self.index)
    }
}

/// Replace mermaid fences with standalone diagram tokens.
pub(crate) fn extract_diagrams(input: &str) -> (String, Vec<DiagramSource>) {
    let mut diagrams = Vec::new();
    let output = MERMAID_BLOCK.replace_all(input, |caps: &regex::Captures<'_>| {
        let code = caps[1].strip_suffix('\n').unwrap_or(&caps[1]);
        let diagram = DiagramSource {
            index: diagrams.len(),
            code: code.to_owned(),
        };
        let token = diagram.token();
        diagrams.push(diagram);
        format!("\n{token}\n")
    });
    (output.into_owned(), diagrams)
}

/// Replace local image embeds with image tokens; drop decorative icons.
pub(crate) fn extract_images(input: &str, icon_prefix: &str) -> (String, Vec<ImageEmbed>) {
    let mut images = Vec::new();
    let output = outside_literals(input, |segment| {
        EMBED
            .replace_all(segment, |caps: &regex::Captures<'_>| {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                let target = caps[1].trim();
                if !is_image(target) {
                    return caps[0].to_owned();
                }
                if is_icon(target, icon_prefix) {
                    return String::new();
                }
                let image = ImageEmbed {
                    index: images.len(),
                    filename: target.rsplit('/').next().unwrap_or(target).to_owned(),
                    width: caps.get(2).and_then(|size| parse_width(size.as_str())),
                };
                let mut token = image.token();
                images.push(image);
                // A digit right after the token would extend its index.
                if segment[whole.end..].starts_with(|c: char| c.is_ascii_digit()) {
                    token.push(' ');
                }
                token
            })
            .into_owned()
    });
    (output, images)
}

fn is_image(target: &str) -> bool {
    target
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Whether a vault path points into the decorative icon folder.
pub(crate) fn is_icon(target: &str, icon_prefix: &str) -> bool {
    !icon_prefix.is_empty()
        && target
            .trim_start_matches("./")
            .trim_start_matches('/')
            .starts_with(icon_prefix)
}

/// Width from an Obsidian size suffix: `300` or `300x200`.
fn parse_width(size: &str) -> Option<u32> {
    size.trim().split('x').next()?.parse().ok()
}

/// Replace `token` with `replacement` in a page body.
///
/// A `<p>` wrapper holding nothing but the token is replaced along with it.
/// A token that is a prefix of a longer one (`-1` vs `-10`) is left alone.
#[must_use]
pub fn substitute_placeholder(body: &str, token: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(pos) = rest.find(token) {
        let end = pos + token.len();
        let (before, after) = (&rest[..pos], &rest[end..]);

        if after.starts_with(|c: char| c.is_ascii_digit()) {
            out.push_str(&rest[..end]);
            rest = after;
            continue;
        }

        let open = before.trim_end().strip_suffix("<p>");
        let close = after.trim_start().strip_prefix("</p>");
        if let (Some(prefix), Some(suffix)) = (open, close) {
            out.push_str(prefix);
            out.push_str(replacement);
            rest = suffix;
        } else {
            out.push_str(before);
            out.push_str(replacement);
            rest = after;
        }
    }

    out.push_str(rest);
    out
}
