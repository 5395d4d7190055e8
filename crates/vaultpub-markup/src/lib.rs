//! Markdown to Confluence storage format transcoder.
//!
//! Converts Obsidian-flavoured markdown into Confluence XHTML storage markup
//! through an ordered list of string rewrite stages. Mermaid diagrams and
//! local image embeds cannot be expressed inline, so they are extracted into
//! placeholder tokens that the publisher resolves once attachments exist.
//!
//! # Example
//!
//! ```
//! use vaultpub_markup::transcode;
//!
//! let transcoded = transcode("- [x] Done thing");
//! assert!(transcoded.markup.contains("<ac:task-status>complete</ac:task-status>"));
//! ```

mod block;
mod inline;
mod list;
mod literal;
mod paragraph;
mod pipeline;
mod placeholder;
mod storage;

pub use pipeline::{DEFAULT_ICON_PREFIX, Transcoded, Transcoder, transcode};
pub use placeholder::{
    DIAGRAM_TOKEN_PREFIX, DiagramSource, IMAGE_TOKEN_PREFIX, ImageEmbed, substitute_placeholder,
};
pub use storage::attachment_image;
