//! Confluence storage format element builders.
//!
//! Every stage that emits a macro goes through these helpers so attribute
//! escaping and CDATA handling live in one place.

use std::borrow::Cow;
use std::fmt::Write;

use quick_xml::escape::escape;

/// Escape a value for use inside an XML attribute or text node.
pub(crate) fn attr(value: &str) -> Cow<'_, str> {
    escape(value)
}

/// Wrap text in a CDATA section, splitting any embedded `]]>`.
pub(crate) fn cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}

/// Code macro with an optional language parameter.
pub(crate) fn code_macro(lang: Option<&str>, content: &str) -> String {
    let mut out =
        String::from(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
    if let Some(lang) = lang {
        write!(
            out,
            r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
            attr(lang)
        )
        .unwrap();
    }
    // CDATA content is not escaped
    write!(
        out,
        "<ac:plain-text-body>{}</ac:plain-text-body>",
        cdata(content)
    )
    .unwrap();
    out.push_str("</ac:structured-macro>");
    out
}

/// Link to another page in the same space, optionally to a heading anchor.
pub(crate) fn page_link(title: &str, anchor: Option<&str>, text: &str) -> String {
    let mut out = String::from("<ac:link");
    if let Some(anchor) = anchor {
        write!(out, r#" ac:anchor="{}""#, attr(anchor)).unwrap();
    }
    out.push('>');
    if !title.is_empty() {
        write!(out, r#"<ri:page ri:content-title="{}" />"#, attr(title)).unwrap();
    }
    write!(
        out,
        "<ac:plain-text-link-body>{}</ac:plain-text-link-body></ac:link>",
        cdata(text)
    )
    .unwrap();
    out
}

/// Image referenced by URL.
pub(crate) fn url_image(url: &str, alt: &str) -> String {
    if alt.is_empty() {
        format!(r#"<ac:image><ri:url ri:value="{}" /></ac:image>"#, attr(url))
    } else {
        format!(
            r#"<ac:image ac:alt="{}"><ri:url ri:value="{}" /></ac:image>"#,
            attr(alt),
            attr(url)
        )
    }
}

/// Image embedded from an attachment of the current page.
///
/// Generates: `<ac:image ac:width="{w}"><ri:attachment ri:filename="{f}" /></ac:image>`
pub fn attachment_image(filename: &str, width: Option<u32>) -> String {
    match width {
        Some(width) => format!(
            r#"<ac:image ac:width="{width}"><ri:attachment ri:filename="{}" /></ac:image>"#,
            attr(filename)
        ),
        None => format!(
            r#"<ac:image><ri:attachment ri:filename="{}" /></ac:image>"#,
            attr(filename)
        ),
    }
}

/// A single task inside an `ac:task-list`.
pub(crate) fn task(complete: bool, body: &str) -> String {
    let status = if complete { "complete" } else { "incomplete" };
    format!(
        "<ac:task><ac:task-status>{status}</ac:task-status><ac:task-body>{body}</ac:task-body></ac:task>"
    )
}

/// Panel macro (`info`, `tip`, `note`, `warning`) with rich-text body.
pub(crate) fn panel_macro(name: &str, title: Option<&str>, body: &str) -> String {
    let mut out = format!(r#"<ac:structured-macro ac:name="{name}" ac:schema-version="1">"#);
    if let Some(title) = title {
        write!(
            out,
            r#"<ac:parameter ac:name="title">{}</ac:parameter>"#,
            attr(title)
        )
        .unwrap();
    }
    write!(out, "<ac:rich-text-body>{body}</ac:rich-text-body>").unwrap();
    out.push_str("</ac:structured-macro>");
    out
}
