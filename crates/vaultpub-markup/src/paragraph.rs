//! Final paragraph wrapping.

use crate::literal::CODE_MACROS;

/// Opening tags of elements that are never wrapped in a paragraph.
const BLOCK_PREFIXES: &[&str] = &[
    "<h1", "<h2", "<h3", "<h4", "<h5", "<h6", "<ul", "<ol", "<table", "<hr", "<blockquote",
    "<ac:structured-macro", "<ac:task-list", "<p>", "<div", "<pre",
];

fn is_block(line: &str) -> bool {
    BLOCK_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Wrap blank-line separated runs of text in `<p>`.
///
/// Code macros are opaque: their CDATA bodies may contain blank lines and
/// anything else.
pub(crate) fn paragraphs(input: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut last = 0;

    for m in CODE_MACROS.find_iter(input) {
        wrap_segment(&input[last..m.start()], &mut blocks);
        blocks.push(m.as_str().to_owned());
        last = m.end();
    }
    wrap_segment(&input[last..], &mut blocks);

    blocks.join("\n")
}

fn wrap_segment(segment: &str, blocks: &mut Vec<String>) {
    let mut paragraph: Vec<&str> = Vec::new();

    for line in segment.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut paragraph, blocks);
        } else if is_block(line) {
            flush(&mut paragraph, blocks);
            blocks.push(line.to_owned());
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut paragraph, blocks);
}

fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if !paragraph.is_empty() {
        blocks.push(format!("<p>{}</p>", paragraph.join("\n")));
        paragraph.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(paragraphs("text"), "<p>text</p>");
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        assert_eq!(
            paragraphs("one\ntwo\n\n\nthree"),
            "<p>one\ntwo</p>\n<p>three</p>"
        );
    }

    #[test]
    fn test_blocks_are_not_wrapped() {
        assert_eq!(
            paragraphs("<h1>Title</h1>\nIntro\n<hr />\n<ul><li>a</li></ul>"),
            "<h1>Title</h1>\n<p>Intro</p>\n<hr />\n<ul><li>a</li></ul>"
        );
    }

    #[test]
    fn test_code_macro_is_opaque() {
        let code = r#"<ac:structured-macro ac:name="code" ac:schema-version="1"><ac:plain-text-body><![CDATA[a

b]]></ac:plain-text-body></ac:structured-macro>"#;
        assert_eq!(
            paragraphs(&format!("before\n{code}\nafter")),
            format!("<p>before</p>\n{code}\n<p>after</p>")
        );
    }

    #[test]
    fn test_whitespace_only_input() {
        assert_eq!(paragraphs("\n  \n"), "");
    }
}
