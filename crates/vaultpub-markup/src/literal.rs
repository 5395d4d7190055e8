//! Literal regions that rewrite stages must leave alone.
//!
//! Three nested protection levels:
//! - code blocks: fenced blocks and code macros (always whole lines)
//! - markup literals: code blocks plus CDATA sections
//! - all literals: markup literals plus inline code spans

use std::sync::LazyLock;

use regex::Regex;

const FENCE: &str = r"^```[^\n]*\n.*?^```[ \t]*$";
const CODE_MACRO: &str = r#"<ac:structured-macro ac:name="code".*?</ac:structured-macro>"#;
const CDATA: &str = r"<!\[CDATA\[.*?\]\]>";
const INLINE_CODE: &str = r"`[^`\n]+`";

static CODE_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?ms){FENCE}|{CODE_MACRO}")).unwrap());

static MARKUP_LITERALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?ms){FENCE}|{CODE_MACRO}|{CDATA}")).unwrap());

static ALL_LITERALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?ms){FENCE}|{CODE_MACRO}|{CDATA}|{INLINE_CODE}")).unwrap()
});

/// Code macros only, used by paragraph wrapping.
pub(crate) static CODE_MACROS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?s){CODE_MACRO}")).unwrap());

/// Apply `rewrite` to the text between matches of `literal`.
fn map_outside(input: &str, literal: &Regex, mut rewrite: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for m in literal.find_iter(input) {
        out.push_str(&rewrite(&input[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&rewrite(&input[last..]));
    out
}

/// Rewrite everything except fenced code and code macros.
pub(crate) fn outside_code_blocks(input: &str, rewrite: impl FnMut(&str) -> String) -> String {
    map_outside(input, &CODE_BLOCKS, rewrite)
}

/// Rewrite everything except code blocks and CDATA sections.
pub(crate) fn outside_markup_literals(
    input: &str,
    rewrite: impl FnMut(&str) -> String,
) -> String {
    map_outside(input, &MARKUP_LITERALS, rewrite)
}

/// Rewrite everything except code blocks, CDATA sections and inline code.
pub(crate) fn outside_literals(input: &str, rewrite: impl FnMut(&str) -> String) -> String {
    map_outside(input, &ALL_LITERALS, rewrite)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(s: &str) -> String {
        s.to_uppercase()
    }

    #[test]
    fn test_fence_is_protected() {
        let input = "before\n```\ninside\n```\nafter";
        assert_eq!(
            outside_code_blocks(input, shout),
            "BEFORE\n```\ninside\n```\nAFTER"
        );
    }

    #[test]
    fn test_unclosed_fence_is_plain_text() {
        assert_eq!(outside_code_blocks("```\nopen", shout), "```\nOPEN");
    }

    #[test]
    fn test_cdata_is_protected() {
        let input = "a <![CDATA[b]]> c";
        assert_eq!(outside_markup_literals(input, shout), "A <![CDATA[b]]> C");
    }

    #[test]
    fn test_inline_code_is_protected() {
        assert_eq!(outside_literals("x `y` z", shout), "X `y` Z");
        assert_eq!(outside_markup_literals("x `y` z", shout), "X `Y` Z");
    }

    #[test]
    fn test_code_macro_is_protected() {
        let input = r#"a<ac:structured-macro ac:name="code"><ac:plain-text-body><![CDATA[b]]></ac:plain-text-body></ac:structured-macro>c"#;
        let out = outside_code_blocks(input, shout);
        assert!(out.starts_with('A'));
        assert!(out.ends_with('C'));
        assert!(out.contains("[CDATA[b]]"));
    }
}
