//! Inline rewrite stages.
//!
//! All of these run outside literal regions, so code spans and CDATA bodies
//! keep their markdown characters verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::literal::{outside_literals, outside_markup_literals};
use crate::placeholder::is_icon;
use crate::storage;

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\[\]|#]*)(?:#([^\[\]|]*))?(?:\|([^\[\]]*))?\]\]").unwrap()
});

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[([^\]\n]*)\]\(([^)\s]+)(?:[ \t]+"[^"\n]*")?\)"#).unwrap()
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\[\]\n]*)\]\(([^)\s]+)(?:[ \t]+"[^"\n]*")?\)"#).unwrap()
});

static BOLD_ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*(\S(?:[^\n]*?\S)?)\*\*\*").unwrap());
static BOLD_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(\S(?:[^\n]*?\S)?)\*\*").unwrap());
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(\S(?:[^\n]*?\S)?)\*").unwrap());

static BOLD_ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"___(\S(?:[^\n]*?\S)?)___").unwrap());
static BOLD_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(\S(?:[^\n]*?\S)?)__").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\S(?:[^\n]*?\S)?)_").unwrap());

static STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~(\S(?:[^\n]*?\S)?)~~").unwrap());

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// `[[path#Heading|alias]]` links to other pages of the space.
pub(crate) fn wiki_links(input: &str) -> String {
    outside_literals(input, |segment| {
        WIKI_LINK
            .replace_all(segment, |caps: &Captures<'_>| {
                let title = link_title(&caps[2]);
                let anchor = caps
                    .get(3)
                    .map(|m| m.as_str().trim())
                    .filter(|a| !a.is_empty());
                let alias = caps
                    .get(4)
                    .map(|m| m.as_str().trim())
                    .filter(|a| !a.is_empty());

                let text = match (alias, anchor) {
                    (Some(alias), _) => alias,
                    (None, Some(anchor)) if title.is_empty() => anchor,
                    _ => title,
                };
                if text.is_empty() {
                    return caps[0].to_owned();
                }
                storage::page_link(title, anchor, text)
            })
            .into_owned()
    })
}

/// Page title for a vault path: last segment without the `.md` extension.
fn link_title(path: &str) -> &str {
    let path = path.trim().trim_end_matches('\\');
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}

/// Drop `![alt](...)` images that point into the icon folder.
pub(crate) fn strip_icons(input: &str, icon_prefix: &str) -> String {
    outside_literals(input, |segment| {
        MARKDOWN_IMAGE
            .replace_all(segment, |caps: &Captures<'_>| {
                let target = caps[2].trim_start_matches('<').trim_end_matches('>');
                if is_icon(target, icon_prefix) {
                    String::new()
                } else {
                    caps[0].to_owned()
                }
            })
            .into_owned()
    })
}

/// `![alt](url)` to an image macro.
pub(crate) fn url_images(input: &str) -> String {
    outside_literals(input, |segment| {
        MARKDOWN_IMAGE
            .replace_all(segment, |caps: &Captures<'_>| {
                storage::url_image(&caps[2], caps[1].trim())
            })
            .into_owned()
    })
}

/// Bold, italic and bold-italic in both marker styles.
pub(crate) fn emphasis(input: &str) -> String {
    outside_literals(input, |segment| {
        let out = BOLD_ITALIC_STAR.replace_all(segment, "<strong><em>$1</em></strong>");
        let out = replace_delimited(&out, &BOLD_ITALIC_UNDERSCORE, "<strong><em>", "</em></strong>");
        let out = BOLD_STAR.replace_all(&out, "<strong>$1</strong>");
        let out = replace_delimited(&out, &BOLD_UNDERSCORE, "<strong>", "</strong>");
        let out = ITALIC_STAR.replace_all(&out, "<em>$1</em>");
        replace_delimited(&out, &ITALIC_UNDERSCORE, "<em>", "</em>")
    })
}

/// Replace underscore-delimited spans whose markers are not inside a word.
///
/// `snake_case_name` stays as it is while `_word_` becomes emphasis.
fn replace_delimited(input: &str, pattern: &Regex, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    let mut pos = 0;

    while let Some(caps) = pattern.captures_at(input, pos) {
        let Some(whole) = caps.get(0) else { break };
        let before = input[..whole.start()].chars().next_back();
        let after = input[whole.end()..].chars().next();

        if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
            pos = whole.start() + 1;
            continue;
        }

        out.push_str(&input[last..whole.start()]);
        out.push_str(open);
        out.push_str(&caps[1]);
        out.push_str(close);
        last = whole.end();
        pos = whole.end();
    }

    out.push_str(&input[last..]);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `~~text~~`.
pub(crate) fn strikethrough(input: &str) -> String {
    outside_literals(input, |segment| {
        STRIKE.replace_all(segment, "<del>$1</del>").into_owned()
    })
}

/// `[text](url)` to an anchor.
pub(crate) fn links(input: &str) -> String {
    outside_literals(input, |segment| {
        LINK.replace_all(segment, |caps: &Captures<'_>| {
            format!(r#"<a href="{}">{}</a>"#, storage::attr(&caps[2]), &caps[1])
        })
        .into_owned()
    })
}

/// `` `code` `` spans with escaped content.
pub(crate) fn inline_code(input: &str) -> String {
    outside_markup_literals(input, |segment| {
        INLINE_CODE
            .replace_all(segment, |caps: &Captures<'_>| {
                format!("<code>{}</code>", storage::attr(&caps[1]))
            })
            .into_owned()
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_wiki_link_with_alias() {
        assert_eq!(
            wiki_links("[[Notes/Projects/Alpha|Alpha Plan]]"),
            r#"<ac:link><ri:page ri:content-title="Alpha" /><ac:plain-text-link-body><![CDATA[Alpha Plan]]></ac:plain-text-link-body></ac:link>"#
        );
    }

    #[test]
    fn test_wiki_link_plain() {
        assert_eq!(
            wiki_links("[[Alpha]]"),
            r#"<ac:link><ri:page ri:content-title="Alpha" /><ac:plain-text-link-body><![CDATA[Alpha]]></ac:plain-text-link-body></ac:link>"#
        );
    }

    #[test]
    fn test_wiki_link_strips_md_extension() {
        assert!(wiki_links("[[docs/Setup.md]]").contains(r#"ri:content-title="Setup""#));
    }

    #[test]
    fn test_wiki_link_with_heading() {
        let out = wiki_links("[[Alpha#Goals|goals]]");
        assert!(out.starts_with(r#"<ac:link ac:anchor="Goals"><ri:page ri:content-title="Alpha" />"#));
        assert!(out.contains("<![CDATA[goals]]>"));
    }

    #[test]
    fn test_wiki_link_to_own_heading() {
        assert_eq!(
            wiki_links("[[#Summary]]"),
            r#"<ac:link ac:anchor="Summary"><ac:plain-text-link-body><![CDATA[Summary]]></ac:plain-text-link-body></ac:link>"#
        );
    }

    #[test]
    fn test_note_embed_drops_bang() {
        assert!(wiki_links("![[Meeting]]").starts_with("<ac:link>"));
    }

    #[test]
    fn test_wiki_link_in_code_untouched() {
        assert_eq!(wiki_links("`[[Alpha]]`"), "`[[Alpha]]`");
    }

    #[test]
    fn test_strip_icons() {
        assert_eq!(
            strip_icons("![star](attachments/icons/star.png) Rated", "attachments/icons/"),
            " Rated"
        );
        assert_eq!(
            strip_icons("![chart](img/chart.png)", "attachments/icons/"),
            "![chart](img/chart.png)"
        );
    }

    #[test]
    fn test_url_image() {
        assert_eq!(
            url_images(r#"![Logo](https://example.com/logo.png "Title")"#),
            r#"<ac:image ac:alt="Logo"><ri:url ri:value="https://example.com/logo.png" /></ac:image>"#
        );
    }

    #[test]
    fn test_emphasis_star() {
        assert_eq!(
            emphasis("***all*** **bold** *it*"),
            "<strong><em>all</em></strong> <strong>bold</strong> <em>it</em>"
        );
    }

    #[test]
    fn test_emphasis_underscore() {
        assert_eq!(
            emphasis("___all___ __bold__ _it_"),
            "<strong><em>all</em></strong> <strong>bold</strong> <em>it</em>"
        );
    }

    #[test]
    fn test_intraword_underscores_untouched() {
        assert_eq!(emphasis("snake_case_name"), "snake_case_name");
        assert_eq!(emphasis("a my_var and _real_"), "a my_var and <em>real</em>");
    }

    #[test]
    fn test_italic_requires_tight_markers() {
        assert_eq!(emphasis("2 * 3 * 4"), "2 * 3 * 4");
        assert_eq!(emphasis("_ spaced _"), "_ spaced _");
    }

    #[test]
    fn test_emphasis_skips_inline_code() {
        assert_eq!(emphasis("`*x*` *y*"), "`*x*` <em>y</em>");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(strikethrough("~~gone~~ kept"), "<del>gone</del> kept");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            links("[Docs](https://example.com/?a=1&b=2)"),
            r#"<a href="https://example.com/?a=1&amp;b=2">Docs</a>"#
        );
    }

    #[test]
    fn test_inline_code_escapes() {
        assert_eq!(inline_code("use `a < b`"), "use <code>a &lt; b</code>");
    }

    #[test]
    fn test_inline_code_skips_cdata() {
        let input = "<![CDATA[`raw`]]>";
        assert_eq!(inline_code(input), input);
    }
}
