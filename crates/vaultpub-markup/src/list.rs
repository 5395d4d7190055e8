//! Ordered and unordered lists.
//!
//! A cursor walks the lines of a segment. Each list parse returns the
//! rendered element together with the index of the first line it did not
//! consume, so nesting is plain recursion.

use std::sync::LazyLock;

use regex::Regex;

use crate::literal::outside_code_blocks;

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(?:(\d+)\.|([*-]))[ \t]+(.*)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Ordered => "ol",
            Self::Unordered => "ul",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListItem<'a> {
    indent: usize,
    kind: ListKind,
    content: &'a str,
}

fn parse_item(line: &str) -> Option<ListItem<'_>> {
    let caps = LIST_ITEM.captures(line)?;
    let kind = if caps.get(2).is_some() {
        ListKind::Ordered
    } else {
        ListKind::Unordered
    };
    Some(ListItem {
        indent: indent_width(caps.get(1).map_or("", |m| m.as_str())),
        kind,
        content: caps.get(4).map_or("", |m| m.as_str()).trim_end(),
    })
}

/// Leading whitespace width with tabs counted as four columns.
fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| matches!(c, ' ' | '\t'))
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Render every list in the input; other lines pass through.
pub(crate) fn lists(input: &str) -> String {
    outside_code_blocks(input, |segment| {
        let lines: Vec<&str> = segment.split('\n').collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut cursor = 0;

        while cursor < lines.len() {
            match parse_item(lines[cursor]) {
                Some(item) => {
                    let (html, next) = parse_list(&lines, cursor, item.indent, item.kind);
                    out.push(html);
                    cursor = next;
                }
                None => {
                    out.push(lines[cursor].to_owned());
                    cursor += 1;
                }
            }
        }

        out.join("\n")
    })
}

/// Parse one list whose first item sits at `start`.
///
/// Siblings share `indent` and `kind`; blank lines between them do not end
/// the list. Deeper items open a nested list inside the current item and
/// deeper plain lines continue the current item's text.
fn parse_list(lines: &[&str], start: usize, indent: usize, kind: ListKind) -> (String, usize) {
    let mut items = String::new();
    let mut cursor = start;

    while let Some(item) = lines.get(cursor).and_then(|line| parse_item(line)) {
        let mut text = item.content.to_owned();
        let mut children = String::new();
        cursor += 1;

        while let Some(line) = lines.get(cursor) {
            if is_blank(line) {
                break;
            }
            match parse_item(line) {
                Some(child) if child.indent > indent => {
                    let (html, next) = parse_list(lines, cursor, child.indent, child.kind);
                    children.push_str(&html);
                    cursor = next;
                }
                Some(_) => break,
                None if indent_width(line) > indent => {
                    text.push(' ');
                    text.push_str(line.trim());
                    cursor += 1;
                }
                None => break,
            }
        }

        items.push_str(&format!("<li>{text}{children}</li>"));

        let mut peek = cursor;
        while lines.get(peek).is_some_and(|line| is_blank(line)) {
            peek += 1;
        }
        match lines.get(peek).and_then(|line| parse_item(line)) {
            Some(next) if next.indent == indent && next.kind == kind => cursor = peek,
            _ => break,
        }
    }

    let tag = kind.tag();
    (format!("<{tag}>{items}</{tag}>"), cursor)
}
