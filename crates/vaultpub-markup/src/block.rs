//! Line-oriented block stages.

use std::sync::LazyLock;

use regex::Regex;

use crate::literal::outside_code_blocks;
use crate::storage;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---[ \t]*\n(?s:.*?\n)?---[ \t]*(?:\n|\z)").unwrap());

static DATAVIEW_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^```dataview[ \t]*\n(.*?)^```[ \t]*$").unwrap());

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(])(#[\p{L}\p{N}_/-]+)").unwrap());

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.+?)[ \t]*$").unwrap());

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```[ \t]*([A-Za-z0-9_+#.-]*)[^\n]*\n(.*?)^```[ \t]*$").unwrap()
});

static TASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*[-*] \[([ xX])\](?:[ \t]+(.*))?$").unwrap());

static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*-{3,}[ \t]*$").unwrap());

static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*>[ \t]?(.*)$").unwrap());

static CALLOUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([A-Za-z]+)\][+-]?[ \t]*(.*)$").unwrap());

/// Remove a leading YAML frontmatter block.
pub(crate) fn strip_frontmatter(input: &str) -> String {
    FRONTMATTER.replace(input, "").into_owned()
}

/// Turn dataview tag queries into the hashtags they reference.
///
/// ````text
/// ```dataview
/// LIST FROM #project OR #idea
/// ```
/// ````
///
/// becomes `#project #idea`. Queries without tags pass through unchanged.
pub(crate) fn dataview_tags(input: &str) -> String {
    DATAVIEW_BLOCK
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let tags: Vec<&str> = HASHTAG
                .captures_iter(&caps[1])
                .map(|tag| tag.get(1).map_or("", |m| m.as_str()))
                .collect();
            if tags.is_empty() {
                caps[0].to_owned()
            } else {
                tags.join(" ")
            }
        })
        .into_owned()
}

/// `#`..`######` headings.
pub(crate) fn headings(input: &str) -> String {
    outside_code_blocks(input, |segment| {
        HEADING
            .replace_all(segment, |caps: &regex::Captures<'_>| {
                let level = caps[1].len();
                format!("<h{level}>{}</h{level}>", &caps[2])
            })
            .into_owned()
    })
}

/// Fenced code blocks to code macros.
pub(crate) fn fenced_code(input: &str) -> String {
    FENCED_CODE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let lang = Some(&caps[1])
                .filter(|l| !l.is_empty())
                .map(code_language);
            let code = caps[2].strip_suffix('\n').unwrap_or(&caps[2]);
            storage::code_macro(lang, code)
        })
        .into_owned()
}

/// Map common fence aliases to the language names the code macro knows.
fn code_language(lang: &str) -> &str {
    match lang {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "sh" | "shell" | "zsh" => "bash",
        "yml" => "yaml",
        "rs" => "rust",
        "c++" => "cpp",
        "c#" | "cs" => "csharp",
        other => other,
    }
}

/// Pipe tables.
///
/// The first row becomes header cells, the second (separator) row is always
/// dropped, and every later row becomes body cells. Column counts are not
/// checked.
pub(crate) fn tables(input: &str) -> String {
    outside_code_blocks(input, |segment| {
        map_line_runs(segment, is_table_row, |rows| {
            if rows.len() < 2 {
                return None;
            }
            let mut html = String::from("<table><tbody>");
            html.push_str(&table_row(rows[0], "th"));
            for row in &rows[2..] {
                html.push_str(&table_row(row, "td"));
            }
            html.push_str("</tbody></table>");
            Some(html)
        })
    })
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn table_row(line: &str, cell_tag: &str) -> String {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut html = String::from("<tr>");
    for cell in inner.split('|') {
        html.push_str(&format!("<{cell_tag}>{}</{cell_tag}>", cell.trim()));
    }
    html.push_str("</tr>");
    html
}

/// Task list lines; consecutive tasks share one task list.
pub(crate) fn tasks(input: &str) -> String {
    outside_code_blocks(input, |segment| {
        map_line_runs(
            segment,
            |line| TASK.is_match(line),
            |lines| {
                let mut html = String::from("<ac:task-list>");
                for line in lines {
                    if let Some(caps) = TASK.captures(line) {
                        let complete = caps[1].eq_ignore_ascii_case("x");
                        let body = caps.get(2).map_or("", |m| m.as_str().trim_end());
                        html.push_str(&storage::task(complete, body));
                    }
                }
                html.push_str("</ac:task-list>");
                Some(html)
            },
        )
    })
}

/// Lines of three or more hyphens.
pub(crate) fn horizontal_rules(input: &str) -> String {
    outside_code_blocks(input, |segment| {
        RULE.replace_all(segment, "<hr />").into_owned()
    })
}

/// Blockquotes and Obsidian callouts.
///
/// Consecutive quoted lines merge into one element, one paragraph per
/// non-empty line.
pub(crate) fn blockquotes(input: &str) -> String {
    outside_code_blocks(input, |segment| {
        map_line_runs(
            segment,
            |line| QUOTE.is_match(line),
            |lines| {
                let content: Vec<&str> = lines
                    .iter()
                    .filter_map(|line| QUOTE.captures(line))
                    .map(|caps| caps.get(1).map_or("", |m| m.as_str()).trim_end())
                    .collect();
                Some(render_quote(&content))
            },
        )
    })
}

fn render_quote(content: &[&str]) -> String {
    let callout = content.first().and_then(|first| CALLOUT.captures(first));

    let (body_lines, callout) = match callout {
        Some(caps) => {
            let title = caps.get(2).map(|m| m.as_str().trim()).filter(|t| !t.is_empty());
            (&content[1..], Some((panel_name(&caps[1]), title)))
        }
        None => (content, None),
    };

    let paragraphs: String = body_lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{line}</p>"))
        .collect();

    match callout {
        Some((name, title)) => storage::panel_macro(name, title, &paragraphs),
        None => format!("<blockquote>{paragraphs}</blockquote>"),
    }
}

/// Confluence panel macro for an Obsidian callout type.
fn panel_name(kind: &str) -> &'static str {
    match kind.to_ascii_lowercase().as_str() {
        "tip" | "hint" | "success" | "check" | "done" | "important" => "tip",
        "warning" | "caution" | "attention" | "question" | "help" | "faq" => "note",
        "danger" | "error" | "failure" | "fail" | "missing" | "bug" => "warning",
        _ => "info",
    }
}

/// Replace each maximal run of lines matching `is_member` with the output of
/// `render`. When `render` declines (`None`) the lines are kept as they are.
fn map_line_runs(
    input: &str,
    is_member: impl Fn(&str) -> bool,
    mut render: impl FnMut(&[&str]) -> Option<String>,
) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut cursor = 0;

    while cursor < lines.len() {
        let run_len = lines[cursor..]
            .iter()
            .take_while(|line| is_member(line))
            .count();
        if run_len == 0 {
            out.push(lines[cursor].to_owned());
            cursor += 1;
            continue;
        }

        let run = &lines[cursor..cursor + run_len];
        match render(run) {
            Some(html) => out.push(html),
            None => out.extend(run.iter().map(|line| (*line).to_owned())),
        }
        cursor += run_len;
    }

    out.join("\n")
}
