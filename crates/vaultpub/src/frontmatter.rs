//! Writing properties into a note's YAML frontmatter.

use regex::Regex;

const DELIMITER: &str = "---";

/// Set `key` to `value` in the frontmatter of `markdown`.
///
/// An existing `key:` line is replaced, otherwise the property is appended to
/// the frontmatter. Notes without frontmatter get a new block on top.
pub(crate) fn set_property(markdown: &str, key: &str, value: &str) -> String {
    let property = format!("{key}: {value}");
    let lines: Vec<&str> = markdown.split('\n').collect();

    let closing = if lines.first().map(|l| l.trim_end()) == Some(DELIMITER) {
        lines
            .iter()
            .skip(1)
            .position(|l| l.trim_end() == DELIMITER)
            .map(|i| i + 1)
    } else {
        None
    };

    let Some(closing) = closing else {
        return format!("{DELIMITER}\n{property}\n{DELIMITER}\n{markdown}");
    };

    let key_line = Regex::new(&format!(r"^{}[ \t]*:", regex::escape(key)))
        .ok()
        .and_then(|re| {
            lines[1..closing]
                .iter()
                .position(|l| re.is_match(l))
                .map(|i| i + 1)
        });

    let mut out = lines;
    match key_line {
        Some(index) => out[index] = &property,
        None => out.insert(closing, &property),
    }
    out.join("\n")
}
