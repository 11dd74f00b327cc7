use std::sync::LazyLock;

use regex::Regex;

static HYPHEN_NEWLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<prefix>\w)-[ \t]*\r?\n[ \t]*(?P<suffix>\w)").expect("valid regex")
});

static INNER_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes extractor output: rejoins words hyphenated across a line break,
/// collapses runs of whitespace inside each line, and reduces any run of blank
/// lines to a single paragraph break.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let de_hyphenated = HYPHEN_NEWLINE.replace_all(raw, "$prefix$suffix");

    let mut result = String::with_capacity(de_hyphenated.len());
    let mut prev_was_blank = false;

    for line in de_hyphenated.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            prev_was_blank = true;
            continue;
        }

        if !result.is_empty() {
            result.push_str(if prev_was_blank { "\n\n" } else { "\n" });
        }
        result.push_str(&INNER_WHITESPACE.replace_all(trimmed, " "));
        prev_was_blank = false;
    }

    result
}
