//! Splits a physical line of the text dump into its column fields.
//!
//! The PDF-to-text conversion separates columns by arbitrary runs of spaces
//! and tabs. The one space that carries meaning is U+3000 IDEOGRAPHIC SPACE,
//! which indents uncommon readings ("1字下げ"), so it is never treated as a
//! separator.

use lazy_static::lazy_static;
use regex::Regex;

/// Private-use placeholder for the space after '⇔'.
const ARROW_SPACE: &str = "\u{E000}";
/// Private-use column separator.
const SEPARATOR: &str = "\u{E001}";

lazy_static! {
    static ref LEADING_BLANKS: Regex = Regex::new(r"^[ \t]+").unwrap();
    static ref BLANK_RUN: Regex = Regex::new(r"[ \t]+").unwrap();
}

/// Split a raw table row into trimmed fields.
///
/// Returns an empty vector for blank lines.
pub fn split_row(line: &str) -> Vec<String> {
    let line = LEADING_BLANKS.replace(line, "");
    let line = line.trim_end();
    if line.is_empty() {
        return Vec::new();
    }

    let protected = line.replace("⇔ ", &format!("⇔{ARROW_SPACE}"));
    let collapsed = BLANK_RUN.replace_all(&protected, SEPARATOR);

    collapsed
        .split(SEPARATOR)
        .map(|field| field.replace(ARROW_SPACE, " "))
        .collect()
}
