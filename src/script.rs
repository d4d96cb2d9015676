//! Content-shape predicates for table fields and structural lines.
//!
//! Script membership uses `sc=` (Script) rather than bare `\p{Han}` so that
//! punctuation shared between scripts (「」。、) never counts as kana or kanji.

use lazy_static::lazy_static;
use regex::Regex;

/// U+3000 IDEOGRAPHIC SPACE, the indentation that marks an uncommon reading.
pub const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Examples glossed inline with their reading; otherwise indistinguishable
/// from notes because of the parentheses.
pub const GLOSSED_EXAMPLES: &[&str] = &[
    "一羽（わ）",
    "六羽（ぱ）",
    "三日（みっか）",
    "四日（よっか）",
    "一把（ワ）",
    "三把（バ）",
    "十把（パ）",
];

lazy_static! {
    static ref KANJI: Regex = Regex::new(r"^\p{sc=Han}$").unwrap();
    static ref OLD_KANJI: Regex = Regex::new(r"^（(\p{sc=Han})）$").unwrap();
    static ref BRACKETED_VARIANT: Regex = Regex::new(r"^［(.)］$").unwrap();
    static ref READING: Regex =
        Regex::new(r"^[\x{3000}\p{sc=Hiragana}\p{sc=Katakana}]+$").unwrap();
    static ref EXAMPLES: Regex =
        Regex::new(r"^[\p{sc=Han}\p{sc=Hiragana}\p{sc=Katakana}，〔〕…○Ａ]+$").unwrap();

    // Structural lines
    static ref MAIN_TABLE_START: Regex = Regex::new(r"^本\s*表$").unwrap();
    static ref APPENDIX_START: Regex = Regex::new(r"^付\s*表$").unwrap();
    static ref PAGE_INDEX: Regex = Regex::new(r"^[0-9]").unwrap();
    static ref SOUND_INDEX: Regex =
        Regex::new(r"^[\p{sc=Katakana}\p{sc=Hiragana}－]+$").unwrap();
}

/// A single kanji, e.g. a character-column field.
pub fn is_kanji(field: &str) -> bool {
    KANJI.is_match(field)
}

/// The kanji inside a `（舊）`-style old-form field.
pub fn extract_old_kanji(field: &str) -> Option<&str> {
    OLD_KANJI
        .captures(field)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// The bracketed accepted-variant column, `［遡］`. Its content is garbage
/// after text extraction and only the shape matters.
pub fn is_bracketed_variant(field: &str) -> bool {
    BRACKETED_VARIANT.is_match(field)
}

pub fn is_reading(field: &str) -> bool {
    READING.is_match(field)
}

pub fn is_examples(field: &str) -> bool {
    EXAMPLES.is_match(field)
        || field
            .split('，')
            .any(|part| GLOSSED_EXAMPLES.contains(&part))
}

pub fn is_notes(field: &str) -> bool {
    !is_kanji(field) && !is_reading(field) && !is_examples(field)
}

/// True when the first character is katakana.
pub fn starts_with_katakana(text: &str) -> bool {
    text.chars().next().is_some_and(is_katakana)
}

pub fn is_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30FA}')
}

pub fn is_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}')
}

// ─────────────────────────────────────────────────────────────────────────────
// Structural lines
// ─────────────────────────────────────────────────────────────────────────────

/// Blank after trimming all whitespace, U+3000 included.
pub fn is_empty(line: &str) -> bool {
    line.trim().is_empty()
}

/// Page headers from the PDF, e.g. `03初_改定常用漢字表_本表NN.indd 107 …`,
/// or a bare page number.
pub fn is_page_index(line: &str) -> bool {
    PAGE_INDEX.is_match(line.trim())
}

/// The kana running heads printed on every page, e.g. `カン` or `キ－キツ`.
pub fn is_sound_index(line: &str) -> bool {
    SOUND_INDEX.is_match(line.trim())
}

pub fn is_main_table_start(line: &str) -> bool {
    MAIN_TABLE_START.is_match(line.trim())
}

pub fn is_appendix_start(line: &str) -> bool {
    APPENDIX_START.is_match(line.trim())
}
