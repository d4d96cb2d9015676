//! Role assignment for tokenized rows.
//!
//! The text extraction drops empty columns, so a row's shape is known only
//! from its field count and the content of a few fields. Every shape that
//! occurs in the table is an arm of [`RowLayout`]; anything else is an error.

use crate::error::{Result, ScanError};
use crate::script::{
    extract_old_kanji, is_bracketed_variant, is_examples, is_kanji, is_notes, is_reading,
};

/// Old forms of 弁 that land on lines of their own.
const LONE_OLD_FORMS: &[&str] = &["瓣", "辯"];

/// The only kanji whose old-form row carries notes instead of examples.
const OLD_FORM_WITH_NOTES: &str = "弥";

/// Its old form 辨 is printed without parentheses.
const UNPARENTHESIZED_OLD_FORM: &str = "弁";

/// A continuation row of 餅 that leads with the old form.
const LEADING_OLD_FORM: (&str, &str) = ("（餠）", "餠");

/// 亀's old form is an image in the source document; only the parentheses
/// survive extraction.
const IMAGE_OLD_FORM: (&str, &str) = ("亀", "龜");

/// Every row shape of the main table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLayout {
    /// `瓣`
    LoneOldKanji,
    /// `極めて〔副〕`
    LoneExamples,
    /// `「春雨」，「小雨」，「霧雨」などは，`
    LoneNotes,
    /// 2a: kanji, reading
    KanjiReading,
    /// 2b: reading, examples
    ReadingExamples,
    /// 2c: reading, notes
    ReadingNotes,
    /// 2d: examples, notes
    ExamplesNotes,
    /// 3a: kanji, reading, examples
    KanjiReadingExamples,
    /// 3b: reading, examples, notes
    ReadingExamplesNotes,
    /// 4a: kanji, （old）, reading, examples
    KanjiOldReadingExamples,
    /// 4a for 弥: kanji, （old）, reading, notes
    KanjiOldReadingNotes,
    /// 4b: kanji, reading, examples, notes
    KanjiReadingExamplesNotes,
    /// 4c: （old）, reading, examples, notes
    OldReadingExamplesNotes,
    /// 4d: 弁, old, reading, examples
    BareOldForm,
    /// 5a: kanji, （old）, reading, examples, notes
    FullRow,
    /// 5b: kanji, ［variant］, reading, examples, notes
    AcceptedVariantRow,
    /// 5c: 亀, （, ）, reading, examples
    ImageOldForm,
}

impl RowLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowLayout::LoneOldKanji => "lone_old_kanji",
            RowLayout::LoneExamples => "lone_examples",
            RowLayout::LoneNotes => "lone_notes",
            RowLayout::KanjiReading => "kanji_reading",
            RowLayout::ReadingExamples => "reading_examples",
            RowLayout::ReadingNotes => "reading_notes",
            RowLayout::ExamplesNotes => "examples_notes",
            RowLayout::KanjiReadingExamples => "kanji_reading_examples",
            RowLayout::ReadingExamplesNotes => "reading_examples_notes",
            RowLayout::KanjiOldReadingExamples => "kanji_old_reading_examples",
            RowLayout::KanjiOldReadingNotes => "kanji_old_reading_notes",
            RowLayout::KanjiReadingExamplesNotes => "kanji_reading_examples_notes",
            RowLayout::OldReadingExamplesNotes => "old_reading_examples_notes",
            RowLayout::BareOldForm => "bare_old_form",
            RowLayout::FullRow => "full_row",
            RowLayout::AcceptedVariantRow => "accepted_variant_row",
            RowLayout::ImageOldForm => "image_old_form",
        }
    }
}

/// Field contents by role. Absent roles are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFields {
    pub kanji: Option<String>,
    pub old_kanji: Option<String>,
    pub reading: Option<String>,
    pub examples: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRow {
    pub layout: RowLayout,
    pub fields: RowFields,
}

fn some(field: &str) -> Option<String> {
    Some(field.to_string())
}

/// Assign a role to every field of a tokenized row.
pub fn classify_row(fields: &[String]) -> Result<ClassifiedRow> {
    let (layout, roles) = match fields {
        [only] => {
            if LONE_OLD_FORMS.contains(&only.as_str()) {
                (
                    RowLayout::LoneOldKanji,
                    RowFields {
                        old_kanji: some(only),
                        ..Default::default()
                    },
                )
            } else if is_examples(only) {
                (
                    RowLayout::LoneExamples,
                    RowFields {
                        examples: some(only),
                        ..Default::default()
                    },
                )
            } else {
                (
                    RowLayout::LoneNotes,
                    RowFields {
                        notes: some(only),
                        ..Default::default()
                    },
                )
            }
        }

        [first, second] => {
            if is_kanji(first) {
                (
                    RowLayout::KanjiReading,
                    RowFields {
                        kanji: some(first),
                        reading: some(second),
                        ..Default::default()
                    },
                )
            } else if is_reading(first) {
                if is_examples(second) {
                    (
                        RowLayout::ReadingExamples,
                        RowFields {
                            reading: some(first),
                            examples: some(second),
                            ..Default::default()
                        },
                    )
                } else {
                    (
                        RowLayout::ReadingNotes,
                        RowFields {
                            reading: some(first),
                            notes: some(second),
                            ..Default::default()
                        },
                    )
                }
            } else {
                (
                    RowLayout::ExamplesNotes,
                    RowFields {
                        examples: some(first),
                        notes: some(second),
                        ..Default::default()
                    },
                )
            }
        }

        [first, second, third] => {
            if is_kanji(first) {
                (
                    RowLayout::KanjiReadingExamples,
                    RowFields {
                        kanji: some(first),
                        reading: some(second),
                        examples: some(third),
                        ..Default::default()
                    },
                )
            } else {
                (
                    RowLayout::ReadingExamplesNotes,
                    RowFields {
                        reading: some(first),
                        examples: some(second),
                        notes: some(third),
                        ..Default::default()
                    },
                )
            }
        }

        [first, second, third, fourth] => {
            if let Some(old) = extract_old_kanji(second) {
                if first == OLD_FORM_WITH_NOTES {
                    (
                        RowLayout::KanjiOldReadingNotes,
                        RowFields {
                            kanji: some(first),
                            old_kanji: some(old),
                            reading: some(third),
                            notes: some(fourth),
                            ..Default::default()
                        },
                    )
                } else {
                    (
                        RowLayout::KanjiOldReadingExamples,
                        RowFields {
                            kanji: some(first),
                            old_kanji: some(old),
                            reading: some(third),
                            examples: some(fourth),
                            ..Default::default()
                        },
                    )
                }
            } else if is_kanji(first) {
                if first == UNPARENTHESIZED_OLD_FORM {
                    (
                        RowLayout::BareOldForm,
                        RowFields {
                            kanji: some(first),
                            old_kanji: some(second),
                            reading: some(third),
                            examples: some(fourth),
                            ..Default::default()
                        },
                    )
                } else {
                    (
                        RowLayout::KanjiReadingExamplesNotes,
                        RowFields {
                            kanji: some(first),
                            reading: some(second),
                            examples: some(third),
                            notes: some(fourth),
                            ..Default::default()
                        },
                    )
                }
            } else if first == LEADING_OLD_FORM.0 {
                (
                    RowLayout::OldReadingExamplesNotes,
                    RowFields {
                        old_kanji: some(LEADING_OLD_FORM.1),
                        reading: some(second),
                        examples: some(third),
                        notes: some(fourth),
                        ..Default::default()
                    },
                )
            } else {
                return Err(ScanError::malformed(
                    fields,
                    "four fields without a kanji or old form",
                ));
            }
        }

        [first, second, third, fourth, fifth] => {
            if let Some(old) = extract_old_kanji(second) {
                (
                    RowLayout::FullRow,
                    RowFields {
                        kanji: some(first),
                        old_kanji: some(old),
                        reading: some(third),
                        examples: some(fourth),
                        notes: some(fifth),
                    },
                )
            } else if first == IMAGE_OLD_FORM.0 {
                // the empty parentheses split into two fields
                (
                    RowLayout::ImageOldForm,
                    RowFields {
                        kanji: some(first),
                        old_kanji: some(IMAGE_OLD_FORM.1),
                        reading: some(fourth),
                        examples: some(fifth),
                        ..Default::default()
                    },
                )
            } else if is_bracketed_variant(second) {
                // the bracketed glyph is lost in extraction; reference data restores it
                (
                    RowLayout::AcceptedVariantRow,
                    RowFields {
                        kanji: some(first),
                        reading: some(third),
                        examples: some(fourth),
                        notes: some(fifth),
                        ..Default::default()
                    },
                )
            } else {
                return Err(ScanError::malformed(
                    fields,
                    "five fields without an old form or accepted variant",
                ));
            }
        }

        _ => {
            return Err(ScanError::malformed(
                fields,
                format!("unexpected field count {}", fields.len()),
            ))
        }
    };

    check_shapes(fields, &roles)?;
    Ok(ClassifiedRow {
        layout,
        fields: roles,
    })
}

/// Every assigned role must look like what it claims to be.
fn check_shapes(fields: &[String], roles: &RowFields) -> Result<()> {
    let checks: [(&Option<String>, fn(&str) -> bool, &str); 5] = [
        (&roles.kanji, is_kanji, "kanji"),
        (&roles.old_kanji, is_kanji, "old kanji"),
        (&roles.reading, is_reading, "reading"),
        (&roles.examples, is_examples, "examples"),
        (&roles.notes, is_notes, "notes"),
    ];

    for (value, matches_shape, role) in checks {
        if let Some(value) = value {
            if !matches_shape(value) {
                return Err(ScanError::malformed(
                    fields,
                    format!("'{value}' is not shaped like {role}"),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod classifier_tests {
    use super::*;
    use crate::tokenizer::split_row;

    fn classify(line: &str) -> ClassifiedRow {
        classify_row(&split_row(line)).unwrap()
    }

    // ─────────────────────────────────────────────────────────────
    // One field
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn lone_fields() {
        let row = classify("「春雨」，「小雨」，「霧雨」などは，\n");
        assert_eq!(row.layout, RowLayout::LoneNotes);
        assert_eq!(row.fields.notes.as_deref(), Some("「春雨」，「小雨」，「霧雨」などは，"));

        let row = classify("瓣");
        assert_eq!(row.layout, RowLayout::LoneOldKanji);
        assert_eq!(row.fields.old_kanji.as_deref(), Some("瓣"));

        for line in [
            "\t \t \t \t 極めて〔副〕\n",
            "\t \t \t \t 慌ただしげだ\n",
            "\t \t \t \t 四月目\n",
        ] {
            assert_eq!(classify(line).layout, RowLayout::LoneExamples, "{line}");
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Two and three fields
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn two_fields() {
        let row = classify("升\t\t \t \t\t \t \t ショウ\t \t\n");
        assert_eq!(row.layout, RowLayout::KanjiReading);
        assert_eq!(row.fields.kanji.as_deref(), Some("升"));
        assert_eq!(row.fields.reading.as_deref(), Some("ショウ"));

        let row = classify("\t \t \t あわれ\t 哀れ，哀れな話，哀れがる\t\n");
        assert_eq!(row.layout, RowLayout::ReadingExamples);
        assert_eq!(row.fields.examples.as_deref(), Some("哀れ，哀れな話，哀れがる"));

        let row = classify("\t \t \t \u{3000}ク\t \t 「宮内庁」などと使う。\n");
        assert_eq!(row.layout, RowLayout::ReadingNotes);
        assert_eq!(row.fields.reading.as_deref(), Some("\u{3000}ク"));
        assert_eq!(row.fields.notes.as_deref(), Some("「宮内庁」などと使う。"));

        let row = classify("\t \t \t \t 真ん中\t 真っ赤（まっか）\n");
        assert_eq!(row.layout, RowLayout::ExamplesNotes);
        assert_eq!(row.fields.examples.as_deref(), Some("真ん中"));
        assert_eq!(row.fields.notes.as_deref(), Some("真っ赤（まっか）"));
    }

    #[test]
    fn three_fields() {
        let row = classify("\t哀\t \t \t \t\t \t \t アイ\t 哀愁，哀願，悲哀\t\n");
        assert_eq!(row.layout, RowLayout::KanjiReadingExamples);
        assert_eq!(row.fields.kanji.as_deref(), Some("哀"));

        let row = classify("\t \t \t \u{3000}ユイ\t 遺言\t 「遺言」は，「イゴン」とも。\n");
        assert_eq!(row.layout, RowLayout::ReadingExamplesNotes);
        assert!(row.fields.kanji.is_none());
        assert!(row.fields.notes.is_some());
    }

    // ─────────────────────────────────────────────────────────────
    // Four fields
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn four_fields() {
        let row = classify("涙\t（淚）\t \t \t\t \t \t ルイ\t 感涙，声涙，落涙\t\n");
        assert_eq!(row.layout, RowLayout::KanjiOldReadingExamples);
        assert_eq!(row.fields.old_kanji.as_deref(), Some("淚"));

        let row = classify("弥\t（彌）\t \t \t\t \t \t や\t \t 弥生（やよい）\n");
        assert_eq!(row.layout, RowLayout::KanjiOldReadingNotes);
        assert_eq!(row.fields.notes.as_deref(), Some("弥生（やよい）"));
        assert!(row.fields.examples.is_none());

        let row = classify("和\t\t \t \t\t \t \t ワ\t 和解，和服，柔和\t 日和（ひより）\n");
        assert_eq!(row.layout, RowLayout::KanjiReadingExamplesNotes);

        let row = classify("\t \t（餠）\t もち\t 餅屋，尻餅\t ＊［（付）第２の３【餌】参照］\t \t \t \t \t\n");
        assert_eq!(row.layout, RowLayout::OldReadingExamplesNotes);
        assert_eq!(row.fields.old_kanji.as_deref(), Some("餠"));
        assert!(row.fields.kanji.is_none());

        let row = classify("弁\t\t\t辨\t \t \t\t \t \t ベン\t 弁償，花弁，雄弁\t\n");
        assert_eq!(row.layout, RowLayout::BareOldForm);
        assert_eq!(row.fields.old_kanji.as_deref(), Some("辨"));
    }

    // ─────────────────────────────────────────────────────────────
    // Five fields
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn five_fields() {
        let row = classify("為\t（爲）\t \t \t\t \t \t イ\t 為政者，行為，作為\t 為替（かわせ）\n");
        assert_eq!(row.layout, RowLayout::FullRow);
        assert_eq!(row.fields.old_kanji.as_deref(), Some("爲"));
        assert_eq!(row.fields.notes.as_deref(), Some("為替（かわせ）"));

        let row = classify("遡\t［遡］\t \t \t\t \t \t ソ\t 遡及，遡上\t ［遡］＝許容字体，\n");
        assert_eq!(row.layout, RowLayout::AcceptedVariantRow);
        assert!(row.fields.old_kanji.is_none());
        assert_eq!(row.fields.reading.as_deref(), Some("ソ"));

        let row = classify("亀\t（ ）\t \t \t\t \t \t キ\t 亀裂\t\n");
        assert_eq!(row.layout, RowLayout::ImageOldForm);
        assert_eq!(row.fields.old_kanji.as_deref(), Some("龜"));
        assert_eq!(row.fields.reading.as_deref(), Some("キ"));
        assert_eq!(row.fields.examples.as_deref(), Some("亀裂"));
    }

    // ─────────────────────────────────────────────────────────────
    // Rejections
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn kanji_role_only_for_single_han() {
        let row = classify("\t哀\t \t アイ\t 哀愁\n");
        assert_eq!(row.fields.kanji.as_deref(), Some("哀"));

        let fields: Vec<String> = ["哀愁", "アイ", "哀愁"].iter().map(|s| s.to_string()).collect();
        let err = classify_row(&fields).unwrap_err();
        assert!(matches!(err, ScanError::MalformedRow { .. }));
    }

    #[test]
    fn malformed_rows() {
        let too_many: Vec<String> = (0..6).map(|i| i.to_string()).collect();
        assert!(matches!(
            classify_row(&too_many),
            Err(ScanError::MalformedRow { .. })
        ));

        let empty: Vec<String> = Vec::new();
        assert!(classify_row(&empty).is_err());

        // reading column holding kanji
        let fields: Vec<String> = ["升", "升"].iter().map(|s| s.to_string()).collect();
        assert!(classify_row(&fields).is_err());

        let fields: Vec<String> = ["x", "y", "z", "w"].iter().map(|s| s.to_string()).collect();
        assert!(classify_row(&fields).is_err());
    }
}
