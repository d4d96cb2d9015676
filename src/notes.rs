//! The notes (参考) column.
//!
//! A note is scoped either to the current reading or to the whole kanji, and
//! may run over several physical lines. Every note must match one of a closed
//! set of phrasings; anything else is a new table shape and aborts the scan.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::model::Kanji;

/// The full stop that terminates a note.
const FULL_STOP: char = '。';

lazy_static! {
    // Reading-scoped
    static ref CROSS_REFERENCE: Regex = Regex::new(r"^⇔ *(.+)").unwrap();
    static ref COMPOUND_READING: Regex = Regex::new(
        r"^((?:お?\p{sc=Han}+\p{sc=Hiragana}*・?)+)（(\p{sc=Hiragana}+)）(\p{sc=Hiragana}*)"
    )
    .unwrap();
    static ref QUOTED_WITH_TOPIC: Regex = Regex::new(r"^(「(.*)」，?)+(など)?は，").unwrap();
    static ref QUOTED_USAGE: Regex = Regex::new(r"^(「(.*)」，?)+などと使う。$").unwrap();
    static ref ALSO_WRITTEN: Regex = Regex::new(
        r"^(「[\p{sc=Han}\p{sc=Hiragana}\p{sc=Katakana}]+」[，,]?)+とも(書く)?。"
    )
    .unwrap();
    static ref DIVERTED_USE: Regex = Regex::new(r"^「(\p{sc=Han})」.*転用。").unwrap();
    static ref MEANING_GLOSS: Regex = Regex::new(r"^「(.*)」.*の意。").unwrap();
    static ref LITERARY_USAGE: Regex = Regex::new(r"^.*文語.*「(.*)」で使う。").unwrap();

    // Kanji-scoped
    static ref PREFECTURE_READING: Regex =
        Regex::new(r"^(\p{sc=Han}+)（(\p{sc=Hiragana}+)）[府県]$").unwrap();
    static ref ACCEPTED_VARIANT: Regex = Regex::new(r"^［(\p{sc=Han})］＝許容字体，").unwrap();
    static ref VARIANT_REFERENCE: Regex = Regex::new(r"^＊［(（付）.*)］").unwrap();
}

/// Which phrasing a note was recognized as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteKind {
    /// `⇔ 恐れる`: same reading, different kanji.
    CrossReference { targets: Vec<String> },
    /// `日和（ひより）`: special reading of a multi-kanji word.
    CompoundReading { written: String, reading: String },
    /// `「春雨」，「小雨」などは，…`; may continue on the next line.
    QuotedWithTopic,
    /// `「宮内庁」などと使う。`
    QuotedUsage,
    /// `「遺言」は，「イゴン」とも。` style alternatives.
    AlsoWritten,
    /// `「猟」の字音の転用。`
    DivertedUse,
    /// `「山頂」の意。`
    MeaningGloss,
    /// `多く文語の「亡き」で使う。`
    LiteraryUsage,
    /// `茨城（いばらき）県`
    PrefectureReading { name: String, reading: String },
    /// `［遡］＝許容字体，`
    AcceptedVariant { variant: String },
    /// `＊［（付）第２の３参照］`
    VariantReference,
}

impl NoteKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoteKind::CrossReference { .. } => "cross_reference",
            NoteKind::CompoundReading { .. } => "compound_reading",
            NoteKind::QuotedWithTopic => "quoted_with_topic",
            NoteKind::QuotedUsage => "quoted_usage",
            NoteKind::AlsoWritten => "also_written",
            NoteKind::DivertedUse => "diverted_use",
            NoteKind::MeaningGloss => "meaning_gloss",
            NoteKind::LiteraryUsage => "literary_usage",
            NoteKind::PrefectureReading { .. } => "prefecture_reading",
            NoteKind::AcceptedVariant { .. } => "accepted_variant",
            NoteKind::VariantReference => "variant_reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub kind: NoteKind,
    pub text: String,
}

impl Note {
    pub fn new(kind: NoteKind, text: impl Into<String>) -> Self {
        Note {
            kind,
            text: text.into(),
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.text.ends_with(FULL_STOP)
    }
}

/// Recognize a reading-scoped note. Continuations are not handled here.
fn reading_scope_opening(text: &str) -> Option<NoteKind> {
    if let Some(cap) = CROSS_REFERENCE.captures(text) {
        let targets = cap[1].split('，').map(|t| t.trim().to_string()).collect();
        return Some(NoteKind::CrossReference { targets });
    }
    if let Some(cap) = COMPOUND_READING.captures(text) {
        return Some(NoteKind::CompoundReading {
            written: cap[1].to_string(),
            reading: cap[2].to_string(),
        });
    }
    if QUOTED_WITH_TOPIC.is_match(text) {
        return Some(NoteKind::QuotedWithTopic);
    }
    if QUOTED_USAGE.is_match(text) {
        return Some(NoteKind::QuotedUsage);
    }
    None
}

fn reading_scope_closed(text: &str) -> Option<NoteKind> {
    if ALSO_WRITTEN.is_match(text) {
        Some(NoteKind::AlsoWritten)
    } else if DIVERTED_USE.is_match(text) {
        Some(NoteKind::DivertedUse)
    } else if MEANING_GLOSS.is_match(text) {
        Some(NoteKind::MeaningGloss)
    } else if LITERARY_USAGE.is_match(text) {
        Some(NoteKind::LiteraryUsage)
    } else {
        None
    }
}

impl Kanji {
    /// Add a line from the notes column.
    ///
    /// Tries reading-scoped phrasings first, attaching the note to the
    /// current reading; falls back to kanji-scoped phrasings.
    pub fn append_to_notes(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        let current = self
            .readings
            .len()
            .checked_sub(1)
            .ok_or_else(|| ScanError::NoCurrentReading {
                kanji: self.kanji.clone(),
                role: "notes",
            })?;

        if let Some(kind) = reading_scope_opening(text) {
            if kind == NoteKind::QuotedWithTopic && !text.ends_with(FULL_STOP) {
                self.pending_note = true;
            }
            self.readings[current].notes.push(Note::new(kind, text));
            return Ok(());
        }

        if self.pending_note && text.ends_with(FULL_STOP) {
            return self.continue_reading_note(current, text);
        }

        if let Some(kind) = reading_scope_closed(text) {
            self.readings[current].notes.push(Note::new(kind, text));
            return Ok(());
        }

        self.append_to_kanji_notes(text)
    }

    /// The second half of a note: goes to the current reading, or the one
    /// before it, whichever holds the unterminated first half.
    fn continue_reading_note(&mut self, current: usize, text: &str) -> Result<()> {
        let owner = [Some(current), current.checked_sub(1)]
            .into_iter()
            .flatten()
            .find(|&i| self.readings[i].has_unterminated_note());

        let owner = owner.ok_or_else(|| ScanError::OrphanedNoteContinuation(text.to_string()))?;
        if let Some(note) = self.readings[owner].notes.last_mut() {
            note.text.push_str(text);
        }
        self.pending_note = false;
        Ok(())
    }

    /// Add a kanji-scoped note.
    pub fn append_to_kanji_notes(&mut self, text: &str) -> Result<()> {
        if let Some(cap) = PREFECTURE_READING.captures(text) {
            let kind = NoteKind::PrefectureReading {
                name: cap[1].to_string(),
                reading: cap[2].to_string(),
            };
            self.notes.push(Note::new(kind, text));
            return Ok(());
        }

        if let Some(cap) = ACCEPTED_VARIANT.captures(text) {
            let kind = NoteKind::AcceptedVariant {
                variant: cap[1].to_string(),
            };
            self.notes.push(Note::new(kind, text));
            self.pending_note = true;
            return Ok(());
        }

        if let Some(cap) = VARIANT_REFERENCE.captures(text) {
            let reference = &cap[1];
            match self.notes.last_mut() {
                Some(note) if self.pending_note => {
                    note.text.push_str(reference);
                    self.pending_note = false;
                }
                _ => self.notes.push(Note::new(NoteKind::VariantReference, reference)),
            }
            return Ok(());
        }

        Err(ScanError::UnknownNoteFormat(text.to_string()))
    }
}

#[cfg(test)]
mod notes_tests {
    use super::*;
    use crate::reference::ReferenceData;

    fn kanji_with_readings(c: &str, readings: &[&str]) -> Kanji {
        let mut k = Kanji::new(c, &ReferenceData::default());
        for r in readings {
            k.add_reading(r, None, None);
        }
        k
    }

    #[test]
    fn cross_reference() {
        let mut k = kanji_with_readings("畏", &["おそれる"]);
        k.append_to_notes("⇔ 恐れる").unwrap();
        let note = &k.readings[0].notes[0];
        assert_eq!(note.text, "⇔ 恐れる");
        assert_eq!(
            note.kind,
            NoteKind::CrossReference {
                targets: vec!["恐れる".to_string()]
            }
        );
    }

    #[test]
    fn compound_reading() {
        let mut k = kanji_with_readings("和", &["ワ"]);
        k.append_to_notes("日和（ひより）").unwrap();
        assert_eq!(
            k.readings[0].notes[0].kind,
            NoteKind::CompoundReading {
                written: "日和".to_string(),
                reading: "ひより".to_string()
            }
        );

        let mut k = kanji_with_readings("真", &["ま"]);
        k.append_to_notes("真っ赤（まっか）").unwrap();
        assert!(matches!(
            k.readings[0].notes[0].kind,
            NoteKind::CompoundReading { .. }
        ));
    }

    #[test]
    fn one_line_phrasings() {
        let cases = [
            ("「宮内庁」などと使う。", NoteKind::QuotedUsage),
            ("「遺言」は，「イゴン」とも。", NoteKind::QuotedWithTopic),
            ("「猟」の字音の転用。", NoteKind::DivertedUse),
            ("「山頂」の意。", NoteKind::MeaningGloss),
            ("多く文語の「亡き」で使う。", NoteKind::LiteraryUsage),
            ("「詫」とも書く。", NoteKind::AlsoWritten),
        ];
        for (text, kind) in cases {
            let mut k = kanji_with_readings("漢", &["カン"]);
            k.append_to_notes(text).unwrap();
            assert_eq!(k.readings[0].notes[0].kind, kind, "{text}");
            assert!(!k.pending_note, "{text}");
        }
    }

    #[test]
    fn continuation_on_same_reading() {
        let mut k = kanji_with_readings("雨", &["あめ"]);
        k.append_to_notes("「春雨」，「小雨」，「霧雨」などは，").unwrap();
        assert!(k.pending_note);
        k.append_to_notes("「はるさめ」，「こさめ」，「きりさめ」。").unwrap();
        assert!(!k.pending_note);
        assert_eq!(k.readings[0].notes.len(), 1);
        assert_eq!(
            k.readings[0].notes[0].text,
            "「春雨」，「小雨」，「霧雨」などは，「はるさめ」，「こさめ」，「きりさめ」。"
        );
    }

    #[test]
    fn continuation_on_previous_reading() {
        let mut k = kanji_with_readings("雨", &["あめ"]);
        k.append_to_notes("「春雨」，「小雨」などは，").unwrap();
        k.add_reading("あま", None, None);
        k.append_to_notes("「はるさめ」，「こさめ」。").unwrap();
        assert!(k.readings[1].notes.is_empty());
        assert!(k.readings[0].notes[0].is_terminated());
        assert!(!k.pending_note);
    }

    #[test]
    fn orphaned_continuation() {
        let mut k = kanji_with_readings("雨", &["あめ", "あま", "ウ"]);
        k.readings[0].notes.push(Note::new(NoteKind::QuotedWithTopic, "「春雨」などは，"));
        k.pending_note = true;
        let err = k.append_to_notes("「はるさめ」。").unwrap_err();
        assert!(matches!(err, ScanError::OrphanedNoteContinuation(_)));
    }

    #[test]
    fn accepted_variant_spans_two_lines() {
        let mut k = kanji_with_readings("遡", &["ソ"]);
        k.append_to_notes("［遡］＝許容字体，").unwrap();
        assert!(k.pending_note);
        k.append_to_notes("＊［（付）第２の３参照］").unwrap();
        assert!(!k.pending_note);
        assert!(k.readings[0].notes.is_empty());
        assert_eq!(k.notes.len(), 1);
        assert_eq!(k.notes[0].text, "［遡］＝許容字体，（付）第２の３参照");
        assert_eq!(
            k.notes[0].kind,
            NoteKind::AcceptedVariant {
                variant: "遡".to_string()
            }
        );
    }

    #[test]
    fn standalone_variant_reference() {
        let mut k = kanji_with_readings("餅", &["もち"]);
        k.append_to_notes("＊［（付）第２の３【餌】参照］").unwrap();
        assert_eq!(k.notes[0].kind, NoteKind::VariantReference);
        assert_eq!(k.notes[0].text, "（付）第２の３【餌】参照");
    }

    #[test]
    fn prefecture_reading_is_kanji_scoped() {
        let mut k = kanji_with_readings("阪", &["ハン"]);
        k.append_to_kanji_notes("大阪（おおさか）府").unwrap();
        assert_eq!(
            k.notes[0].kind,
            NoteKind::PrefectureReading {
                name: "大阪".to_string(),
                reading: "おおさか".to_string()
            }
        );
    }

    #[test]
    fn compound_shape_wins_over_prefecture() {
        let mut k = kanji_with_readings("阪", &["ハン"]);
        k.append_to_notes("大阪（おおさか）府").unwrap();
        assert!(k.notes.is_empty());
        assert!(matches!(
            k.readings[0].notes[0].kind,
            NoteKind::CompoundReading { .. }
        ));
    }

    #[test]
    fn unknown_format() {
        let mut k = kanji_with_readings("漢", &["カン"]);
        let err = k.append_to_notes("???").unwrap_err();
        assert!(matches!(err, ScanError::UnknownNoteFormat(t) if t == "???"));
    }

    #[test]
    fn notes_need_a_reading() {
        let mut k = kanji_with_readings("漢", &[]);
        assert!(matches!(
            k.append_to_notes("日和（ひより）"),
            Err(ScanError::NoCurrentReading { role: "notes", .. })
        ));
    }
}
