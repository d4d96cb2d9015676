//! Typed records rebuilt from the table: kanji, their readings, and the
//! example words listed for each reading.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ScanError};
use crate::kana;
use crate::notes::Note;
use crate::okurigana::{self, CLASSICAL_EXCEPTION, DELIMITER};
use crate::reference::ReferenceData;
use crate::script::{starts_with_katakana, IDEOGRAPHIC_SPACE};

lazy_static! {
    /// `一羽（わ）`: an example followed by its reading.
    static ref GLOSSED_EXAMPLE: Regex = Regex::new(r"^(.*)（(.*)）$").unwrap();
}

// Helper function for serde skip_serializing_if
fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingKind {
    /// Sino-Japanese (音読み), written in katakana.
    On,
    /// Native Japanese (訓読み), written in hiragana.
    Kun,
    /// Irregular readings (熟字訓 and similar).
    Exceptional,
}

impl ReadingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingKind::On => "On",
            ReadingKind::Kun => "Kun",
            ReadingKind::Exceptional => "Exceptional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Adverb,
    Conjunction,
    Suffix,
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Adverb => "Adverb",
            PartOfSpeech::Conjunction => "Conjunction",
            PartOfSpeech::Suffix => "Suffix",
        }
    }
}

/// One item of the examples (例) column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub example: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<PartOfSpeech>,
}

impl Example {
    /// Build an example, moving part-of-speech markers into `pos`.
    pub fn new(raw: &str) -> Self {
        if raw.contains("〔副〕") {
            Example {
                example: raw.replace("〔副〕", ""),
                pos: Some(PartOfSpeech::Adverb),
            }
        } else if raw.contains("〔接〕") {
            Example {
                example: raw.replace("〔接〕", ""),
                pos: Some(PartOfSpeech::Conjunction),
            }
        } else if raw.starts_with("……") {
            Example {
                example: raw.replace("……", ""),
                pos: Some(PartOfSpeech::Suffix),
            }
        } else {
            Example {
                example: raw.to_string(),
                pos: None,
            }
        }
    }
}

/// A reading of a kanji.
///
/// Kun readings get their okurigana delimited by `.` once an example shows
/// where the stem ends, e.g. `な.る`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub reading: String,
    pub kind: ReadingKind,
    /// Indented ("1字下げ") in the table: rare, or restricted usage.
    #[serde(default, skip_serializing_if = "is_false")]
    pub uncommon: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// Not listed as a reading of its own, but derived from this sibling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_of: Option<String>,
}

impl Reading {
    /// Build a reading from the raw column text.
    ///
    /// A leading U+3000 marks the reading uncommon and is dropped. Without an
    /// explicit `kind`, katakana means on and anything else kun.
    pub fn new(raw: &str, kind: Option<ReadingKind>, variation_of: Option<String>) -> Self {
        let (reading, uncommon) = match raw.strip_prefix(IDEOGRAPHIC_SPACE) {
            Some(rest) => (rest.to_string(), true),
            None => (raw.to_string(), false),
        };
        let kind = kind.unwrap_or(if starts_with_katakana(&reading) {
            ReadingKind::On
        } else {
            ReadingKind::Kun
        });

        Reading {
            reading,
            kind,
            uncommon,
            examples: Vec::new(),
            notes: Vec::new(),
            variation_of,
        }
    }

    /// Hepburn romanization: uppercase for on, lowercase for kun, titlecase
    /// for exceptional readings.
    pub fn romaji(&self) -> String {
        let hepburn = kana::to_hepburn(&self.reading);
        match self.kind {
            ReadingKind::On => hepburn.to_uppercase(),
            ReadingKind::Kun => hepburn,
            ReadingKind::Exceptional => kana::titlecase(&hepburn),
        }
    }

    /// The reading in hiragana, even for on readings.
    pub fn to_hiragana(&self) -> String {
        match self.kind {
            ReadingKind::On => kana::to_hiragana(&self.reading),
            _ => self.reading.clone(),
        }
    }

    pub fn is_delimited(&self) -> bool {
        self.reading.contains(DELIMITER)
    }

    /// Whether the last note on this reading still awaits its continuation.
    pub fn has_unterminated_note(&self) -> bool {
        self.notes.last().is_some_and(|note| !note.is_terminated())
    }
}

/// A kanji with its Jōyō information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kanji {
    /// The character; the popular-use form when the standard favours a
    /// rarely used one (see `standard_character`).
    pub kanji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub old_kanji: Vec<String>,
    pub readings: Vec<Reading>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,
    /// The next note line continues an unterminated note.
    #[serde(skip)]
    pub pending_note: bool,
}

impl Kanji {
    pub fn new(kanji: &str, reference: &ReferenceData) -> Self {
        let (canonical, standard_character) = match reference.popular_alternative(kanji) {
            Some(popular) => (popular.to_string(), Some(kanji.to_string())),
            None => (kanji.to_string(), None),
        };
        let variants = reference.variants_of(kanji);

        Kanji {
            kanji: canonical,
            standard_character,
            standard_variant: variants.map(|v| v.standard.clone()),
            accepted_variant: variants.map(|v| v.accepted.clone()),
            old_kanji: Vec::new(),
            readings: Vec::new(),
            notes: Vec::new(),
            pending_note: false,
        }
    }

    /// Record an old form. Only 弁 has more than one.
    pub fn add_old_kanji(&mut self, old: &str) -> Result<()> {
        if !self.old_kanji.is_empty() && self.kanji != "弁" {
            return Err(ScanError::UnexpectedHistoricalForm {
                kanji: self.kanji.clone(),
                old: old.to_string(),
            });
        }
        self.old_kanji.push(old.to_string());
        Ok(())
    }

    /// Append a reading; it becomes the active one.
    pub fn add_reading(&mut self, raw: &str, kind: Option<ReadingKind>, variation_of: Option<String>) {
        self.readings.push(Reading::new(raw, kind, variation_of));
    }

    /// The reading that receives examples and notes from following rows.
    /// Always the last one.
    pub fn current_reading(&self) -> Option<&Reading> {
        self.readings.last()
    }

    fn active_index(&self, role: &'static str) -> Result<usize> {
        self.readings
            .len()
            .checked_sub(1)
            .ok_or_else(|| ScanError::NoCurrentReading {
                kanji: self.kanji.clone(),
                role,
            })
    }

    /// Insert a split-off reading right before the reading at `at`, so the
    /// active reading stays last. Returns the new reading's index.
    fn insert_before(&mut self, at: usize, reading: Reading) -> usize {
        self.readings.insert(at, reading);
        at
    }

    /// Change a reading's text, keeping `variation_of` references in step.
    fn rename_reading(&mut self, idx: usize, text: String) {
        let old = std::mem::replace(&mut self.readings[idx].reading, text.clone());
        for reading in &mut self.readings {
            if reading.variation_of.as_deref() == Some(old.as_str()) {
                reading.variation_of = Some(text.clone());
            }
        }
    }

    /// Add a line from the examples column to the active reading.
    ///
    /// Glossed examples (`三日（みっか）`) become variation readings of their
    /// own. Kun readings are then delimited from the examples; an example that
    /// contradicts the committed split is detached into a new reading.
    pub fn add_examples(&mut self, examples: &str, reference: &ReferenceData) -> Result<()> {
        self.active_index("examples")?;
        let examples = reference.popularize(examples);

        let mut active = self.readings.len() - 1;
        let fresh_from = self.readings[active].examples.len();

        for raw in examples.split('，').filter(|e| !e.is_empty()) {
            match GLOSSED_EXAMPLE.captures(raw) {
                Some(cap) => {
                    let example = cap.get(1).map_or("", |m| m.as_str());
                    let gloss = truncate_geminate(cap.get(2).map_or("", |m| m.as_str()));
                    let base = self.readings[active].reading.clone();
                    info!(
                        kanji = %self.kanji,
                        reading = %base,
                        gloss,
                        example,
                        "adding reading variation for glossed example"
                    );

                    let mut variation = Reading::new(gloss, None, Some(base));
                    variation.examples.push(Example::new(example));
                    let at = self.insert_before(active, variation);
                    active += 1;
                    self.delimit(at, 0);
                }
                None => self.readings[active].examples.push(Example::new(raw)),
            }
        }

        self.delimit(active, fresh_from);
        Ok(())
    }

    /// Delimit okurigana of the reading at `idx` from all its examples.
    /// Unexplained okurigana is reported only for examples from `fresh_from` on.
    fn delimit(&mut self, idx: usize, fresh_from: usize) {
        if self.readings[idx].kind != ReadingKind::Kun {
            return;
        }

        let clean = okurigana::undelimited(&self.readings[idx].reading);
        let mut detached = Vec::new();
        let mut i = 0;
        let mut seen = 0;

        while i < self.readings[idx].examples.len() {
            let example = self.readings[idx].examples[i].example.clone();
            let split = okurigana::delimit_okurigana(&self.kanji, &clean, &example);
            let fresh = seen >= fresh_from;
            seen += 1;

            if !split.contains(DELIMITER) {
                if fresh && okurigana::has_unexplained_okurigana(&self.kanji, &clean, &example) {
                    warn!(
                        kanji = %self.kanji,
                        reading = %clean,
                        example = %example,
                        "unexplained okurigana"
                    );
                }
                i += 1;
            } else if self.readings[idx].reading == clean {
                self.rename_reading(idx, split);
                i += 1;
            } else if self.readings[idx].reading != split {
                detached.push(self.readings[idx].examples.remove(i));
            } else {
                i += 1;
            }
        }

        let mut idx = idx;
        for example in detached {
            let base = self.readings[idx].reading.clone();
            let text = if example.example == CLASSICAL_EXCEPTION.0 {
                CLASSICAL_EXCEPTION.1.to_string()
            } else {
                clean.clone()
            };
            info!(
                kanji = %self.kanji,
                reading = %base,
                split_off = %text,
                example = %example.example,
                "example contradicts okurigana; splitting reading"
            );

            let mut split_off = Reading::new(&text, None, Some(base));
            split_off.examples.push(example);
            let at = self.insert_before(idx, split_off);
            idx += 1;
            self.delimit(at, 0);
        }
    }

    /// The sibling a variation reading refers to, if exactly one matches.
    pub fn variation_target(&self, reading: &Reading) -> Option<&Reading> {
        let target = reading.variation_of.as_deref()?;
        let mut matches = self.readings.iter().filter(|r| r.reading == target);
        match (matches.next(), matches.next()) {
            (Some(found), None) => Some(found),
            _ => None,
        }
    }

    /// Every `variation_of` must resolve to exactly one sibling reading.
    pub fn validate_variations(&self) -> Result<()> {
        for reading in &self.readings {
            if let Some(target) = &reading.variation_of {
                let matches = self.readings.iter().filter(|r| &r.reading == target).count();
                if matches != 1 {
                    return Err(ScanError::DanglingVariation {
                        kanji: self.kanji.clone(),
                        reading: reading.reading.clone(),
                        target: target.clone(),
                        matches,
                    });
                }
            }
        }
        Ok(())
    }
}

/// みっか → みっ: the gloss keeps only what belongs to the kanji.
fn truncate_geminate(gloss: &str) -> &str {
    match gloss.find('っ') {
        Some(i) => &gloss[..i + 'っ'.len_utf8()],
        None => gloss,
    }
}

impl std::fmt::Display for Kanji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kanji)?;
        if !self.old_kanji.is_empty() {
            write!(f, " ({})", self.old_kanji.join(","))?;
        }
        let readings: Vec<&str> = self.readings.iter().map(|r| r.reading.as_str()).collect();
        write!(f, " [{}]", readings.join(","))
    }
}
