//! Folds classified rows into kanji records.
//!
//! The scan is a single forward pass: every row contributes to the kanji and
//! reading established by the rows before it, so there is no way to split
//! the work.

use std::io::BufRead;
use std::time::Duration;

use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::classifier::{classify_row, ClassifiedRow, RowLayout};
use crate::error::{Result, ScanError};
use crate::model::{Kanji, Reading};
use crate::reference::ReferenceData;
use crate::script::{
    is_appendix_start, is_empty, is_main_table_start, is_page_index, is_sound_index,
};
use crate::tokenizer::split_row;

/// The kanji under construction and everything finished before it.
#[derive(Debug, Default)]
pub struct ParserState {
    pub kanjis: Vec<Kanji>,
    header_skipped: bool,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_kanji(&self) -> Option<&Kanji> {
        self.kanjis.last()
    }

    pub fn current_reading(&self) -> Option<&Reading> {
        self.current_kanji().and_then(Kanji::current_reading)
    }

    fn current_kanji_mut(&mut self, role: &'static str) -> Result<&mut Kanji> {
        self.kanjis
            .last_mut()
            .ok_or(ScanError::NoCurrentCharacter(role))
    }

    /// Apply one classified row, in column order.
    pub fn apply(&mut self, row: &ClassifiedRow, reference: &ReferenceData) -> Result<()> {
        let fields = &row.fields;

        if let Some(kanji) = &fields.kanji {
            self.kanjis.push(Kanji::new(kanji, reference));
        }
        if let Some(old) = &fields.old_kanji {
            self.current_kanji_mut("an old form")?.add_old_kanji(old)?;
        }
        if let Some(reading) = &fields.reading {
            self.current_kanji_mut("a reading")?
                .add_reading(reading, None, None);
        }
        if let Some(examples) = &fields.examples {
            self.current_kanji_mut("examples")?
                .add_examples(examples, reference)?;
        }
        if let Some(notes) = &fields.notes {
            self.current_kanji_mut("notes")?.append_to_notes(notes)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// NFC-normalize every line before tokenizing, keeping compatibility
    /// ideographs as they are.
    pub normalize: bool,
    /// Stop after this many kanji.
    pub limit: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            normalize: true,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    PageIndex,
    SoundIndex,
}

/// What a physical line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Still looking for the main table heading.
    Preamble,
    /// The main table heading itself.
    TableStart,
    Skipped(SkipReason),
    /// The column header row.
    Header,
    Row(RowLayout),
    /// The appendix heading, or the kanji limit. Nothing more is read.
    End,
}

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub lines_read: usize,
    pub rows: usize,
    pub blank_lines: usize,
    pub page_indices: usize,
    pub sound_indices: usize,
    pub kanji: usize,
    pub old_kanji: usize,
    pub readings: usize,
    pub uncommon_readings: usize,
    pub variations: usize,
    pub examples: usize,
    pub reading_notes: usize,
    pub kanji_notes: usize,
    pub elapsed: Duration,
}

impl ScanStats {
    fn tally(&mut self, kanjis: &[Kanji]) {
        self.kanji = kanjis.len();
        for k in kanjis {
            self.old_kanji += k.old_kanji.len();
            self.kanji_notes += k.notes.len();
            for r in &k.readings {
                self.readings += 1;
                self.uncommon_readings += usize::from(r.uncommon);
                self.variations += usize::from(r.variation_of.is_some());
                self.examples += r.examples.len();
                self.reading_notes += r.notes.len();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preamble,
    Table,
    Done,
}

/// Line-at-a-time driver: finds the main table, skips page furniture, and
/// feeds rows through the classifier into a [`ParserState`].
pub struct TableScanner<'r> {
    state: ParserState,
    reference: &'r ReferenceData,
    options: ScanOptions,
    phase: Phase,
    line_no: usize,
    stats: ScanStats,
}

impl<'r> TableScanner<'r> {
    pub fn new(reference: &'r ReferenceData, options: ScanOptions) -> Self {
        TableScanner {
            state: ParserState::new(),
            reference,
            options,
            phase: Phase::Preamble,
            line_no: 0,
            stats: ScanStats::default(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Process the next physical line. Errors carry its 1-based line number.
    pub fn feed(&mut self, raw: &str) -> Result<LineOutcome> {
        self.line_no += 1;
        self.stats.lines_read += 1;
        let line_no = self.line_no;

        let normalized;
        let line = if self.options.normalize {
            normalized = normalize_line(raw);
            normalized.as_str()
        } else {
            raw
        };

        self.process(line).map_err(|e| e.at_line(line_no))
    }

    fn process(&mut self, line: &str) -> Result<LineOutcome> {
        match self.phase {
            Phase::Done => return Ok(LineOutcome::End),
            Phase::Preamble => {
                if is_main_table_start(line) {
                    info!(line = self.line_no, "main table found");
                    self.phase = Phase::Table;
                    return Ok(LineOutcome::TableStart);
                }
                return Ok(LineOutcome::Preamble);
            }
            Phase::Table => {}
        }

        if is_empty(line) {
            self.stats.blank_lines += 1;
            return Ok(LineOutcome::Skipped(SkipReason::Blank));
        }
        if is_page_index(line) {
            self.stats.page_indices += 1;
            return Ok(LineOutcome::Skipped(SkipReason::PageIndex));
        }
        if is_sound_index(line) {
            self.stats.sound_indices += 1;
            return Ok(LineOutcome::Skipped(SkipReason::SoundIndex));
        }
        if is_appendix_start(line) {
            info!(line = self.line_no, "appendix reached");
            self.phase = Phase::Done;
            return Ok(LineOutcome::End);
        }
        if !self.state.header_skipped {
            self.state.header_skipped = true;
            return Ok(LineOutcome::Header);
        }

        let row = classify_row(&split_row(line))?;

        if let (Some(limit), Some(_)) = (self.options.limit, &row.fields.kanji) {
            if self.state.kanjis.len() >= limit {
                info!(limit, "kanji limit reached");
                self.phase = Phase::Done;
                return Ok(LineOutcome::End);
            }
        }

        debug!(line = self.line_no, layout = row.layout.as_str(), "row");
        self.state.apply(&row, self.reference)?;
        self.stats.rows += 1;
        Ok(LineOutcome::Row(row.layout))
    }

    /// Finish the scan, checking cross-reading invariants.
    pub fn finish(self) -> Result<(Vec<Kanji>, ScanStats)> {
        if self.phase == Phase::Preamble {
            return Err(ScanError::TableNotFound);
        }
        for kanji in &self.state.kanjis {
            kanji.validate_variations()?;
        }

        let mut stats = self.stats;
        stats.tally(&self.state.kanjis);
        Ok((self.state.kanjis, stats))
    }
}

/// CJK compatibility ideographs, which NFC would fold into unified ones.
/// Old forms such as 海 (U+FA45) are only distinguishable this way.
fn is_compatibility_ideograph(c: char) -> bool {
    matches!(c, '\u{F900}'..='\u{FAFF}' | '\u{2F800}'..='\u{2FA1F}')
}

/// NFC, except that compatibility ideographs are copied through unchanged.
/// They are starters, so normalizing the runs between them separately gives
/// the same result as NFC everywhere else.
pub fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut run = String::new();
    for c in line.chars() {
        if is_compatibility_ideograph(c) {
            out.extend(run.nfc());
            run.clear();
            out.push(c);
        } else {
            run.push(c);
        }
    }
    out.extend(run.nfc());
    out
}

/// Read `reader` line by line, decoding invalid UTF-8 lossily. `callback`
/// returns `false` to stop early.
pub fn scan_lines(
    mut reader: impl BufRead,
    mut callback: impl FnMut(&str) -> Result<bool>,
) -> Result<()> {
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let bytes_read = reader.read_until(b'\n', &mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buffer);
        if !callback(&line)? {
            break;
        }
    }
    Ok(())
}

/// Scan a whole table.
pub fn scan_table(
    reader: impl BufRead,
    reference: &ReferenceData,
    options: ScanOptions,
) -> Result<(Vec<Kanji>, ScanStats)> {
    let mut scanner = TableScanner::new(reference, options);
    scan_lines(reader, |line| {
        scanner.feed(line)?;
        Ok(!scanner.is_done())
    })?;
    scanner.finish()
}

#[cfg(test)]
mod parser_tests {
    use super::*;
    use crate::model::ReadingKind;
    use std::io::Cursor;

    const TABLE: &str = "\
改定常用漢字表
本 表
ア
漢字\t音訓\t例\t備考
和\t\t \t \t\t \t \t ワ\t 和解，和服，柔和\t 日和（ひより）
\t \t \t \t 平和\t 大和（やまと）

03初_改定常用漢字表_本表NN.indd   107 2010/11/12   13:10:23
\t哀\t \t \t \t\t \t \t アイ\t 哀愁，哀願，悲哀\t
\t \t \t あわれ\t 哀れ，哀れな話，哀れがる\t
\t \t \t あわれむ\t 哀れむ
付 表
\t \t \t 雨\t ウ\t 雨天
";

    fn scan(text: &str, options: ScanOptions) -> Result<(Vec<Kanji>, ScanStats)> {
        scan_table(Cursor::new(text), &ReferenceData::default(), options)
    }

    // ─────────────────────────────────────────────────────────────
    // ParserState
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn row_and_continuation_build_one_reading() {
        let reference = ReferenceData::default();
        let mut state = ParserState::new();
        for line in [
            "和\t\t \t \t\t \t \t ワ\t 和解，和服，柔和\t 日和（ひより）\n",
            "\t \t \t \t 平和\t 大和（やまと）\n",
        ] {
            let row = classify_row(&split_row(line)).unwrap();
            state.apply(&row, &reference).unwrap();
        }

        assert_eq!(state.kanjis.len(), 1);
        let k = state.current_kanji().unwrap();
        assert_eq!(k.readings.len(), 1);
        let r = state.current_reading().unwrap();
        assert_eq!(r.reading, "ワ");
        assert_eq!(r.examples.len(), 4);
        assert_eq!(r.notes.len(), 2);
    }

    #[test]
    fn contributions_need_a_kanji() {
        let row = classify_row(&split_row("\t \t \t あわれ\t 哀れ\n")).unwrap();
        let err = ParserState::new()
            .apply(&row, &ReferenceData::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::NoCurrentCharacter("a reading")));
    }

    // ─────────────────────────────────────────────────────────────
    // TableScanner
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn scans_main_table_only() {
        let (kanjis, stats) = scan(TABLE, ScanOptions::default()).unwrap();
        assert_eq!(kanjis.len(), 2);
        assert_eq!(kanjis[0].kanji, "和");
        assert_eq!(kanjis[1].kanji, "哀");

        let readings: Vec<&str> = kanjis[1].readings.iter().map(|r| r.reading.as_str()).collect();
        assert_eq!(readings, vec!["アイ", "あわ.れ", "あわ.れむ"]);
        assert_eq!(kanjis[1].readings[1].kind, ReadingKind::Kun);

        assert_eq!(stats.rows, 5);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.page_indices, 1);
        assert_eq!(stats.sound_indices, 1);
        assert_eq!(stats.readings, 4);
        assert_eq!(stats.examples, 11);
        assert_eq!(stats.reading_notes, 2);
    }

    #[test]
    fn outcomes_per_line() {
        let reference = ReferenceData::default();
        let mut scanner = TableScanner::new(&reference, ScanOptions::default());
        let outcomes: Vec<LineOutcome> = TABLE
            .lines()
            .take(7)
            .map(|line| scanner.feed(line).unwrap())
            .collect();
        assert_eq!(
            outcomes,
            vec![
                LineOutcome::Preamble,
                LineOutcome::TableStart,
                LineOutcome::Skipped(SkipReason::SoundIndex),
                LineOutcome::Header,
                LineOutcome::Row(RowLayout::KanjiReadingExamplesNotes),
                LineOutcome::Row(RowLayout::ExamplesNotes),
                LineOutcome::Skipped(SkipReason::Blank),
            ]
        );
    }

    #[test]
    fn limit_stops_before_next_kanji() {
        let options = ScanOptions {
            limit: Some(1),
            ..Default::default()
        };
        let (kanjis, stats) = scan(TABLE, options).unwrap();
        assert_eq!(kanjis.len(), 1);
        assert_eq!(kanjis[0].readings[0].examples.len(), 4);
        assert_eq!(stats.rows, 2);
    }

    #[test]
    fn missing_table_heading() {
        let err = scan("漢字\n和\tワ\n", ScanOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::TableNotFound));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let text = "本表\nheader\n和\t\t ワ\t 和解\n\t \t 「謎」の謎。\n";
        let err = scan(text, ScanOptions::default()).unwrap_err();
        match &err {
            ScanError::AtLine { line, .. } => assert_eq!(*line, 4),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(err.root(), ScanError::UnknownNoteFormat(_)));
    }

    #[test]
    fn nfc_normalization() {
        // が as か + combining voiced mark
        let text = "本表\nheader\n我\t\t か\u{3099}\n";
        let (kanjis, _) = scan(text, ScanOptions::default()).unwrap();
        assert_eq!(kanjis[0].readings[0].reading, "が");

        let raw = ScanOptions {
            normalize: false,
            ..Default::default()
        };
        let err = scan(text, raw).unwrap_err();
        assert!(matches!(err.root(), ScanError::MalformedRow { .. }));
    }

    #[test]
    fn compatibility_ideographs_survive_normalization() {
        let text = "本表\nheader\n海\t（\u{FA45}）\t \t カイ\t 海岸\n";
        let (kanjis, _) = scan(text, ScanOptions::default()).unwrap();
        assert_eq!(kanjis[0].kanji, "海");
        assert_eq!(kanjis[0].old_kanji, vec!["\u{FA45}"]);
        assert_ne!(kanjis[0].old_kanji[0], kanjis[0].kanji);

        assert_eq!(normalize_line("社\u{FA4C}か\u{3099}"), "社\u{FA4C}が");
        assert_eq!(normalize_line("\u{2F800}"), "\u{2F800}");
    }

    #[test]
    fn old_form_row_and_continuation_build_one_reading() {
        let text = "\
本表
漢字\t音訓\t例\t備考
涙\t（淚）\t \t \t\t \t \t ルイ\t 感涙，声涙，落涙\t
\t \t \t \t 涙腺\t 涙雨（なみだあめ）
";
        let (kanjis, stats) = scan(text, ScanOptions::default()).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(kanjis.len(), 1);

        let rui = &kanjis[0];
        assert_eq!(rui.old_kanji, vec!["淚"]);
        assert_eq!(rui.readings.len(), 1);
        let reading = &rui.readings[0];
        assert_eq!(reading.reading, "ルイ");
        let examples: Vec<&str> = reading.examples.iter().map(|e| e.example.as_str()).collect();
        assert_eq!(examples, vec!["感涙", "声涙", "落涙", "涙腺"]);
        assert_eq!(reading.notes.len(), 1);
        assert_eq!(reading.notes[0].text, "涙雨（なみだあめ）");
    }

    #[test]
    fn lossy_decoding() {
        let mut bytes = "本表\nheader\n".as_bytes().to_vec();
        bytes.extend_from_slice(b"\xff\n");
        let mut seen = Vec::new();
        scan_lines(Cursor::new(bytes), |line| {
            seen.push(line.to_string());
            Ok(true)
        })
        .unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], "\u{FFFD}\n");
    }
}
