//! Rebuilds the Jōyō kanji table (常用漢字表, 2010) from its PDF-to-text dump.
//!
//! Each physical line goes through [`tokenizer::split_row`], then
//! [`classifier::classify_row`], and is folded into [`model::Kanji`] records
//! by [`parser::ParserState`]. Examples are segmented into stem and
//! okurigana by [`okurigana`]; notes are scoped by [`notes`].

pub mod classifier;
pub mod error;
pub mod export;
pub mod kana;
pub mod model;
pub mod notes;
pub mod okurigana;
pub mod parser;
pub mod reference;
pub mod script;
pub mod tokenizer;

pub use error::{Result, ScanError};
pub use model::{Example, Kanji, PartOfSpeech, Reading, ReadingKind};
pub use notes::{Note, NoteKind};
pub use parser::{scan_table, ScanOptions, ScanStats, TableScanner};
pub use reference::ReferenceData;
