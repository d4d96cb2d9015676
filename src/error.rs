use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a scan of the Jōyō table.
///
/// The table format is enumerated exhaustively by the classifier and the
/// note resolver, so none of the data errors are recoverable: each one means
/// the input contains a shape the decision tables do not know about yet.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("malformed row {fields:?}: {reason}")]
    MalformedRow { fields: Vec<String>, reason: String },

    #[error("unknown note format: '{0}'")]
    UnknownNoteFormat(String),

    #[error("can't find where to attach note continuation: '{0}'")]
    OrphanedNoteContinuation(String),

    #[error("row contributes {0} before any kanji was seen")]
    NoCurrentCharacter(&'static str),

    #[error("row contributes {role} to {kanji} before any reading was seen")]
    NoCurrentReading { kanji: String, role: &'static str },

    #[error("second old form '{old}' for {kanji}; only 弁 has several")]
    UnexpectedHistoricalForm { kanji: String, old: String },

    #[error("reading {reading} of {kanji} is a variation of '{target}', which matches {matches} sibling readings")]
    DanglingVariation {
        kanji: String,
        reading: String,
        target: String,
        matches: usize,
    },

    #[error("main table heading (本表) not found in input")]
    TableNotFound,

    #[error("reference data {path:?}: {message}")]
    Reference { path: PathBuf, message: String },

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ScanError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub(crate) fn malformed(fields: &[String], reason: impl Into<String>) -> Self {
        ScanError::MalformedRow {
            fields: fields.to_vec(),
            reason: reason.into(),
        }
    }

    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            // already positioned, or not about a row at all
            e @ (ScanError::AtLine { .. } | ScanError::Io(_)) => e,
            e => ScanError::AtLine {
                line,
                source: Box::new(e),
            },
        }
    }

    /// The row-level error, with any line wrapper removed.
    pub fn root(&self) -> &ScanError {
        match self {
            ScanError::AtLine { source, .. } => source.root(),
            e => e,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
