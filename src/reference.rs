//! Auxiliary reference tables that restore what the text dump loses.
//!
//! Loaded from `schema/reference.yaml`:
//!
//! ```yaml
//! popular_alternatives:
//!   𠮟: 叱
//! variants:
//!   遡:
//!     standard: "遡\U000E0100"
//!     accepted: "遡\U000E0101"
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ScanError};

/// Standard and accepted glyphs of a character with graphical variants, as
/// Unicode variation sequences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlyphVariants {
    pub standard: String,
    pub accepted: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceData {
    /// Standard character → popular-use character form (通用字体).
    #[serde(default)]
    pub popular_alternatives: HashMap<String, String>,
    /// Character → glyph variants listed as accepted (許容字体).
    #[serde(default)]
    pub variants: HashMap<String, GlyphVariants>,
}

impl ReferenceData {
    pub fn load(path: &Path) -> Result<Self> {
        let reference_err = |message: String| ScanError::Reference {
            path: path.to_path_buf(),
            message,
        };

        let mut file =
            File::open(path).map_err(|e| reference_err(format!("failed to open: {e}")))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| reference_err(format!("failed to read: {e}")))?;

        Self::from_yaml(&contents).map_err(|e| match e {
            ScanError::Reference { message, .. } => reference_err(message),
            other => other,
        })
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let data: ReferenceData =
            serde_yaml::from_str(contents).map_err(|e| ScanError::Reference {
                path: PathBuf::new(),
                message: format!("failed to parse YAML: {e}"),
            })?;
        data.validate()?;
        Ok(data)
    }

    /// Look for the reference file in the usual places when no path is given.
    pub fn find_default() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("schema/reference.yaml"),
            PathBuf::from("../../schema/reference.yaml"),
        ];
        candidates.into_iter().find(|p| p.exists())
    }

    pub fn popular_alternative(&self, kanji: &str) -> Option<&str> {
        self.popular_alternatives.get(kanji).map(String::as_str)
    }

    pub fn variants_of(&self, kanji: &str) -> Option<&GlyphVariants> {
        self.variants.get(kanji)
    }

    /// Rewrite every standard character in `text` to its popular-use form.
    pub fn popularize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (standard, popular) in &self.popular_alternatives {
            if out.contains(standard.as_str()) {
                out = out.replace(standard.as_str(), popular);
            }
        }
        out
    }

    fn validate(&self) -> Result<()> {
        let single_char = |s: &str| s.chars().count() == 1;
        for (standard, popular) in &self.popular_alternatives {
            if !single_char(standard) || !single_char(popular) {
                return Err(ScanError::Reference {
                    path: PathBuf::new(),
                    message: format!(
                        "popular alternative {standard} → {popular} must map one character to one character"
                    ),
                });
            }
        }
        for (kanji, variants) in &self.variants {
            if !variants.standard.starts_with(kanji.as_str())
                || !variants.accepted.starts_with(kanji.as_str())
            {
                return Err(ScanError::Reference {
                    path: PathBuf::new(),
                    message: format!("variation sequences for {kanji} must start with {kanji}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod reference_tests {
    use super::*;

    const SAMPLE: &str = "popular_alternatives:\n  \"𠮟\": \"叱\"\n  \"剝\": \"剥\"\nvariants:\n  \"遡\":\n    standard: \"遡\\U000E0100\"\n    accepted: \"遡\\U000E0101\"\n";

    #[test]
    fn parses_both_tables() {
        let data = ReferenceData::from_yaml(SAMPLE).unwrap();
        assert_eq!(data.popular_alternative("𠮟"), Some("叱"));
        assert_eq!(data.popular_alternative("叱"), None);
        let v = data.variants_of("遡").unwrap();
        assert_eq!(v.standard, "遡\u{E0100}");
        assert_eq!(v.accepted, "遡\u{E0101}");
    }

    #[test]
    fn popularize_rewrites_examples() {
        let data = ReferenceData::from_yaml(SAMPLE).unwrap();
        assert_eq!(data.popularize("𠮟責，剝製"), "叱責，剥製");
        assert_eq!(data.popularize("和解"), "和解");
    }

    #[test]
    fn missing_tables_default_to_empty() {
        let data = ReferenceData::from_yaml("variants: {}\n").unwrap();
        assert!(data.popular_alternatives.is_empty());
    }

    #[test]
    fn rejects_multi_character_alternatives() {
        let err = ReferenceData::from_yaml("popular_alternatives:\n  \"𠮟責\": \"叱\"\n").unwrap_err();
        assert!(matches!(err, ScanError::Reference { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ReferenceData::load(Path::new("/nonexistent/reference.yaml")).unwrap_err();
        match err {
            ScanError::Reference { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/reference.yaml"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
