//! Writers for the scanned records: JSON lines, and a set of flat TSV files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Kanji;

pub const READINGS_TSV: &str = "readings.tsv";
pub const OLD_KANJI_TSV: &str = "old_kanji.tsv";
pub const EXAMPLES_TSV: &str = "examples.tsv";
pub const KANJI_NOTES_TSV: &str = "kanji_notes.tsv";
pub const READING_NOTES_TSV: &str = "reading_notes.tsv";

fn flag(b: bool) -> &'static str {
    if b {
        "Y"
    } else {
        ""
    }
}

/// One JSON object per kanji, one per line.
pub fn write_jsonl(kanjis: &[Kanji], mut writer: impl Write) -> Result<()> {
    for kanji in kanjis {
        serde_json::to_writer(&mut writer, kanji).map_err(std::io::Error::from)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    Ok((path, BufWriter::with_capacity(64 * 1024, file)))
}

/// Write every TSV table into `dir`, creating it if needed. Returns the paths
/// written.
pub fn write_tsv(kanjis: &[Kanji], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let (path, mut f) = create(dir, READINGS_TSV)?;
    writeln!(f, "Kanji\tReading\tRomaji\tType\tUncommon?\tVariation of")?;
    for k in kanjis {
        for r in &k.readings {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}",
                k.kanji,
                r.reading,
                r.romaji(),
                r.kind.as_str(),
                flag(r.uncommon),
                r.variation_of.as_deref().unwrap_or("")
            )?;
        }
    }
    f.flush()?;
    written.push(path);

    let (path, mut f) = create(dir, OLD_KANJI_TSV)?;
    writeln!(f, "Kanji\tOld kanji")?;
    for k in kanjis {
        for old in &k.old_kanji {
            writeln!(f, "{}\t{}", k.kanji, old)?;
        }
    }
    f.flush()?;
    written.push(path);

    let (path, mut f) = create(dir, EXAMPLES_TSV)?;
    writeln!(f, "Kanji\tReading\tUncommon reading?\tExample\tPOS of example")?;
    for k in kanjis {
        for r in &k.readings {
            for e in &r.examples {
                writeln!(
                    f,
                    "{}\t{}\t{}\t{}\t{}",
                    k.kanji,
                    r.reading,
                    flag(r.uncommon),
                    e.example,
                    e.pos.map_or("", |p| p.as_str())
                )?;
            }
        }
    }
    f.flush()?;
    written.push(path);

    let (path, mut f) = create(dir, KANJI_NOTES_TSV)?;
    writeln!(f, "Kanji\tType\tNote")?;
    for k in kanjis {
        for note in &k.notes {
            writeln!(f, "{}\t{}\t{}", k.kanji, note.kind.label(), note.text)?;
        }
    }
    f.flush()?;
    written.push(path);

    let (path, mut f) = create(dir, READING_NOTES_TSV)?;
    writeln!(f, "Kanji\tReading\tUncommon?\tType\tNote")?;
    for k in kanjis {
        for r in &k.readings {
            for note in &r.notes {
                writeln!(
                    f,
                    "{}\t{}\t{}\t{}\t{}",
                    k.kanji,
                    r.reading,
                    flag(r.uncommon),
                    note.kind.label(),
                    note.text
                )?;
            }
        }
    }
    f.flush()?;
    written.push(path);

    Ok(written)
}
