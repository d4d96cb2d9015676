use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use joyo_scanner::export::{write_jsonl, write_tsv};
use joyo_scanner::parser::{scan_lines, LineOutcome};
use joyo_scanner::{Kanji, ReferenceData, ScanOptions, ScanStats, TableScanner};

const JSONL_FILE: &str = "joyo.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Jsonl,
    Tsv,
    All,
}

#[derive(Parser)]
#[command(name = "joyo-scanner")]
#[command(about = "Rebuild the Jōyō kanji table from its text dump")]
struct Args {
    /// Input text file (.txt or .txt.bz2)
    input: PathBuf,

    /// Output directory
    output_dir: PathBuf,

    /// Reference data YAML (default: schema/reference.yaml)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::All)]
    format: Format,

    /// Keep input text as is instead of NFC-normalizing it
    #[arg(long)]
    no_normalize: bool,

    /// Stop after this many kanji (for testing)
    #[arg(long)]
    limit: Option<usize>,

    /// Suppress progress and statistics
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_reference(path: Option<&PathBuf>) -> Result<ReferenceData> {
    let path = match path.cloned().or_else(ReferenceData::find_default) {
        Some(path) => path,
        None => {
            warn!("no reference data found; popular forms and glyph variants are not restored");
            return Ok(ReferenceData::default());
        }
    };
    info!("using reference data at {}", path.display());
    Ok(ReferenceData::load(&path)?)
}

fn open_input(path: &PathBuf) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(256 * 1024, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(256 * 1024, file))
    };
    Ok(reader)
}

fn run_scan(
    reader: impl BufRead,
    reference: &ReferenceData,
    options: ScanOptions,
    quiet: bool,
) -> Result<(Vec<Kanji>, ScanStats)> {
    let start_time = Instant::now();

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        pb
    };

    let mut scanner = TableScanner::new(reference, options);
    scan_lines(reader, |line| {
        if let LineOutcome::Row(_) = scanner.feed(line)? {
            let state = scanner.state();
            if let Some(kanji) = state.current_kanji() {
                pb.set_message(format!(
                    "Lines: {} | Kanji: {} | Current: {}",
                    scanner.stats().lines_read,
                    state.kanjis.len(),
                    kanji.kanji
                ));
            }
        }
        pb.tick();
        Ok(!scanner.is_done())
    })?;
    pb.finish_and_clear();

    let (kanjis, mut stats) = scanner.finish()?;
    stats.elapsed = start_time.elapsed();
    Ok((kanjis, stats))
}

fn print_stats(stats: &ScanStats) {
    println!();
    println!("============================================================");
    println!("Lines read: {}", stats.lines_read);
    println!("Table rows: {}", stats.rows);
    println!("Kanji: {}", stats.kanji);
    println!("  Old forms: {}", stats.old_kanji);
    println!("  Kanji notes: {}", stats.kanji_notes);
    println!("Readings: {}", stats.readings);
    println!("  Uncommon: {}", stats.uncommon_readings);
    println!("  Variations: {}", stats.variations);
    println!("  Reading notes: {}", stats.reading_notes);
    println!("Examples: {}", stats.examples);
    println!(
        "Avg readings/kanji: {:.2}",
        stats.readings as f64 / stats.kanji.max(1) as f64
    );
    println!("------------------------------------------------------------");
    println!("Skipped blank lines: {}", stats.blank_lines);
    println!("Skipped page indices: {}", stats.page_indices);
    println!("Skipped sound indices: {}", stats.sound_indices);
    println!("Time: {:.2}s", stats.elapsed.as_secs_f64());
    println!("============================================================");
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let reference = load_reference(args.reference.as_ref())?;
    let options = ScanOptions {
        normalize: !args.no_normalize,
        limit: args.limit,
    };

    if !args.quiet {
        println!("Parsing: {}", args.input.display());
        println!("Output: {}", args.output_dir.display());
        if let Some(limit) = args.limit {
            println!("Limit: {} kanji", limit);
        }
        println!();
    }

    let reader = open_input(&args.input)?;
    let (kanjis, stats) = run_scan(reader, &reference, options, args.quiet)
        .with_context(|| format!("scanning {}", args.input.display()))?;

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    if matches!(args.format, Format::Jsonl | Format::All) {
        let path = args.output_dir.join(JSONL_FILE);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_jsonl(&kanjis, BufWriter::with_capacity(256 * 1024, file))?;
        info!("wrote {}", path.display());
    }
    if matches!(args.format, Format::Tsv | Format::All) {
        for path in write_tsv(&kanjis, &args.output_dir)? {
            info!("wrote {}", path.display());
        }
    }

    if !args.quiet {
        print_stats(&stats);
    }

    Ok(())
}
