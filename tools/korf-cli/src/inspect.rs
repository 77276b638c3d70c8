//! Read-only commands: info, list, classify, programs, scan

use anyhow::{Context, Result};
use korf_pcm::{
    CatalogWarning, Classification, ClassificationSummary, ClassifierConfig, Container,
    MatchReason, SampleRole, classify_catalog, parse_programs,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Open and parse a container with a readable error
pub fn load_container(path: &Path) -> Result<Container> {
    Container::open(path).with_context(|| format!("Failed to parse container: {}", path.display()))
}

/// Read and parse a program file with a readable error
pub fn load_programs(path: &Path) -> Result<Vec<korf_pcm::Program>> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read program file: {}", path.display()))?;
    parse_programs(&data)
        .with_context(|| format!("Failed to parse program file: {}", path.display()))
}

pub fn info(input: &Path, classifier: &ClassifierConfig) -> Result<()> {
    let container = load_container(input)?;
    let catalog = container.catalog();
    let summary = ClassificationSummary::from_results(&classify_catalog(catalog, classifier));

    println!("File:       {}", input.display());
    println!("Size:       {} bytes", container.bytes().len());
    println!("Samples:    {}", catalog.len());
    println!("Audio:      {} bytes", catalog.total_audio_bytes());
    println!(
        "Duration:   {:.1} s",
        catalog.iter().map(|e| e.duration_secs()).sum::<f64>()
    );
    println!(
        "Roles:      {} drum, {} melodic, {} unknown ({:.0}% unknown)",
        summary.drumkit,
        summary.melodic,
        summary.unknown,
        summary.unknown_fraction() * 100.0
    );

    for warning in catalog.warnings() {
        match warning {
            CatalogWarning::UnrecognizedSampleRate { index, raw } => {
                println!("Warning:    sample {} has unrecognized rate {}", index, raw);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SampleRow<'a> {
    index: usize,
    name: &'a str,
    sample_rate: u32,
    rate_recognized: bool,
    frames: usize,
    duration_secs: f64,
    start: usize,
    end: usize,
}

pub fn list(input: &Path, json: bool) -> Result<()> {
    let container = load_container(input)?;
    let rows: Vec<SampleRow> = container
        .catalog()
        .iter()
        .map(|e| SampleRow {
            index: e.index,
            name: &e.name,
            sample_rate: e.sample_rate,
            rate_recognized: e.rate_recognized,
            frames: e.num_samples(),
            duration_secs: e.duration_secs(),
            start: e.start,
            end: e.end,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>5}  {:<16} {:>6} {:>9} {:>8}", "#", "Name", "Rate", "Frames", "Secs");
    for row in &rows {
        let flag = if row.rate_recognized { "" } else { " ?" };
        println!(
            "{:>5}  {:<16} {:>6} {:>9} {:>8.3}{}",
            row.index, row.name, row.sample_rate, row.frames, row.duration_secs, flag
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ClassRow<'a> {
    index: usize,
    name: &'a str,
    #[serde(flatten)]
    class: &'a Classification,
}

pub fn classify(
    input: &Path,
    role: Option<SampleRole>,
    json: bool,
    config: &ClassifierConfig,
) -> Result<()> {
    let container = load_container(input)?;
    let catalog = container.catalog();
    let results = classify_catalog(catalog, config);

    let rows: Vec<ClassRow> = catalog
        .iter()
        .zip(&results)
        .filter(|(_, class)| role.is_none_or(|r| class.role == r))
        .map(|(entry, class)| ClassRow {
            index: entry.index,
            name: &entry.name,
            class,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        let reason = match &row.class.reason {
            MatchReason::DrumKeyword(k) | MatchReason::MelodicKeyword(k) => format!("'{k}'"),
            MatchReason::NoteName { note, octave } => format!("note {note}{octave}"),
            MatchReason::NoMatch => String::new(),
        };
        let root = row
            .class
            .root_key
            .map(|k| format!(" root {k}"))
            .unwrap_or_default();
        println!(
            "{:>5}  {:<16} {:<8} {}{}",
            row.index,
            row.name,
            format!("{:?}", row.class.role),
            reason,
            root
        );
    }

    let summary = ClassificationSummary::from_results(&results);
    println!(
        "\n{} drum, {} melodic, {} unknown",
        summary.drumkit, summary.melodic, summary.unknown
    );
    Ok(())
}

pub fn programs(input: &Path, json: bool) -> Result<()> {
    let programs = load_programs(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&programs)?);
        return Ok(());
    }

    for program in &programs {
        let refs: Vec<String> = program
            .multisamples
            .iter()
            .map(|r| match &r.name {
                Some(name) => format!("{}:{}", r.index, name),
                None => r.index.to_string(),
            })
            .collect();
        println!(
            "{:>3}:{:<4} {:<24} {:<10} [{}]",
            program.bank,
            program.number,
            program.name,
            program.category_name(),
            refs.join(", ")
        );
    }
    println!("\n{} programs", programs.len());
    Ok(())
}

/// Files `scan` looks at, by extension
fn scan_kind(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_uppercase();
    match ext.as_str() {
        "PCM" => Some("PCM"),
        "PCG" => Some("PCG"),
        _ => None,
    }
}

/// Walk a directory and summarize every container and program file
pub fn scan(dir: &Path, max_depth: usize) -> Result<()> {
    let mut files: Vec<(PathBuf, &'static str)> = WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| scan_kind(e.path()).map(|kind| (e.into_path(), kind)))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .PCM or .PCG files found under {}", dir.display());
    }

    let (mut ok, mut failed) = (0usize, 0usize);
    for (path, kind) in &files {
        let shown = path.strip_prefix(dir).unwrap_or(path).display();
        let result = match *kind {
            "PCM" => Container::open(path)
                .map(|c| format!("{} samples", c.catalog().len()))
                .map_err(anyhow::Error::from),
            _ => load_programs(path).map(|p| format!("{} programs", p.len())),
        };
        match result {
            Ok(summary) => {
                ok += 1;
                println!("{kind}  {shown}: {summary}");
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("{}: {:#}", shown, e);
            }
        }
    }

    tracing::info!("Scanned {} files ({} ok, {} failed)", files.len(), ok, failed);
    Ok(())
}
