//! Commands that link and write files: link, wav, export, fixture

use anyhow::{Context, Result};
use korf_pcm::{
    ClassifierConfig, ContainerWriter, ExportOptions, ExportSelection, LinkReport, LinkerConfig,
    MultisampleRef, Program, classify_catalog, encode_programs, link, wav,
};
use std::path::{Path, PathBuf};

use crate::inspect::{load_container, load_programs};

pub fn link_programs(
    programs_path: &Path,
    container_path: &Path,
    json: bool,
    config: &LinkerConfig,
) -> Result<()> {
    let programs = load_programs(programs_path)?;
    let container = load_container(container_path)?;
    let report = link(&programs, container.catalog(), config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report, &container);
    Ok(())
}

fn print_report(report: &LinkReport, container: &korf_pcm::Container) {
    for result in &report.results {
        let names: Vec<&str> = result
            .samples()
            .into_iter()
            .filter_map(|i| container.catalog().get(i))
            .map(|e| e.name.as_str())
            .collect();
        println!(
            "{:<24} {:<10} {}",
            result.program_name,
            match &result.name_link {
                Some(resolution) if resolution.is_resolved() => "Name".to_string(),
                _ => format!("{:?}", result.confidence),
            },
            names.join(", ")
        );
    }

    let c = &report.coverage;
    println!(
        "\nPrograms:   {}/{} resolved ({:.0}%)",
        c.resolved_programs,
        c.programs,
        c.program_fraction() * 100.0
    );
    println!(
        "References: {}/{} resolved ({:.0}%): {} exact, {} normalized, {} keyword",
        c.resolved_references,
        c.references,
        c.reference_fraction() * 100.0,
        c.exact,
        c.normalized,
        c.keyword
    );
    if c.name_links > 0 {
        println!(
            "Name links: {}/{} programs without references matched by name",
            c.resolved_name_links, c.name_links
        );
    }
}

/// Filesystem-safe file stem for a sample
fn file_stem(index: usize, name: &str) -> String {
    let clean: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{index:04}_{clean}")
}

pub fn wav(input: &Path, indices: &[usize], output_dir: &Path) -> Result<()> {
    let container = load_container(input)?;
    let catalog = container.catalog();
    let indices: Vec<usize> = if indices.is_empty() {
        (0..catalog.len()).collect()
    } else {
        indices.to_vec()
    };

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let buffers = container.extract_many(&indices)?;
    for (&index, audio) in indices.iter().zip(&buffers) {
        let name = catalog.get(index).map(|e| e.name.as_str()).unwrap_or_default();
        let path = output_dir.join(format!("{}.wav", file_stem(index, name)));
        wav::write_wav(&path, audio)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Wrote {}", path.display());
    }

    tracing::info!("Wrote {} WAV files to {}", buffers.len(), output_dir.display());
    Ok(())
}

pub struct ExportArgs<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub programs: Option<&'a Path>,
    pub indices: &'a [usize],
    pub bank_name: Option<String>,
}

pub fn export(
    args: ExportArgs<'_>,
    classifier: &ClassifierConfig,
    linker: &LinkerConfig,
    options: &ExportOptions,
) -> Result<()> {
    let container = load_container(args.input)?;
    let catalog = container.catalog();

    let indices: Vec<usize> = if args.indices.is_empty() {
        (0..catalog.len()).collect()
    } else {
        args.indices.to_vec()
    };

    let classes = classify_catalog(catalog, classifier);
    let mut selection = ExportSelection::new(indices).with_classification(&classes);

    if let Some(path) = args.programs {
        let programs = load_programs(path)?;
        let report = link(&programs, catalog, linker);
        tracing::info!(
            "Linked {}/{} programs",
            report.coverage.resolved_programs,
            report.coverage.programs
        );
        selection = selection.with_links(report.results);
    }

    let mut options = options.clone();
    if let Some(name) = args.bank_name {
        options.bank_name = name;
    }

    let bytes = korf_pcm::export(&selection, catalog, container.bytes(), &options)
        .context("SoundFont export failed")?;
    std::fs::write(args.output, &bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        "Wrote {} samples to {} ({} bytes)",
        selection.indices().len(),
        args.output.display(),
        bytes.len()
    );
    Ok(())
}

/// Demo samples: name, raw rate, frames, frequency divisor
const FIXTURE_SAMPLES: [(&str, u16, usize, i32); 6] = [
    ("Kick_01", 44_100, 2_000, 40),
    ("Snare_02", 44_100, 1_500, 7),
    ("Piano C3", 32_000, 4_000, 61),
    ("Piano C5", 32_000, 3_000, 15),
    ("Strings Pad", 22_050, 6_000, 50),
    ("Noise", 0, 500, 3),
];

/// Triangle wave, deterministic
fn triangle(frames: usize, period: i32) -> Vec<i16> {
    let period = period.max(2);
    (0..frames as i32)
        .map(|i| {
            let phase = i % period;
            let half = period / 2;
            let level = if phase < half { phase } else { period - phase };
            ((level * 2 - half) * (i16::MAX as i32 / 2) / half.max(1)) as i16
        })
        .collect()
}

pub fn fixture(output: &Path, programs: Option<PathBuf>) -> Result<()> {
    let mut writer = ContainerWriter::new();
    for (name, rate, frames, period) in FIXTURE_SAMPLES {
        writer.add_sample(name, rate, &triangle(frames, period));
    }
    std::fs::write(output, writer.to_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote {} samples to {}", writer.len(), output.display());

    if let Some(path) = programs {
        let refs = |ids: &[u16]| -> Vec<MultisampleRef> {
            ids.iter()
                .map(|&index| MultisampleRef { index, name: None })
                .collect()
        };
        let programs = [
            Program {
                name: "Concert Piano".to_string(),
                category: Some(0),
                bank: 0,
                number: 0,
                multisamples: refs(&[0, 1]),
            },
            Program {
                name: "Warm Strings".to_string(),
                category: Some(5),
                bank: 0,
                number: 1,
                multisamples: refs(&[2]),
            },
            Program {
                name: "Standard Kit".to_string(),
                category: Some(13),
                bank: 0,
                number: 2,
                multisamples: refs(&[3, 4]),
            },
        ];
        let names = ["Piano C3", "Piano C5", "Strings Pad", "Kick_01", "Snare_02"];
        std::fs::write(&path, encode_programs(&programs, &names))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {} programs to {}", programs.len(), path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(3, "Piano C#4"), "0003_Piano_C_4");
        assert_eq!(file_stem(12, "a/b"), "0012_a_b");
    }

    #[test]
    fn test_triangle_stays_in_range() {
        let wave = triangle(1_000, 61);
        assert_eq!(wave.len(), 1_000);
        assert!(wave.iter().any(|&s| s > 0));
        assert!(wave.iter().any(|&s| s < 0));
    }

    #[test]
    fn test_fixture_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pcm = dir.path().join("DEMO.PCM");
        let pcg = dir.path().join("DEMO.PCG");
        fixture(&pcm, Some(pcg.clone())).unwrap();

        let container = load_container(&pcm).unwrap();
        assert_eq!(container.catalog().len(), FIXTURE_SAMPLES.len());

        let programs = load_programs(&pcg).unwrap();
        let report = link(&programs, container.catalog(), &LinkerConfig::default());
        assert_eq!(report.coverage.resolved_programs, 3);
        assert_eq!(report.results[0].samples(), vec![2, 3]);
    }

    #[test]
    fn test_export_writes_sf2() {
        let dir = tempfile::tempdir().unwrap();
        let pcm = dir.path().join("DEMO.PCM");
        let pcg = dir.path().join("DEMO.PCG");
        let sf2 = dir.path().join("demo.sf2");
        fixture(&pcm, Some(pcg.clone())).unwrap();

        export(
            ExportArgs {
                input: &pcm,
                output: &sf2,
                programs: Some(&pcg),
                indices: &[],
                bank_name: Some("Demo".to_string()),
            },
            &ClassifierConfig::default(),
            &LinkerConfig::default(),
            &ExportOptions::default(),
        )
        .unwrap();

        let bytes = std::fs::read(&sf2).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"sfbk");
    }

    #[test]
    fn test_wav_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let pcm = dir.path().join("DEMO.PCM");
        fixture(&pcm, None).unwrap();

        let out = dir.path().join("wav");
        wav(&pcm, &[0, 2], &out).unwrap();
        assert!(out.join("0000_Kick_01.wav").is_file());
        assert!(out.join("0002_Piano_C3.wav").is_file());
    }
}
