//! Program-to-sample linker
//!
//! Programs reference multisamples, not samples, so the connection to the
//! catalog is recovered from names. Each reference walks a fixed chain:
//! exact name, normalized name, then the heuristic tier (token overlap,
//! program keyword patterns, name prefix), then unresolved. Misses are
//! results, not errors, and coverage is reported alongside the links.
//!
//! A program that declares no references is matched by its own name. That
//! link is kept apart from the references and counted separately.

use hashbrown::HashSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SampleCatalog;
use crate::program::{MultisampleRef, Program};

mod tokens;

use tokens::{tokens, words};

/// Tuning for the keyword tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Shared tokens needed before a sample counts as a keyword match
    pub min_token_overlap: usize,
    /// Shorter words are ignored
    pub min_token_len: usize,
    /// Words that never count toward overlap
    pub stopwords: Vec<String>,
    /// Leading characters compared by the prefix fallback (0 disables it)
    pub prefix_len: usize,
    /// Program keywords that pull in samples by name pattern
    pub patterns: Vec<ProgramPattern>,
}

/// A program keyword and the sample words it implies
///
/// A program whose name contains `keyword` links every sample with a word
/// starting with one of `samples`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPattern {
    pub keyword: String,
    pub samples: Vec<String>,
}

impl ProgramPattern {
    fn new(keyword: &str, samples: &[&str]) -> Self {
        Self {
            keyword: keyword.to_string(),
            samples: samples.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Default pattern table: drum kits first, then melodic families
fn default_patterns() -> Vec<ProgramPattern> {
    vec![
        ProgramPattern::new(
            "toba",
            &[
                "kick", "snare", "tom", "crash", "cymbal", "hihat", "clap", "fill", "cinel",
                "daula", "bd", "sd",
            ],
        ),
        ProgramPattern::new(
            "kit",
            &["kick", "snare", "tom", "crash", "cymbal", "hihat", "clap"],
        ),
        ProgramPattern::new("drum", &["kick", "snare", "tom", "crash", "ride", "hihat"]),
        ProgramPattern::new("manele", &["pai", "clap", "daula", "fill"]),
        ProgramPattern::new("etno", &["fill", "dany", "etno"]),
        ProgramPattern::new("banat", &["banat", "do", "re", "mi", "fa", "sol", "la", "si"]),
        ProgramPattern::new("acordeon", &["acordeon", "acc", "do", "re", "mi"]),
        ProgramPattern::new("vioara", &["vioara", "violin", "vio"]),
        ProgramPattern::new("flute", &["fl", "fluier", "fleita", "flc", "fla", "flg"]),
        ProgramPattern::new("sax", &["sax", "saxo"]),
        ProgramPattern::new("clarinet", &["clr", "clarinet"]),
        ProgramPattern::new("nai", &["nai", "zamfir"]),
    ]
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            min_token_overlap: 1,
            min_token_len: 3,
            stopwords: ["the", "a", "an", "and", "or", "of", "for", "to", "in", "on", "at"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            prefix_len: 4,
            patterns: default_patterns(),
        }
    }
}

/// How one reference was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Unresolved,
    /// Case-sensitive name match
    ExactMatch(Vec<usize>),
    /// Match ignoring case and whitespace runs
    NormalizedMatch(Vec<usize>),
    /// Best token overlap with the program and reference names
    KeywordMatch { samples: Vec<usize>, overlap: usize },
    /// Program keyword from the pattern table
    PatternMatch { samples: Vec<usize>, keywords: Vec<String> },
    /// Same leading characters
    PrefixMatch { samples: Vec<usize>, prefix: String },
}

impl Resolution {
    /// Catalog indices this resolution points at
    pub fn samples(&self) -> &[usize] {
        match self {
            Resolution::Unresolved => &[],
            Resolution::ExactMatch(samples)
            | Resolution::NormalizedMatch(samples)
            | Resolution::KeywordMatch { samples, .. }
            | Resolution::PatternMatch { samples, .. }
            | Resolution::PrefixMatch { samples, .. } => samples,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Resolution::Unresolved => Confidence::Unresolved,
            Resolution::ExactMatch(_) => Confidence::Exact,
            Resolution::NormalizedMatch(_) => Confidence::Normalized,
            Resolution::KeywordMatch { .. }
            | Resolution::PatternMatch { .. }
            | Resolution::PrefixMatch { .. } => Confidence::Keyword,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// Link strength, weakest first
///
/// `Keyword` covers the whole heuristic tier: overlap, pattern and prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Confidence {
    Unresolved,
    Keyword,
    Normalized,
    Exact,
}

/// One reference and where it led
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceLink {
    pub reference: MultisampleRef,
    pub resolution: Resolution,
}

/// Links for one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResult {
    /// Position of the program in the input slice
    pub program: usize,
    pub program_name: String,
    /// One entry per declared multisample reference
    pub references: Vec<ReferenceLink>,
    /// Match on the program's own name, only for programs without references
    pub name_link: Option<Resolution>,
    /// Weakest tier among resolved references; `Unresolved` if none resolved
    pub confidence: Confidence,
}

impl LinkResult {
    /// All linked catalog indices (references and name link), sorted and deduplicated
    pub fn samples(&self) -> Vec<usize> {
        let mut samples: Vec<usize> = self
            .references
            .iter()
            .map(|r| &r.resolution)
            .chain(&self.name_link)
            .flat_map(|r| r.samples().iter().copied())
            .collect();
        samples.sort_unstable();
        samples.dedup();
        samples
    }

    /// Whether at least one declared reference resolved
    pub fn is_resolved(&self) -> bool {
        self.confidence != Confidence::Unresolved
    }

    pub fn resolved_references(&self) -> usize {
        self.references
            .iter()
            .filter(|r| r.resolution.is_resolved())
            .count()
    }
}

/// Resolution counts across a link run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub programs: usize,
    pub resolved_programs: usize,
    pub references: usize,
    pub resolved_references: usize,
    pub exact: usize,
    pub normalized: usize,
    pub keyword: usize,
    pub unresolved: usize,
    /// Programs without references, linked by their own name
    pub name_links: usize,
    pub resolved_name_links: usize,
}

impl Coverage {
    fn from_results(results: &[LinkResult]) -> Self {
        let mut coverage = Self {
            programs: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.is_resolved() {
                coverage.resolved_programs += 1;
            }
            if let Some(resolution) = &result.name_link {
                coverage.name_links += 1;
                if resolution.is_resolved() {
                    coverage.resolved_name_links += 1;
                }
            }
            for link in &result.references {
                coverage.references += 1;
                match link.resolution.confidence() {
                    Confidence::Exact => coverage.exact += 1,
                    Confidence::Normalized => coverage.normalized += 1,
                    Confidence::Keyword => coverage.keyword += 1,
                    Confidence::Unresolved => coverage.unresolved += 1,
                }
            }
        }
        coverage.resolved_references = coverage.references - coverage.unresolved;
        coverage
    }

    /// Fraction of programs with at least one resolved reference
    pub fn program_fraction(&self) -> f64 {
        fraction(self.resolved_programs, self.programs)
    }

    /// Fraction of references resolved by any tier
    pub fn reference_fraction(&self) -> f64 {
        fraction(self.resolved_references, self.references)
    }
}

fn fraction(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64
}

/// Links for every program plus coverage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    pub results: Vec<LinkResult>,
    pub coverage: Coverage,
}

/// Link every program against the catalog
///
/// Programs are processed in parallel; results keep program order. A program
/// without references is matched by its own name into `name_link`; that match
/// does not count as a resolved reference.
pub fn link(programs: &[Program], catalog: &SampleCatalog, config: &LinkerConfig) -> LinkReport {
    let sample_tokens: Vec<HashSet<String>> = catalog
        .entries()
        .par_iter()
        .map(|entry| tokens(&entry.name, config))
        .collect();

    let sample_words: Vec<Vec<String>> = catalog
        .entries()
        .par_iter()
        .map(|entry| words(&entry.name))
        .collect();

    let linker = Linker {
        catalog,
        config,
        sample_tokens,
        sample_words,
    };

    let results: Vec<LinkResult> = programs
        .par_iter()
        .enumerate()
        .map(|(index, program)| linker.link_program(index, program))
        .collect();

    let coverage = Coverage::from_results(&results);
    debug!(
        "Linked {} programs: {}/{} references resolved ({} exact, {} normalized, {} keyword), {}/{} name links",
        coverage.programs,
        coverage.resolved_references,
        coverage.references,
        coverage.exact,
        coverage.normalized,
        coverage.keyword,
        coverage.resolved_name_links,
        coverage.name_links
    );

    LinkReport { results, coverage }
}

struct Linker<'a> {
    catalog: &'a SampleCatalog,
    config: &'a LinkerConfig,
    sample_tokens: Vec<HashSet<String>>,
    /// Every lowercase word of each sample name, for pattern matching
    sample_words: Vec<Vec<String>>,
}

impl Linker<'_> {
    fn link_program(&self, index: usize, program: &Program) -> LinkResult {
        let program_tokens = tokens(&program.name, self.config);

        let references: Vec<ReferenceLink> = program
            .multisamples
            .iter()
            .map(|reference| {
                let mut words = program_tokens.clone();
                if let Some(name) = &reference.name {
                    words.extend(tokens(name, self.config));
                }
                ReferenceLink {
                    reference: reference.clone(),
                    resolution: self.resolve(
                        reference.name.as_deref(),
                        &program.name,
                        &words,
                    ),
                }
            })
            .collect();

        let name_link = references
            .is_empty()
            .then(|| self.resolve(Some(&program.name), &program.name, &program_tokens));

        let confidence = references
            .iter()
            .map(|r| r.resolution.confidence())
            .filter(|c| *c != Confidence::Unresolved)
            .min()
            .unwrap_or(Confidence::Unresolved);

        LinkResult {
            program: index,
            program_name: program.name.clone(),
            references,
            name_link,
            confidence,
        }
    }

    /// Walk the fallback chain for one name
    ///
    /// `name` is the reference name (or the program name for a name link);
    /// unnamed references fall back to the program name for the prefix tier.
    fn resolve(&self, name: Option<&str>, program_name: &str, words: &HashSet<String>) -> Resolution {
        if let Some(name) = name {
            let exact = self.catalog.find_by_name(name);
            if !exact.is_empty() {
                return Resolution::ExactMatch(exact.to_vec());
            }

            let normalized = self.catalog.find_normalized(name);
            if !normalized.is_empty() {
                return Resolution::NormalizedMatch(normalized.to_vec());
            }
        }

        let keyword = self.keyword_match(words);
        if keyword.is_resolved() {
            return keyword;
        }

        let subject = match name {
            Some(name) if name != program_name => format!("{program_name} {name}"),
            _ => program_name.to_string(),
        };
        let pattern = self.pattern_match(&subject);
        if pattern.is_resolved() {
            return pattern;
        }

        self.prefix_match(name.unwrap_or(program_name))
    }

    /// Samples sharing the most tokens, if that is at least the threshold
    fn keyword_match(&self, words: &HashSet<String>) -> Resolution {
        let threshold = self.config.min_token_overlap.max(1);
        let mut best = 0;
        let mut samples = Vec::new();

        for (index, sample_words) in self.sample_tokens.iter().enumerate() {
            let overlap = sample_words.intersection(words).count();
            if overlap < threshold || overlap < best {
                continue;
            }
            if overlap > best {
                best = overlap;
                samples.clear();
            }
            samples.push(index);
        }

        if samples.is_empty() {
            Resolution::Unresolved
        } else {
            Resolution::KeywordMatch {
                samples,
                overlap: best,
            }
        }
    }

    /// Samples whose words start with a pattern implied by a program keyword
    fn pattern_match(&self, subject: &str) -> Resolution {
        let subject = subject.to_lowercase();
        let active: Vec<&ProgramPattern> = self
            .config
            .patterns
            .iter()
            .filter(|p| !p.keyword.is_empty() && subject.contains(&p.keyword.to_lowercase()))
            .collect();
        if active.is_empty() {
            return Resolution::Unresolved;
        }

        let samples: Vec<usize> = self
            .sample_words
            .iter()
            .enumerate()
            .filter(|(_, words)| {
                active.iter().any(|p| {
                    p.samples.iter().any(|pat| {
                        let pat = pat.to_lowercase();
                        words.iter().any(|w| w.starts_with(&pat))
                    })
                })
            })
            .map(|(index, _)| index)
            .collect();

        if samples.is_empty() {
            Resolution::Unresolved
        } else {
            Resolution::PatternMatch {
                samples,
                keywords: active.iter().map(|p| p.keyword.clone()).collect(),
            }
        }
    }

    /// Samples whose leading word starts with the same `prefix_len` characters
    fn prefix_match(&self, name: &str) -> Resolution {
        let Some(prefix) = name_prefix(name, self.config.prefix_len) else {
            return Resolution::Unresolved;
        };

        let samples: Vec<usize> = self
            .catalog
            .iter()
            .filter(|entry| name_prefix(&entry.name, self.config.prefix_len).as_ref() == Some(&prefix))
            .map(|entry| entry.index)
            .collect();

        if samples.is_empty() {
            Resolution::Unresolved
        } else {
            Resolution::PrefixMatch { samples, prefix }
        }
    }
}

/// First `len` characters of the leading word, lowercased
///
/// `None` when disabled or when the leading word is shorter than `len`.
fn name_prefix(name: &str, len: usize) -> Option<String> {
    if len == 0 {
        return None;
    }
    let first = name.split(|c: char| !c.is_alphanumeric()).find(|w| !w.is_empty())?;
    if first.chars().count() < len {
        return None;
    }
    Some(first.chars().take(len).collect::<String>().to_lowercase())
}
