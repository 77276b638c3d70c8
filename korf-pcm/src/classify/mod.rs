//! Heuristic sample classification
//!
//! Labels each sample as drum kit material, melodic material or unknown from
//! its name alone. Audio is never decoded here. A high `Unknown` rate is
//! normal for real containers.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::SampleCatalog;

mod note;

pub use note::{midi_to_note, note_to_midi};

/// Default drum-indicative keywords, in priority order
const DRUM_KEYWORDS: &[&str] = &[
    "kick", "snare", "hihat", "hi-hat", "hh", "tom", "crash", "ride", "cymbal", "cym", "clap",
    "rim", "fill", "perc", "percussion", "bassdrum", "bass drum", "bd", "sd", "conga", "bongo",
    "timbal", "tamb", "tambourine", "tabla", "darbuka", "daula", "doira", "djembe", "bell",
    "triangle", "cowbell", "chimes", "gong", "shaker", "castanet", "guiro", "maracas", "cabasa",
    "woodblock", "claves", "agogo", "cuica", "vibraslap", "whistle", "hit", "fx", "sfx", "tok",
    "drbk", "drum",
];

/// Default melodic-indicative keywords, in priority order
const MELODIC_KEYWORDS: &[&str] = &[
    "piano", "string", "violin", "viola", "cello", "bass", "guitar", "organ", "synth", "pad",
    "lead", "brass", "trumpet", "sax", "flute", "clarinet", "oboe", "accordion", "harmonica",
    "harp", "marimba", "vibraphone", "xylophone", "voice", "choir", "nai", "banat", "blerim",
    "braci", "returnela", "musette", "kaval", "fluier",
];

/// Musical role of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleRole {
    Drumkit,
    Melodic,
    Unknown,
}

/// Which heuristic produced a classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatchReason {
    /// A drum keyword matched
    DrumKeyword(String),
    /// A melodic keyword matched
    MelodicKeyword(String),
    /// A note name with octave was found
    NoteName { note: String, octave: i8 },
    /// Nothing matched
    NoMatch,
}

/// Classification of one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub role: SampleRole,
    pub reason: MatchReason,
    /// MIDI key of a note found in the name (melodic samples only)
    pub root_key: Option<u8>,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            role: SampleRole::Unknown,
            reason: MatchReason::NoMatch,
            root_key: None,
        }
    }
}

/// Keyword lists and switches for the classifier
///
/// Lists are checked in order, drum list first; the first hit wins. A
/// keyword may span several words (`"bass drum"`, `"hi-hat"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub drum_keywords: Vec<String>,
    pub melodic_keywords: Vec<String>,
    /// Treat names carrying a note and octave as melodic
    pub detect_notes: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            drum_keywords: DRUM_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            melodic_keywords: MELODIC_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            detect_notes: true,
        }
    }
}

/// Per-role counts over a classified catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub drumkit: usize,
    pub melodic: usize,
    pub unknown: usize,
}

impl ClassificationSummary {
    /// Count the roles in a set of classifications
    pub fn from_results(results: &[Classification]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.role {
                SampleRole::Drumkit => summary.drumkit += 1,
                SampleRole::Melodic => summary.melodic += 1,
                SampleRole::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    /// Total classified samples
    pub fn total(&self) -> usize {
        self.drumkit + self.melodic + self.unknown
    }

    /// Fraction of samples left `Unknown` (0.0 for an empty catalog)
    pub fn unknown_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.unknown as f64 / total as f64,
        }
    }
}

/// A configured keyword, split into words once
#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    words: Vec<String>,
}

impl Keyword {
    fn list(keywords: &[String]) -> Vec<Self> {
        keywords
            .iter()
            .map(|text| Self {
                text: text.clone(),
                words: tokenize(text),
            })
            .filter(|k| !k.words.is_empty())
            .collect()
    }

    /// Whether the keyword's words appear consecutively in `tokens`
    ///
    /// The last word may carry a plural `s` or trailing digits (`kicks`, `kick01`).
    fn matches(&self, tokens: &[String]) -> bool {
        let Some((last, head)) = self.words.split_last() else {
            return false;
        };

        tokens.windows(self.words.len()).any(|window| match window.split_last() {
            Some((window_last, window_head)) => {
                window_head == head && word_matches(window_last, last)
            }
            None => false,
        })
    }
}

/// Classifier with its keyword lists prepared for repeated use
#[derive(Debug, Clone)]
pub struct Classifier {
    drum: Vec<Keyword>,
    melodic: Vec<Keyword>,
    detect_notes: bool,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            drum: Keyword::list(&config.drum_keywords),
            melodic: Keyword::list(&config.melodic_keywords),
            detect_notes: config.detect_notes,
        }
    }

    /// Classify one sample name
    pub fn classify(&self, name: &str) -> Classification {
        let tokens = tokenize(name);
        let note = if self.detect_notes {
            note::detect_note(&tokens)
        } else {
            None
        };

        if let Some(keyword) = first_match(&tokens, &self.drum) {
            return Classification {
                role: SampleRole::Drumkit,
                reason: MatchReason::DrumKeyword(keyword.to_string()),
                root_key: None,
            };
        }

        if let Some(keyword) = first_match(&tokens, &self.melodic) {
            return Classification {
                role: SampleRole::Melodic,
                reason: MatchReason::MelodicKeyword(keyword.to_string()),
                root_key: note.map(|n| n.midi),
            };
        }

        match note {
            Some(n) => Classification {
                role: SampleRole::Melodic,
                reason: MatchReason::NoteName {
                    note: n.note,
                    octave: n.octave,
                },
                root_key: Some(n.midi),
            },
            None => Classification::unknown(),
        }
    }
}

/// Classify one sample name
///
/// Prepares the keyword lists on every call; use [`Classifier`] or
/// [`classify_catalog`] for many names.
pub fn classify(name: &str, config: &ClassifierConfig) -> Classification {
    Classifier::new(config).classify(name)
}

/// Classify every catalog entry in parallel, returned in catalog order
pub fn classify_catalog(catalog: &SampleCatalog, config: &ClassifierConfig) -> Vec<Classification> {
    let classifier = Classifier::new(config);
    catalog
        .entries()
        .par_iter()
        .map(|entry| classifier.classify(&entry.name))
        .collect()
}

/// Lowercase words split on anything that is not alphanumeric or `#`
fn tokenize(name: &str) -> Vec<String> {
    name.split(|c: char| !(c.is_alphanumeric() || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// First keyword (in list order) found in the token stream
fn first_match<'a>(tokens: &[String], keywords: &'a [Keyword]) -> Option<&'a str> {
    keywords
        .iter()
        .find(|keyword| keyword.matches(tokens))
        .map(|keyword| keyword.text.as_str())
}

fn word_matches(token: &str, keyword: &str) -> bool {
    match token.strip_prefix(keyword) {
        Some("") | Some("s") => true,
        Some(rest) => rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
