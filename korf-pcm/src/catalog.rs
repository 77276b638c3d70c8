//! Sample catalog built from a container index

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::{BITS_PER_SAMPLE, CHANNELS, KNOWN_SAMPLE_RATES, PARAM_BLOCK_SIZE, SAMPLE_HEADER_SIZE};

/// Indices sharing one name (almost always a single entry)
type IndexList = SmallVec<[usize; 1]>;

/// One sample in a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    /// Position in the catalog (file order)
    pub index: usize,
    /// Display name from the name table, trimmed
    pub name: String,
    /// Offset of the sample block (its 76-byte header)
    pub block_offset: u32,
    /// First audio byte (inclusive)
    pub start: usize,
    /// End of audio (exclusive)
    pub end: usize,
    /// Effective sample rate in Hz
    pub sample_rate: u32,
    /// Rate as stored in the sample header (0 means "default")
    pub raw_sample_rate: u16,
    /// Whether the stored rate is one of the known hardware rates
    pub rate_recognized: bool,
    /// Opaque parameter block from the name table
    pub params: [u8; PARAM_BLOCK_SIZE],
    /// Opaque per-sample header preceding the audio
    pub header: [u8; SAMPLE_HEADER_SIZE],
}

impl SampleEntry {
    /// Always 16
    pub fn bit_depth(&self) -> u16 {
        BITS_PER_SAMPLE
    }

    /// Always 1
    pub fn channels(&self) -> u16 {
        CHANNELS
    }

    /// Size of the audio region in bytes
    pub fn byte_len(&self) -> usize {
        self.end - self.start
    }

    /// Number of 16-bit frames
    pub fn num_samples(&self) -> usize {
        self.byte_len() / 2
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }
}

/// Non-fatal findings recorded while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// Stored sample rate is not a known hardware rate (0 included)
    UnrecognizedSampleRate { index: usize, raw: u16 },
}

/// Whether `rate` is one of the hardware's discrete sample rates
pub fn is_known_sample_rate(rate: u32) -> bool {
    KNOWN_SAMPLE_RATES.contains(&rate)
}

/// Ordered, immutable index of the samples in one container
///
/// Names may repeat; every record is kept and addressed by index.
#[derive(Debug, Clone, Default)]
pub struct SampleCatalog {
    entries: Vec<SampleEntry>,
    warnings: Vec<CatalogWarning>,
    by_name: HashMap<String, IndexList>,
    by_normalized: HashMap<String, IndexList>,
}

impl SampleCatalog {
    /// Build a catalog from finished entries
    pub(crate) fn new(entries: Vec<SampleEntry>, warnings: Vec<CatalogWarning>) -> Self {
        let mut by_name: HashMap<String, IndexList> = HashMap::with_capacity(entries.len());
        let mut by_normalized: HashMap<String, IndexList> = HashMap::with_capacity(entries.len());

        for entry in &entries {
            by_name.entry(entry.name.clone()).or_default().push(entry.index);
            by_normalized
                .entry(normalize_name(&entry.name))
                .or_default()
                .push(entry.index);
        }

        Self {
            entries,
            warnings,
            by_name,
            by_normalized,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container held no samples
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by index
    pub fn get(&self, index: usize) -> Option<&SampleEntry> {
        self.entries.get(index)
    }

    /// All entries in file order
    pub fn entries(&self) -> &[SampleEntry] {
        &self.entries
    }

    /// Iterate entries in file order
    pub fn iter(&self) -> std::slice::Iter<'_, SampleEntry> {
        self.entries.iter()
    }

    /// Non-fatal findings from the parse
    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    /// Indices whose name matches exactly (case-sensitive)
    pub fn find_by_name(&self, name: &str) -> &[usize] {
        self.by_name.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Indices whose name matches ignoring case and whitespace runs
    pub fn find_normalized(&self, name: &str) -> &[usize] {
        self.by_normalized
            .get(&normalize_name(name))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Total audio bytes across all entries
    pub fn total_audio_bytes(&self) -> usize {
        self.entries.iter().map(SampleEntry::byte_len).sum()
    }
}

impl<'a> IntoIterator for &'a SampleCatalog {
    type Item = &'a SampleEntry;
    type IntoIter = std::slice::Iter<'a, SampleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Lowercase and collapse whitespace runs to single spaces
pub(crate) fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, name: &str, start: usize, end: usize) -> SampleEntry {
        SampleEntry {
            index,
            name: name.to_string(),
            block_offset: (start - SAMPLE_HEADER_SIZE) as u32,
            start,
            end,
            sample_rate: 48_000,
            raw_sample_rate: 48_000,
            rate_recognized: true,
            params: [0; PARAM_BLOCK_SIZE],
            header: [0; SAMPLE_HEADER_SIZE],
        }
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let catalog = SampleCatalog::new(
            vec![
                entry(0, "Kick", 0x100, 0x200),
                entry(1, "Snare", 0x250, 0x300),
                entry(2, "Kick", 0x350, 0x400),
            ],
            Vec::new(),
        );
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.find_by_name("Kick"), &[0, 2]);
        assert!(catalog.find_by_name("kick").is_empty());
    }

    #[test]
    fn test_normalized_lookup() {
        let catalog = SampleCatalog::new(vec![entry(0, "Strings  Pad", 0x100, 0x200)], Vec::new());
        assert_eq!(catalog.find_normalized("strings pad"), &[0]);
        assert_eq!(catalog.find_normalized(" STRINGS\tPAD "), &[0]);
        assert!(catalog.find_normalized("strings").is_empty());
    }

    #[test]
    fn test_entry_sizes() {
        let e = entry(0, "Pad", 0x100, 0x500);
        assert_eq!(e.byte_len(), 0x400);
        assert_eq!(e.num_samples(), 0x200);
        assert_eq!(e.bit_depth(), 16);
        assert_eq!(e.channels(), 1);
        assert!((e.duration_secs() - 512.0 / 48_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_rates() {
        assert!(is_known_sample_rate(44_100));
        assert!(is_known_sample_rate(48_000));
        assert!(!is_known_sample_rate(12_345));
        assert!(!is_known_sample_rate(0));
    }
}
