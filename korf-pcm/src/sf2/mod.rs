//! SoundFont 2 re-encoder
//!
//! Writes a selection of catalog entries as an SF2 bank. Export is two-pass:
//! every selected sample is extracted (in parallel) before any structural
//! chunk is built, so offsets in `shdr` always describe known audio.
//!
//! Layout:
//! - `LIST INFO`: `ifil` 2.04, `isng`, `INAM`, `ISFT`, optional `ICMT`
//! - `LIST sdta`: `smpl` (LE i16, each sample followed by 46 zero frames)
//! - `LIST pdta`: `phdr pbag pmod pgen inst ibag imod igen shdr`

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SampleCatalog;
use crate::classify::Classification;
use crate::error::ExportError;
use crate::extract::{AudioBuffer, extract_many};
use crate::link::LinkResult;
use crate::{DEFAULT_ROOT_KEY, SF2_SAMPLE_PADDING};

mod riff;
mod zones;

use riff::{RiffWriter, zstr};
use zones::{Instrument, layout};

/// Generator operators used in zones
mod generator {
    pub const INSTRUMENT: u16 = 41;
    pub const KEY_RANGE: u16 = 43;
    pub const SAMPLE_ID: u16 = 53;
    pub const SAMPLE_MODES: u16 = 54;
    pub const OVERRIDING_ROOT_KEY: u16 = 58;
}

/// Generators written per instrument zone
const ZONE_GENERATORS: usize = 4;

/// shdr sample type: mono
const MONO_SAMPLE: u16 = 1;

/// Melodic banks 0-127 with 128 presets each; bank 128 is reserved for percussion
const MAX_PRESETS: usize = 128 * 128;

/// Which samples to export and how to map them
#[derive(Debug, Clone, Default)]
pub struct ExportSelection {
    indices: Vec<usize>,
    links: Vec<LinkResult>,
    root_keys: HashMap<usize, u8>,
}

impl ExportSelection {
    /// Select catalog indices; duplicates are dropped, first occurrence wins
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut seen = HashSet::new();
        Self {
            indices: indices.into_iter().filter(|i| seen.insert(*i)).collect(),
            ..Default::default()
        }
    }

    /// Group linked samples into per-program instruments
    pub fn with_links(mut self, links: impl IntoIterator<Item = LinkResult>) -> Self {
        self.links.extend(links);
        self
    }

    /// Set the root key of one sample
    pub fn with_root_key(mut self, index: usize, key: u8) -> Self {
        self.root_keys.insert(index, key.min(127));
        self
    }

    /// Take root keys from classifier results (indexed like the catalog)
    pub fn with_classification(mut self, classes: &[Classification]) -> Self {
        for &index in &self.indices {
            if let Some(key) = classes.get(index).and_then(|c| c.root_key) {
                self.root_keys.entry(index).or_insert(key);
            }
        }
        self
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn root_key(&self, index: usize) -> u8 {
        self.root_keys.get(&index).copied().unwrap_or(DEFAULT_ROOT_KEY)
    }
}

/// Bank-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Written to `INAM`
    pub bank_name: String,
    /// Written to `ICMT` when set
    pub comment: Option<String>,
    /// Largest allowed chunk size in bytes (capped at `u32::MAX`)
    pub max_chunk_size: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            bank_name: "KORF Samples".to_string(),
            comment: None,
            max_chunk_size: u64::from(u32::MAX),
        }
    }
}

/// Encode the selection as a SoundFont 2 file
///
/// # Arguments
/// * `selection` - Samples, links and root keys to export
/// * `catalog` - Catalog the indices refer to
/// * `data` - Container bytes the catalog was parsed from
/// * `options` - Bank name, comment and size limit
///
/// # Errors
/// Any error aborts the export; no bytes are returned.
pub fn export(
    selection: &ExportSelection,
    catalog: &SampleCatalog,
    data: &[u8],
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    if selection.is_empty() {
        return Err(ExportError::EmptySelection);
    }

    let entries = selection
        .indices
        .iter()
        .map(|&index| catalog.get(index).ok_or(ExportError::UnknownSample(index)))
        .collect::<Result<Vec<_>, _>>()?;

    check_count(entries.len())?;

    let smpl_size: u64 = entries
        .iter()
        .map(|e| (e.num_samples() + SF2_SAMPLE_PADDING) as u64 * 2)
        .sum();
    let mut w = RiffWriter::new(options.max_chunk_size);
    w.check(smpl_size)?;
    w.reserve(smpl_size as usize + 4096);

    // Pass 1: all audio
    let buffers = extract_many(data, catalog, &selection.indices)?;
    debug!("Extracted {} samples ({} bytes of smpl)", buffers.len(), smpl_size);

    // Pass 2: structure
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    let root_keys: Vec<u8> = selection
        .indices
        .iter()
        .map(|&index| selection.root_key(index))
        .collect();
    let instruments = layout(&selection.indices, &names, &root_keys, &selection.links);
    check_presets(instruments.len())?;
    check_count(instruments.iter().map(|i| i.zones.len()).sum::<usize>() * ZONE_GENERATORS)?;

    w.begin_list(b"RIFF", b"sfbk");

    w.begin_list(b"LIST", b"INFO");
    w.chunk(b"ifil", &[2, 0, 4, 0])?;
    w.chunk(b"isng", &zstr("EMU8000"))?;
    w.chunk(b"INAM", &zstr(&options.bank_name))?;
    w.chunk(b"ISFT", &zstr(concat!("korf-pcm ", env!("CARGO_PKG_VERSION"))))?;
    if let Some(comment) = &options.comment {
        w.chunk(b"ICMT", &zstr(comment))?;
    }
    w.end()?;

    w.begin_list(b"LIST", b"sdta");
    w.begin(b"smpl");
    for buffer in &buffers {
        for s in &buffer.samples {
            w.bytes(&s.to_le_bytes());
        }
        w.bytes(&[0; SF2_SAMPLE_PADDING * 2]);
    }
    w.end()?;
    w.end()?;

    w.begin_list(b"LIST", b"pdta");
    write_presets(&mut w, &instruments)?;
    write_instruments(&mut w, &instruments)?;
    write_sample_headers(&mut w, &names, &buffers, &root_keys)?;
    w.end()?;

    w.end()?;
    let bytes = w.finish()?;

    debug!(
        "Wrote SF2: {} samples, {} instruments, {} bytes",
        buffers.len(),
        instruments.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Bag and generator indices are 16-bit
fn check_count(count: usize) -> Result<(), ExportError> {
    if count >= usize::from(u16::MAX) {
        return Err(ExportError::SizeLimitExceeded {
            size: count as u64,
            limit: u64::from(u16::MAX) - 1,
        });
    }
    Ok(())
}

/// Every preset needs a (bank, preset) slot below the percussion bank
fn check_presets(count: usize) -> Result<(), ExportError> {
    if count > MAX_PRESETS {
        return Err(ExportError::SizeLimitExceeded {
            size: count as u64,
            limit: MAX_PRESETS as u64,
        });
    }
    Ok(())
}

/// (preset, bank) for the i-th instrument
fn preset_slot(i: usize) -> (u16, u16) {
    ((i % 128) as u16, (i / 128) as u16)
}

/// phdr, pbag, pmod, pgen: one preset with one zone per instrument
fn write_presets(w: &mut RiffWriter, instruments: &[Instrument]) -> Result<(), ExportError> {
    w.begin(b"phdr");
    for (i, instrument) in instruments.iter().enumerate() {
        let (preset, bank) = preset_slot(i);
        w.name(&instrument.name);
        w.u16(preset);
        w.u16(bank);
        w.u16(i as u16); // bag index
        w.u32(0); // library
        w.u32(0); // genre
        w.u32(0); // morphology
    }
    w.name("EOP");
    w.u16(0);
    w.u16(0);
    w.u16(instruments.len() as u16);
    w.bytes(&[0; 12]);
    w.end()?;

    w.begin(b"pbag");
    for i in 0..=instruments.len() {
        w.u16(i as u16); // generator index
        w.u16(0); // modulator index
    }
    w.end()?;

    w.chunk(b"pmod", &[0; 10])?;

    w.begin(b"pgen");
    for i in 0..instruments.len() {
        w.u16(generator::INSTRUMENT);
        w.u16(i as u16);
    }
    w.bytes(&[0; 4]);
    w.end()
}

/// inst, ibag, imod, igen
fn write_instruments(w: &mut RiffWriter, instruments: &[Instrument]) -> Result<(), ExportError> {
    w.begin(b"inst");
    let mut bag = 0u16;
    for instrument in instruments {
        w.name(&instrument.name);
        w.u16(bag);
        bag += instrument.zones.len() as u16;
    }
    w.name("EOI");
    w.u16(bag);
    w.end()?;

    w.begin(b"ibag");
    for zone in 0..=bag {
        w.u16(zone * ZONE_GENERATORS as u16);
        w.u16(0);
    }
    w.end()?;

    w.chunk(b"imod", &[0; 10])?;

    // Key range first and sample id last, as SF2 requires
    w.begin(b"igen");
    for zone in instruments.iter().flat_map(|i| &i.zones) {
        w.u16(generator::KEY_RANGE);
        w.u8(zone.low_key);
        w.u8(zone.high_key);
        w.u16(generator::SAMPLE_MODES);
        w.u16(0);
        w.u16(generator::OVERRIDING_ROOT_KEY);
        w.u16(u16::from(zone.root_key));
        w.u16(generator::SAMPLE_ID);
        w.u16(zone.sample_id);
    }
    w.bytes(&[0; 4]);
    w.end()
}

/// shdr: positions are in frames within smpl
fn write_sample_headers(
    w: &mut RiffWriter,
    names: &[&str],
    buffers: &[AudioBuffer],
    root_keys: &[u8],
) -> Result<(), ExportError> {
    w.begin(b"shdr");
    let mut pos = 0u32;
    for ((name, buffer), &root) in names.iter().zip(buffers).zip(root_keys) {
        let end = pos + buffer.len() as u32;
        w.name(name);
        w.u32(pos);
        w.u32(end);
        w.u32(pos); // loop start
        w.u32(end); // loop end
        w.u32(buffer.sample_rate);
        w.u8(root);
        w.u8(0); // pitch correction
        w.u16(0); // sample link
        w.u16(MONO_SAMPLE);
        pos = end + SF2_SAMPLE_PADDING as u32;
    }
    w.name("EOS");
    w.bytes(&[0; 26]);
    w.end()
}
