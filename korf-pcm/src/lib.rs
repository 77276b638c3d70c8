//! korf-pcm: KORF sample container tools
//!
//! This crate decodes the undocumented KORF container used by arranger keyboards
//! to bundle 16-bit PCM samples, builds a catalog of the samples it holds,
//! classifies them by musical role, links program definitions back to samples
//! and re-encodes a selection as a SoundFont 2 bank.
//!
//! # Key Features
//!
//! - **Index-only parsing**: The catalog is built from the name table and the
//!   footer offset table; audio is only touched on extraction
//! - **Strict integrity**: Positional name/offset pairing is checked, never trusted
//! - **Heuristic layers as data**: Unknown roles and unresolved links are results,
//!   not errors
//! - **Parallel**: Classification, linking and extraction run on rayon
//! - **SoundFont 2 writer**: Two-pass export (extract everything, then serialize)
//!
//! # Container Overview
//!
//! KORF containers contain:
//! - `KORF` signature at offset 0
//! - Name table at 0x24 (24-byte records: 16-byte name + 8-byte parameters)
//! - Sample blocks (76-byte header followed by big-endian 16-bit mono PCM)
//! - Footer: `KBEG`, big-endian u32 block offsets, `KEND`
//!
//! # Usage
//!
//! ```ignore
//! use korf_pcm::{Container, ClassifierConfig, classify_catalog};
//!
//! let container = Container::open("PCM/USER01.PCM")?;
//! let roles = classify_catalog(container.catalog(), &ClassifierConfig::default());
//!
//! for (entry, class) in container.catalog().iter().zip(&roles) {
//!     println!("{:<16} {:>6} Hz {:?}", entry.name, entry.sample_rate, class.role);
//! }
//!
//! let audio = container.extract(0)?;
//! println!("{} frames", audio.len());
//! ```

mod catalog;
mod classify;
mod container;
mod cursor;
mod error;
mod extract;
mod link;
mod parser;
mod program;
mod sf2;
pub mod wav;
mod writer;

pub use catalog::{CatalogWarning, SampleCatalog, SampleEntry, is_known_sample_rate};
pub use classify::{
    Classification, ClassificationSummary, Classifier, ClassifierConfig, MatchReason, SampleRole,
    classify, classify_catalog, midi_to_note, note_to_midi,
};
pub use container::Container;
pub use cursor::ByteCursor;
pub use error::{ExportError, ParseError, ProgramError};
pub use extract::{AudioBuffer, extract, extract_many};
pub use link::{
    Confidence, Coverage, LinkReport, LinkResult, LinkerConfig, ProgramPattern, ReferenceLink,
    Resolution, link,
};
pub use parser::parse_container;
pub use program::{MultisampleRef, Program, category_name, encode_programs, parse_programs};
pub use sf2::{ExportOptions, ExportSelection, export};
pub use writer::ContainerWriter;

// =============================================================================
// Container Constants
// =============================================================================

/// Container signature "KORF"
pub const CONTAINER_MAGIC: &[u8; 4] = b"KORF";

/// Footer begin marker "KBEG"
pub const FOOTER_BEGIN: &[u8; 4] = b"KBEG";

/// Footer end marker "KEND"
pub const FOOTER_END: &[u8; 4] = b"KEND";

/// Offset of the first name table record
pub const NAME_TABLE_OFFSET: usize = 0x24;

/// Size of one name table record
pub const NAME_RECORD_SIZE: usize = 24;

/// Size of the name field inside a name record
pub const NAME_FIELD_SIZE: usize = 16;

/// Size of the opaque parameter block following the name field
pub const PARAM_BLOCK_SIZE: usize = NAME_RECORD_SIZE - NAME_FIELD_SIZE;

/// Size of the header at the start of every sample block
pub const SAMPLE_HEADER_SIZE: usize = 0x4C;

/// Sub-offset of the big-endian u16 sample rate inside the sample header
pub const SAMPLE_RATE_OFFSET: usize = 0x14;

/// Rate assumed when the sample header stores 0
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Sample rates the hardware is known to use
pub const KNOWN_SAMPLE_RATES: [u32; 8] = [8000, 11025, 16000, 22050, 24000, 32000, 44100, 48000];

/// Every sample is 16-bit
pub const BITS_PER_SAMPLE: u16 = 16;

/// Every sample is mono
pub const CHANNELS: u16 = 1;

// =============================================================================
// Program File Constants
// =============================================================================

/// Chunked program file magic "KORG"
pub const PROGRAM_MAGIC: &[u8; 4] = b"KORG";

/// Program list chunk tag
pub const PROGRAM_CHUNK: &[u8; 4] = b"PRG1";

/// Multisample name table chunk tag
pub const MULTISAMPLE_NAMES_CHUNK: &[u8; 4] = b"MSN1";

/// Size of a name field in program entries and multisample name tables
pub const PROGRAM_NAME_SIZE: usize = 24;

// =============================================================================
// SoundFont 2 Constants
// =============================================================================

/// Zero samples appended after every sample in the smpl chunk
pub const SF2_SAMPLE_PADDING: usize = 46;

/// Maximum length of preset, instrument and sample names
pub const SF2_NAME_SIZE: usize = 20;

/// Root key used when nothing better is known (middle C)
pub const DEFAULT_ROOT_KEY: u8 = 60;

// =============================================================================
// Tests
// =============================================================================
