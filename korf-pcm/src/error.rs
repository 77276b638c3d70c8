//! Error types for container parsing, program parsing and export

use std::io;

/// Structural failures while indexing a container or extracting its audio
///
/// Every variant is fatal to the call that produced it: a parse never returns
/// a partial catalog alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Data is too small to hold the signature and the name table start
    #[error("container too small ({0} bytes)")]
    TooSmall(usize),

    /// Missing "KORF" signature at offset 0
    #[error("invalid signature (expected 'KORF')")]
    BadSignature,

    /// Footer markers absent, out of order, or the offset table is not whole words
    #[error("footer offset table missing or malformed")]
    MissingFooter,

    /// Name table and offset table disagree on the number of samples
    #[error("name table has {names} records but footer has {offsets} offsets")]
    CountMismatch { names: usize, offsets: usize },

    /// Offset is not ascending or does not leave room for a sample block
    #[error("invalid offset 0x{offset:08X} for sample {index}")]
    InvalidOffset { index: usize, offset: u32 },

    /// Audio region has an odd number of bytes
    #[error("sample {index} has truncated audio ({len} bytes)")]
    TruncatedAudio { index: usize, len: usize },

    /// Entry range lies outside the supplied container bytes
    #[error("range 0x{start:08X}..0x{end:08X} is outside the container")]
    OffsetOutOfRange { start: usize, end: usize },

    /// Catalog has no entry at this index
    #[error("no sample at index {0}")]
    UnknownIndex(usize),

    /// Read past the end of the data
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// IO error while reading a container from disk
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failures while decoding program metadata
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// Neither "KORG" nor "KORF" magic
    #[error("invalid program file signature")]
    BadSignature,

    /// A chunk declares more bytes than remain in the file
    #[error("chunk '{tag}' at 0x{offset:08X} declares {len} bytes past the end of the file")]
    TruncatedChunk { tag: String, offset: usize, len: u32 },

    /// A recognised chunk ended in the middle of a record
    #[error("unexpected end of '{tag}' chunk")]
    UnexpectedEof { tag: String },
}

/// Failures while re-encoding a selection as a SoundFont 2 bank
///
/// Any error aborts the whole export; no bytes are returned.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Nothing was selected
    #[error("no samples selected for export")]
    EmptySelection,

    /// A chunk would not fit the 32-bit RIFF size field (or the configured limit)
    #[error("chunk size {size} exceeds the limit of {limit} bytes")]
    SizeLimitExceeded { size: u64, limit: u64 },

    /// Selection references an index the catalog does not have
    #[error("sample index {0} is not in the catalog")]
    UnknownSample(usize),

    /// Extracting a selected sample failed
    #[error("failed to extract sample audio: {0}")]
    Extract(#[from] ParseError),
}
