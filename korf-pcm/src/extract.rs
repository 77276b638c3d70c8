//! PCM extraction
//!
//! Slices a catalog entry's audio out of the container and converts the
//! big-endian 16-bit samples to native order. Nothing else is done to the
//! audio: no resampling, no dithering.

use rayon::prelude::*;

use crate::catalog::{SampleCatalog, SampleEntry};
use crate::error::ParseError;

/// Decoded mono 16-bit audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    /// Samples in native byte order
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> u16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Extract one entry's audio from the container bytes
///
/// Pure and idempotent: the same entry always yields the same buffer, and
/// calls may run concurrently over a shared container.
///
/// # Errors
/// * `OffsetOutOfRange` - the entry does not lie inside `data`
/// * `TruncatedAudio` - the audio region has an odd number of bytes
pub fn extract(data: &[u8], entry: &SampleEntry) -> Result<AudioBuffer, ParseError> {
    let bytes = data
        .get(entry.start..entry.end)
        .ok_or(ParseError::OffsetOutOfRange {
            start: entry.start,
            end: entry.end,
        })?;

    if bytes.len() % 2 != 0 {
        return Err(ParseError::TruncatedAudio {
            index: entry.index,
            len: bytes.len(),
        });
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    Ok(AudioBuffer {
        samples,
        sample_rate: entry.sample_rate,
    })
}

/// Extract several entries in parallel
///
/// Results come back in the order of `indices`. The first failure aborts
/// the whole call.
pub fn extract_many(
    data: &[u8],
    catalog: &SampleCatalog,
    indices: &[usize],
) -> Result<Vec<AudioBuffer>, ParseError> {
    indices
        .par_iter()
        .map(|&index| {
            let entry = catalog.get(index).ok_or(ParseError::UnknownIndex(index))?;
            extract(data, entry)
        })
        .collect()
}
