//! KORF container index parser

use tracing::{debug, warn};

use crate::catalog::{CatalogWarning, SampleCatalog, SampleEntry, is_known_sample_rate};
use crate::cursor::ByteCursor;
use crate::error::ParseError;
use crate::{
    CONTAINER_MAGIC, DEFAULT_SAMPLE_RATE, NAME_TABLE_OFFSET, SAMPLE_HEADER_SIZE, SAMPLE_RATE_OFFSET,
};

mod footer;
mod names;
#[cfg(test)]
mod tests;

use footer::read_footer;
use names::name_table_end;
pub(crate) use names::read_name_table;

/// Parse a KORF container into a sample catalog
///
/// Only the name table, the footer offset table and the per-sample headers
/// are read. Audio stays in `data` and is sliced later by [`crate::extract`].
///
/// # Arguments
/// * `data` - Raw container bytes
///
/// # Returns
/// * `Ok(SampleCatalog)` - Every sample in file order
/// * `Err(ParseError)` - Structural failure; no partial catalog is produced
pub fn parse_container(data: &[u8]) -> Result<SampleCatalog, ParseError> {
    if data.len() < NAME_TABLE_OFFSET {
        return Err(ParseError::TooSmall(data.len()));
    }

    if &data[0..4] != CONTAINER_MAGIC {
        return Err(ParseError::BadSignature);
    }

    let footer = read_footer(data)?;

    // Names cannot run into the first sample block or the footer
    let limit = footer
        .offsets
        .iter()
        .min()
        .map_or(footer.begin, |&first| (first as usize).min(footer.begin));
    let names = read_name_table(data, limit);

    if names.len() != footer.offsets.len() {
        return Err(ParseError::CountMismatch {
            names: names.len(),
            offsets: footer.offsets.len(),
        });
    }

    let table_end = name_table_end(names.len());
    validate_offsets(&footer.offsets, table_end, footer.begin)?;

    let cursor = ByteCursor::new(data);
    let mut entries = Vec::with_capacity(names.len());
    let mut warnings = Vec::new();

    for (index, (record, &offset)) in names.into_iter().zip(&footer.offsets).enumerate() {
        let block = offset as usize;
        let end = footer
            .offsets
            .get(index + 1)
            .map_or(footer.begin, |&next| next as usize);
        let start = block + SAMPLE_HEADER_SIZE;

        if start >= end {
            return Err(ParseError::InvalidOffset { index, offset });
        }
        if (end - start) % 2 != 0 {
            return Err(ParseError::TruncatedAudio {
                index,
                len: end - start,
            });
        }

        let mut header = [0u8; SAMPLE_HEADER_SIZE];
        header.copy_from_slice(&data[block..start]);

        let raw_sample_rate = cursor.peek_u16_be(block + SAMPLE_RATE_OFFSET)?;
        let sample_rate = match raw_sample_rate {
            0 => DEFAULT_SAMPLE_RATE,
            rate => u32::from(rate),
        };
        let rate_recognized = raw_sample_rate != 0 && is_known_sample_rate(sample_rate);
        if !rate_recognized {
            warn!(
                "Sample {} ('{}') has unrecognized sample rate {} (using {} Hz)",
                index, record.name, raw_sample_rate, sample_rate
            );
            warnings.push(CatalogWarning::UnrecognizedSampleRate {
                index,
                raw: raw_sample_rate,
            });
        }

        debug!(
            "Sample {}: '{}' 0x{:08X}..0x{:08X} @ {} Hz",
            index, record.name, start, end, sample_rate
        );

        entries.push(SampleEntry {
            index,
            name: record.name,
            block_offset: offset,
            start,
            end,
            sample_rate,
            raw_sample_rate,
            rate_recognized,
            params: record.params,
            header,
        });
    }

    debug!(
        "Parsed container: {} samples, {} warnings",
        entries.len(),
        warnings.len()
    );

    Ok(SampleCatalog::new(entries, warnings))
}

/// Every offset must sit after the name table, before the footer, and ascend
fn validate_offsets(offsets: &[u32], table_end: usize, footer_begin: usize) -> Result<(), ParseError> {
    let mut prev: Option<u32> = None;
    for (index, &offset) in offsets.iter().enumerate() {
        let pos = offset as usize;
        let ascending = prev.is_none_or(|p| offset > p);
        if !ascending || pos < table_end || pos >= footer_begin {
            return Err(ParseError::InvalidOffset { index, offset });
        }
        prev = Some(offset);
    }
    Ok(())
}
