//! Program metadata parser
//!
//! Programs are the playable sounds built on top of samples. They reference
//! multisamples by index into a separate key-zone layer, never by catalog
//! index, so the linker has to recover the connection by name.
//!
//! Two layouts are read:
//! - Chunked (`KORG`): `tag[4]`, `u32` LE length, payload. `PRG1` holds the
//!   program list, `MSN1` the multisample names. Other chunks are skipped.
//! - Flat (`KORF`): 24-byte name records from 0x24, no references.

use serde::Serialize;
use tracing::{debug, warn};

use crate::cursor::{ByteCursor, read_string};
use crate::error::{ParseError, ProgramError};
use crate::parser::read_name_table;
use crate::{CONTAINER_MAGIC, MULTISAMPLE_NAMES_CHUNK, PROGRAM_CHUNK, PROGRAM_MAGIC, PROGRAM_NAME_SIZE};

mod encode;
#[cfg(test)]
mod tests;

pub use encode::encode_programs;

/// Chunk header: 4-byte tag plus u32 length
const CHUNK_HEADER_SIZE: usize = 8;

/// Category names by id
const CATEGORY_NAMES: [&str; 16] = [
    "Piano",
    "E.Piano",
    "Organ",
    "Guitar",
    "Bass",
    "Strings",
    "Brass",
    "Woodwind",
    "Synth Lead",
    "Synth Pad",
    "Synth FX",
    "Ethnic",
    "Percussion",
    "Drums",
    "SFX",
    "User",
];

/// Reference from a program to a multisample
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultisampleRef {
    /// Index into the multisample layer (not the sample catalog)
    pub index: u16,
    /// Display name from the multisample name table, if present
    pub name: Option<String>,
}

/// One program definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub name: String,
    /// Category id; flat files carry none
    pub category: Option<u8>,
    pub bank: u8,
    pub number: u16,
    /// May be empty
    pub multisamples: Vec<MultisampleRef>,
}

impl Program {
    /// Human-readable category, "Unknown" when absent or out of range
    pub fn category_name(&self) -> &'static str {
        self.category.and_then(category_name).unwrap_or("Unknown")
    }
}

/// Name of a category id
pub fn category_name(id: u8) -> Option<&'static str> {
    CATEGORY_NAMES.get(id as usize).copied()
}

/// Parse a program file
///
/// Programs are returned in file order. Programs without multisample
/// references are kept.
pub fn parse_programs(data: &[u8]) -> Result<Vec<Program>, ProgramError> {
    match data.get(..4) {
        Some(magic) if magic == PROGRAM_MAGIC => parse_chunked(data),
        Some(magic) if magic == CONTAINER_MAGIC => Ok(parse_flat(data)),
        _ => Err(ProgramError::BadSignature),
    }
}

fn parse_chunked(data: &[u8]) -> Result<Vec<Program>, ProgramError> {
    let mut cursor = ByteCursor::at(data, PROGRAM_MAGIC.len());
    let mut programs = Vec::new();
    let mut multisample_names: Vec<String> = Vec::new();

    while cursor.remaining() >= CHUNK_HEADER_SIZE {
        let offset = cursor.position();
        let tag = cursor.take_array::<4>().map_err(|_| eof("header"))?;
        let len = cursor.read_u32_le().map_err(|_| eof("header"))?;
        let tag_name = String::from_utf8_lossy(&tag).into_owned();

        let payload = cursor
            .take(len as usize)
            .map_err(|_| ProgramError::TruncatedChunk {
                tag: tag_name.clone(),
                offset,
                len,
            })?;

        match &tag {
            t if t == PROGRAM_CHUNK => {
                let parsed = parse_program_chunk(payload, programs.len())?;
                debug!("{} chunk at 0x{:08X}: {} programs", tag_name, offset, parsed.len());
                programs.extend(parsed);
            }
            t if t == MULTISAMPLE_NAMES_CHUNK => {
                multisample_names = parse_name_chunk(payload)?;
                debug!(
                    "{} chunk at 0x{:08X}: {} multisample names",
                    tag_name,
                    offset,
                    multisample_names.len()
                );
            }
            _ => {
                warn!("Skipping chunk '{}' at 0x{:08X} ({} bytes)", tag_name, offset, len);
            }
        }
    }

    if cursor.remaining() > 0 {
        debug!("Ignoring {} trailing bytes", cursor.remaining());
    }

    // Names may arrive after the programs that use them
    for reference in programs.iter_mut().flat_map(|p| p.multisamples.iter_mut()) {
        reference.name = multisample_names.get(reference.index as usize).cloned();
    }

    Ok(programs)
}

fn parse_program_chunk(payload: &[u8], first_number: usize) -> Result<Vec<Program>, ProgramError> {
    let mut cursor = ByteCursor::new(payload);
    let truncated = || eof("PRG1");

    let count = cursor.read_u16_le().map_err(|_| truncated())?;
    let mut programs = Vec::with_capacity(count as usize);

    for i in 0..count as usize {
        let name = read_string(cursor.take(PROGRAM_NAME_SIZE).map_err(|_| truncated())?);
        let category = cursor.read_u8().map_err(|_| truncated())?;
        let bank = cursor.read_u8().map_err(|_| truncated())?;
        let ref_count = cursor.read_u16_le().map_err(|_| truncated())?;

        let mut multisamples = Vec::with_capacity(ref_count as usize);
        for _ in 0..ref_count {
            let index = cursor.read_u16_le().map_err(|_| truncated())?;
            multisamples.push(MultisampleRef { index, name: None });
        }

        programs.push(Program {
            name,
            category: Some(category),
            bank,
            number: (first_number + i) as u16,
            multisamples,
        });
    }

    Ok(programs)
}

fn parse_name_chunk(payload: &[u8]) -> Result<Vec<String>, ProgramError> {
    let mut cursor = ByteCursor::new(payload);
    let count = cursor.read_u16_le().map_err(|_| eof("MSN1"))?;
    (0..count)
        .map(|_| {
            cursor
                .take(PROGRAM_NAME_SIZE)
                .map(read_string)
                .map_err(|_: ParseError| eof("MSN1"))
        })
        .collect()
}

/// Flat layout: name records with bank and number in the parameter block
fn parse_flat(data: &[u8]) -> Vec<Program> {
    let programs: Vec<Program> = read_name_table(data, data.len())
        .into_iter()
        .map(|record| Program {
            name: record.name,
            category: None,
            bank: record.params[4],
            number: u16::from(record.params[5]),
            multisamples: Vec::new(),
        })
        .collect();

    debug!("Flat program file: {} programs", programs.len());
    programs
}

fn eof(tag: &str) -> ProgramError {
    ProgramError::UnexpectedEof {
        tag: tag.to_string(),
    }
}
