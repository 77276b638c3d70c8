//! Chunked program file encoder (fixtures and round trips)

use super::Program;
use crate::{MULTISAMPLE_NAMES_CHUNK, PROGRAM_CHUNK, PROGRAM_MAGIC, PROGRAM_NAME_SIZE};

/// Encode programs and a multisample name table as a chunked `KORG` file
///
/// Program numbers are implied by position and are not written.
pub fn encode_programs(programs: &[Program], multisample_names: &[&str]) -> Vec<u8> {
    let mut out = PROGRAM_MAGIC.to_vec();

    if !multisample_names.is_empty() {
        let mut payload = (multisample_names.len() as u16).to_le_bytes().to_vec();
        for name in multisample_names {
            write_name(&mut payload, name);
        }
        write_chunk(&mut out, MULTISAMPLE_NAMES_CHUNK, &payload);
    }

    let mut payload = (programs.len() as u16).to_le_bytes().to_vec();
    for program in programs {
        write_name(&mut payload, &program.name);
        payload.push(program.category.unwrap_or(0));
        payload.push(program.bank);
        payload.extend_from_slice(&(program.multisamples.len() as u16).to_le_bytes());
        for reference in &program.multisamples {
            payload.extend_from_slice(&reference.index.to_le_bytes());
        }
    }
    write_chunk(&mut out, PROGRAM_CHUNK, &payload);

    out
}

pub(crate) fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    let mut field = [0u8; PROGRAM_NAME_SIZE];
    for (dst, b) in field.iter_mut().zip(name.bytes()) {
        *dst = b;
    }
    out.extend_from_slice(&field);
}
