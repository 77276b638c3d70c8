//! Shared fixtures for integration tests

#![allow(dead_code)]

use korf_pcm::{ContainerWriter, MultisampleRef, Program, SAMPLE_HEADER_SIZE};

/// Deterministic test signal
pub fn ramp(len: usize, step: i16) -> Vec<i16> {
    (0..len).map(|i| (i as i16).wrapping_mul(step)).collect()
}

/// Two samples whose audio spans 0x100..0x500 and 0x500..0x900
///
/// The second block's header sits in the last 76 bytes of the first range,
/// so the first sample holds 0x400 - 76 bytes of audio.
pub fn kick_and_pad() -> Vec<u8> {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Kick_01", 44_100, &ramp((0x400 - SAMPLE_HEADER_SIZE) / 2, 3));
    writer.add_sample("Strings_Pad", 44_100, &ramp(0x400 / 2, -5));
    writer.set_data_offset(0x100 - SAMPLE_HEADER_SIZE);
    writer.to_bytes()
}

/// A small arranger-style bank
pub fn bank() -> Vec<u8> {
    let mut writer = ContainerWriter::new();
    for (name, rate, len) in [
        ("Kick_01", 44_100, 64),
        ("Snare_02", 44_100, 48),
        ("Piano C3", 32_000, 120),
        ("Piano C5", 32_000, 100),
        ("Strings Pad", 22_050, 80),
        ("Noise", 0, 16),
        ("Acordeon Do3", 48_000, 90),
    ] {
        writer.add_sample(name, rate, &ramp(len, 7));
    }
    writer.to_bytes()
}

pub fn program(name: &str, category: u8, refs: &[(u16, Option<&str>)]) -> Program {
    Program {
        name: name.to_string(),
        category: Some(category),
        bank: 0,
        number: 0,
        multisamples: refs
            .iter()
            .map(|&(index, name)| MultisampleRef {
                index,
                name: name.map(str::to_string),
            })
            .collect(),
    }
}
