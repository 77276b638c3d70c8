//! Tests for the container index parser

use super::*;
use crate::writer::ContainerWriter;
use crate::{FOOTER_BEGIN, FOOTER_END};

fn two_sample_container() -> Vec<u8> {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Kick_01", 44_100, &[0x1234, -2, 3, 4]);
    writer.add_sample("Strings Pad", 32_000, &[5, 6]);
    writer.to_bytes()
}

/// Replace the footer of a written container with the given offsets
fn with_offsets(data: &[u8], offsets: &[u32]) -> Vec<u8> {
    let begin = read_footer(data).unwrap().begin;
    let mut out = data[..begin].to_vec();
    out.extend_from_slice(FOOTER_BEGIN);
    for offset in offsets {
        out.extend_from_slice(&offset.to_be_bytes());
    }
    out.extend_from_slice(FOOTER_END);
    out
}

#[test]
fn test_parse_two_samples() {
    let data = two_sample_container();
    let catalog = parse_container(&data).unwrap();

    assert_eq!(catalog.len(), 2);
    assert!(catalog.warnings().is_empty());

    let kick = catalog.get(0).unwrap();
    assert_eq!(kick.name, "Kick_01");
    assert_eq!(kick.sample_rate, 44_100);
    assert_eq!(kick.num_samples(), 4);
    assert_eq!(kick.start, kick.block_offset as usize + SAMPLE_HEADER_SIZE);

    let pad = catalog.get(1).unwrap();
    assert_eq!(pad.name, "Strings Pad");
    assert_eq!(pad.sample_rate, 32_000);
    assert_eq!(pad.num_samples(), 2);
    assert_eq!(kick.end, pad.block_offset as usize);
    assert_eq!(pad.end, read_footer(&data).unwrap().begin);
}

#[test]
fn test_entries_are_monotonic() {
    let mut writer = ContainerWriter::new();
    for i in 0..12 {
        writer.add_sample(&format!("Sample {i}"), 22_050, &vec![i as i16; 10 + i]);
    }
    let catalog = parse_container(&writer.to_bytes()).unwrap();

    assert_eq!(catalog.len(), 12);
    for pair in catalog.entries().windows(2) {
        assert!(pair[0].start < pair[0].end);
        assert!(pair[0].end <= pair[1].start);
    }
}

#[test]
fn test_empty_container() {
    let catalog = parse_container(&ContainerWriter::new().to_bytes()).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn test_too_small() {
    assert!(matches!(parse_container(b"KORF"), Err(ParseError::TooSmall(4))));
}

#[test]
fn test_bad_signature() {
    let mut data = two_sample_container();
    data[..4].copy_from_slice(b"RIFF");
    assert!(matches!(parse_container(&data), Err(ParseError::BadSignature)));
}

#[test]
fn test_missing_footer() {
    let data = two_sample_container();
    let begin = read_footer(&data).unwrap().begin;
    assert!(matches!(
        parse_container(&data[..begin]),
        Err(ParseError::MissingFooter)
    ));
}

#[test]
fn test_count_mismatch_ten_names_nine_offsets() {
    let mut writer = ContainerWriter::new();
    for i in 0..10 {
        writer.add_sample(&format!("Tone {i}"), 48_000, &[1, 2, 3, 4]);
    }
    let data = writer.to_bytes();
    let offsets = read_footer(&data).unwrap().offsets;
    let truncated = with_offsets(&data, &offsets[..9]);

    assert!(matches!(
        parse_container(&truncated),
        Err(ParseError::CountMismatch {
            names: 10,
            offsets: 9
        })
    ));
}

#[test]
fn test_count_prefix() {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Bass", 44_100, &[1, 2]);
    writer.add_sample("Lead", 44_100, &[3, 4]);
    writer.set_count_prefix(true);

    let catalog = parse_container(&writer.to_bytes()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(1).unwrap().name, "Lead");
}

#[test]
fn test_descending_offsets_are_rejected() {
    let data = two_sample_container();
    let mut offsets = read_footer(&data).unwrap().offsets;
    offsets.swap(0, 1);
    let data = with_offsets(&data, &offsets);

    assert!(matches!(
        parse_container(&data),
        Err(ParseError::InvalidOffset { index: 1, .. })
    ));
}

#[test]
fn test_empty_block_is_rejected() {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Silence", 44_100, &[]);
    writer.add_sample("Tone", 44_100, &[1]);

    assert!(matches!(
        parse_container(&writer.to_bytes()),
        Err(ParseError::InvalidOffset { index: 0, .. })
    ));
}

#[test]
fn test_odd_audio_is_truncated() {
    let mut writer = ContainerWriter::new();
    writer.add_raw_sample("Broken", 44_100, &[0, 1, 2]);

    assert!(matches!(
        parse_container(&writer.to_bytes()),
        Err(ParseError::TruncatedAudio { index: 0, len: 3 })
    ));
}

#[test]
fn test_zero_rate_defaults_and_warns() {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Default", 0, &[1, 2]);
    writer.add_sample("Odd Rate", 12_345, &[1, 2]);
    writer.add_sample("Fine", 24_000, &[1, 2]);
    let catalog = parse_container(&writer.to_bytes()).unwrap();

    let default = catalog.get(0).unwrap();
    assert_eq!(default.sample_rate, DEFAULT_SAMPLE_RATE);
    assert_eq!(default.raw_sample_rate, 0);
    assert!(!default.rate_recognized);

    let odd = catalog.get(1).unwrap();
    assert_eq!(odd.sample_rate, 12_345);
    assert!(!odd.rate_recognized);
    assert!(catalog.get(2).unwrap().rate_recognized);

    assert_eq!(
        catalog.warnings(),
        &[
            CatalogWarning::UnrecognizedSampleRate { index: 0, raw: 0 },
            CatalogWarning::UnrecognizedSampleRate {
                index: 1,
                raw: 12_345
            },
        ]
    );
}

#[test]
fn test_params_and_header_are_preserved() {
    let mut writer = ContainerWriter::new();
    writer.add_sample_with_params("Choir", 44_100, [9, 8, 7, 6, 5, 4, 3, 2], &[7; 8]);
    let catalog = parse_container(&writer.to_bytes()).unwrap();

    let entry = catalog.get(0).unwrap();
    assert_eq!(entry.params, [9, 8, 7, 6, 5, 4, 3, 2]);
    assert_eq!(
        &entry.header[SAMPLE_RATE_OFFSET..SAMPLE_RATE_OFFSET + 2],
        &44_100u16.to_be_bytes()
    );
}

#[test]
fn test_duplicate_names_survive_parse() {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Hit", 44_100, &[1]);
    writer.add_sample("Hit", 44_100, &[2]);
    let catalog = parse_container(&writer.to_bytes()).unwrap();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.find_by_name("Hit"), &[0, 1]);
}

#[test]
fn test_data_offset_gap() {
    let mut writer = ContainerWriter::new();
    writer.add_sample("Kick_01", 44_100, &[0; 0x200]);
    writer.set_data_offset(0x100 - SAMPLE_HEADER_SIZE);
    let catalog = parse_container(&writer.to_bytes()).unwrap();

    let entry = catalog.get(0).unwrap();
    assert_eq!(entry.start, 0x100);
    assert_eq!(entry.end, 0x500);
}
