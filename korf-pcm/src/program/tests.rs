//! Tests for the program parser

use super::encode::write_chunk;
use super::*;
use crate::writer::ContainerWriter;

fn program(name: &str, category: u8, refs: &[u16]) -> Program {
    Program {
        name: name.to_string(),
        category: Some(category),
        bank: 0,
        number: 0,
        multisamples: refs
            .iter()
            .map(|&index| MultisampleRef { index, name: None })
            .collect(),
    }
}

#[test]
fn test_parse_chunked() {
    let data = encode_programs(
        &[program("Grand Piano", 0, &[0, 1]), program("Init", 15, &[])],
        &["Piano C2", "Piano C4"],
    );
    let programs = parse_programs(&data).unwrap();

    assert_eq!(programs.len(), 2);
    assert_eq!(programs[0].name, "Grand Piano");
    assert_eq!(programs[0].category_name(), "Piano");
    assert_eq!(programs[0].multisamples[1].name.as_deref(), Some("Piano C4"));
    assert_eq!(programs[1].number, 1);
    assert_eq!(programs[1].category_name(), "User");
    assert!(programs[1].multisamples.is_empty());
}

#[test]
fn test_names_resolve_after_programs() {
    let mut data = PROGRAM_MAGIC.to_vec();
    let programs = encode_programs(&[program("Lead", 8, &[0])], &[]);
    data.extend_from_slice(&programs[4..]);

    let mut names = 1u16.to_le_bytes().to_vec();
    names.extend_from_slice(&[b'S', b'a', b'w', 0]);
    names.resize(2 + PROGRAM_NAME_SIZE, 0);
    write_chunk(&mut data, MULTISAMPLE_NAMES_CHUNK, &names);

    let parsed = parse_programs(&data).unwrap();
    assert_eq!(parsed[0].multisamples[0].name.as_deref(), Some("Saw"));
}

#[test]
fn test_missing_multisample_name() {
    let data = encode_programs(&[program("Pad", 9, &[5])], &["Only"]);
    let parsed = parse_programs(&data).unwrap();
    assert_eq!(parsed[0].multisamples[0].index, 5);
    assert_eq!(parsed[0].multisamples[0].name, None);
}

#[test]
fn test_unknown_chunks_are_skipped() {
    let mut data = PROGRAM_MAGIC.to_vec();
    write_chunk(&mut data, b"GLB1", &[1, 2, 3, 4, 5]);
    write_chunk(&mut data, b"ZZZ9", &[]);
    data.extend_from_slice(&encode_programs(&[program("Organ", 2, &[3])], &[])[4..]);
    write_chunk(&mut data, b"CMB1", &[0; 40]);

    let parsed = parse_programs(&data).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].name, "Organ");
}

#[test]
fn test_truncated_chunk() {
    let mut data = encode_programs(&[program("Organ", 2, &[3])], &[]);
    data.truncate(data.len() - 1);

    assert!(matches!(
        parse_programs(&data),
        Err(ProgramError::TruncatedChunk { ref tag, offset: 4, .. }) if tag == "PRG1"
    ));
}

#[test]
fn test_short_program_record() {
    let mut data = PROGRAM_MAGIC.to_vec();
    // Count says 2 but only one record follows
    let mut payload = 2u16.to_le_bytes().to_vec();
    payload.extend_from_slice(&[b'A'; PROGRAM_NAME_SIZE]);
    payload.extend_from_slice(&[0, 0, 0, 0]);
    write_chunk(&mut data, PROGRAM_CHUNK, &payload);

    assert!(matches!(
        parse_programs(&data),
        Err(ProgramError::UnexpectedEof { ref tag }) if tag == "PRG1"
    ));
}

#[test]
fn test_parse_flat() {
    let mut writer = ContainerWriter::new();
    writer.add_sample_with_params("Grand Piano", 0, [0, 0, 0, 0, 2, 17, 0, 0], &[0]);
    writer.add_sample_with_params("Bright Kit", 0, [0, 0, 0, 0, 3, 4, 0, 0], &[0]);
    let programs = parse_programs(&writer.to_bytes()).unwrap();

    assert_eq!(programs.len(), 2);
    assert_eq!(programs[0].bank, 2);
    assert_eq!(programs[0].number, 17);
    assert_eq!(programs[1].name, "Bright Kit");
    assert_eq!(programs[1].category_name(), "Unknown");
    assert!(programs[1].multisamples.is_empty());
}

#[test]
fn test_bad_signature() {
    assert!(matches!(parse_programs(b"RIFF1234"), Err(ProgramError::BadSignature)));
    assert!(matches!(parse_programs(b"KO"), Err(ProgramError::BadSignature)));
}

#[test]
fn test_category_names() {
    assert_eq!(category_name(0), Some("Piano"));
    assert_eq!(category_name(13), Some("Drums"));
    assert_eq!(category_name(16), None);
}
