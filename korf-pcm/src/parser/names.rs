//! Name table decoding

use crate::cursor::read_string;
use crate::{NAME_FIELD_SIZE, NAME_RECORD_SIZE, NAME_TABLE_OFFSET, PARAM_BLOCK_SIZE};

/// One name table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NameRecord {
    pub name: String,
    pub params: [u8; PARAM_BLOCK_SIZE],
}

/// Read name records from `NAME_TABLE_OFFSET` up to `limit`
///
/// The table has no stored count. It ends at the first record that does not
/// start with printable ASCII or whose trimmed name is empty, or when the next
/// record would cross `limit`.
pub(crate) fn read_name_table(data: &[u8], limit: usize) -> Vec<NameRecord> {
    let limit = limit.min(data.len());
    let mut records = Vec::new();
    let mut pos = NAME_TABLE_OFFSET;

    while pos + NAME_RECORD_SIZE <= limit {
        let record = &data[pos..pos + NAME_RECORD_SIZE];
        if !is_name_byte(record[0]) {
            break;
        }

        let name = read_string(&record[..NAME_FIELD_SIZE]);
        if name.is_empty() {
            break;
        }

        let mut params = [0u8; PARAM_BLOCK_SIZE];
        params.copy_from_slice(&record[NAME_FIELD_SIZE..]);
        records.push(NameRecord { name, params });
        pos += NAME_RECORD_SIZE;
    }

    records
}

/// End of a name table holding `count` records
pub(crate) fn name_table_end(count: usize) -> usize {
    NAME_TABLE_OFFSET + count * NAME_RECORD_SIZE
}

fn is_name_byte(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, params: [u8; PARAM_BLOCK_SIZE]) -> Vec<u8> {
        let mut rec = vec![0u8; NAME_FIELD_SIZE];
        rec[..name.len()].copy_from_slice(name.as_bytes());
        rec.extend_from_slice(&params);
        rec
    }

    fn table(records: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0u8; NAME_TABLE_OFFSET];
        for r in records {
            data.extend_from_slice(r);
        }
        data
    }

    #[test]
    fn test_stops_at_non_printable_record() {
        let mut data = table(&[record("Kick_01", [1; 8]), record("Snare", [2; 8])]);
        data.extend_from_slice(&[0u8; NAME_RECORD_SIZE]);
        let len = data.len();

        let names = read_name_table(&data, len);
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "Kick_01");
        assert_eq!(names[1].params, [2; 8]);
    }

    #[test]
    fn test_stops_at_blank_name() {
        let data = table(&[record("Pad", [0; 8]), record("        ", [0; 8])]);
        let len = data.len();
        assert_eq!(read_name_table(&data, len).len(), 1);
    }

    #[test]
    fn test_respects_limit() {
        let data = table(&[record("A", [0; 8]), record("B", [0; 8]), record("C", [0; 8])]);
        assert_eq!(read_name_table(&data, name_table_end(2)).len(), 2);
        assert_eq!(read_name_table(&data, name_table_end(2) + 10).len(), 2);
        assert_eq!(read_name_table(&data, usize::MAX).len(), 3);
    }

    #[test]
    fn test_space_padded_names_are_trimmed() {
        let data = table(&[record("Strings Pad     ", [0; 8])]);
        assert_eq!(read_name_table(&data, usize::MAX)[0].name, "Strings Pad");
    }
}
