//! KORF container writer
//!
//! Builds containers in the layout [`crate::parse_container`] reads: signature,
//! name table, sample blocks, footer. Used for test fixtures and by the
//! `korf fixture` command.

use crate::{
    CONTAINER_MAGIC, FOOTER_BEGIN, FOOTER_END, NAME_FIELD_SIZE, NAME_TABLE_OFFSET,
    PARAM_BLOCK_SIZE, SAMPLE_HEADER_SIZE, SAMPLE_RATE_OFFSET,
};

#[derive(Debug, Clone)]
struct PendingSample {
    name: String,
    sample_rate: u16,
    params: [u8; PARAM_BLOCK_SIZE],
    /// Big-endian audio bytes as they appear in the container
    audio: Vec<u8>,
}

/// Container writer for generating KORF sample containers
#[derive(Debug, Clone, Default)]
pub struct ContainerWriter {
    samples: Vec<PendingSample>,
    data_offset: Option<usize>,
    count_prefix: bool,
}

impl ContainerWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample with 16-bit PCM and a raw header rate (0 = default rate)
    /// Returns the 0-based sample index
    pub fn add_sample(&mut self, name: &str, sample_rate: u16, pcm: &[i16]) -> usize {
        self.add_sample_with_params(name, sample_rate, [0; PARAM_BLOCK_SIZE], pcm)
    }

    /// Add a sample with an explicit parameter block
    /// Returns the 0-based sample index
    pub fn add_sample_with_params(
        &mut self,
        name: &str,
        sample_rate: u16,
        params: [u8; PARAM_BLOCK_SIZE],
        pcm: &[i16],
    ) -> usize {
        let audio = pcm.iter().flat_map(|s| s.to_be_bytes()).collect();
        self.push(name, sample_rate, params, audio)
    }

    /// Add a sample whose audio bytes are written verbatim
    /// Returns the 0-based sample index
    pub fn add_raw_sample(&mut self, name: &str, sample_rate: u16, audio: &[u8]) -> usize {
        self.push(name, sample_rate, [0; PARAM_BLOCK_SIZE], audio.to_vec())
    }

    /// Place the first sample block at `offset`, zero filling after the name table
    ///
    /// Ignored if the name table would not fit before it.
    pub fn set_data_offset(&mut self, offset: usize) {
        self.data_offset = Some(offset);
    }

    /// Write the offset count as the first footer word
    pub fn set_count_prefix(&mut self, enabled: bool) {
        self.count_prefix = enabled;
    }

    /// Number of samples added
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples were added
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Serialize the container
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        // Signature and unused header area
        out.extend_from_slice(CONTAINER_MAGIC);
        out.resize(NAME_TABLE_OFFSET, 0);

        for sample in &self.samples {
            write_name(&mut out, &sample.name);
            out.extend_from_slice(&sample.params);
        }

        if let Some(offset) = self.data_offset
            && offset > out.len()
        {
            out.resize(offset, 0);
        }

        let mut offsets = Vec::with_capacity(self.samples.len());
        for sample in &self.samples {
            let block = out.len();
            offsets.push(block as u32);

            let mut header = [0u8; SAMPLE_HEADER_SIZE];
            header[SAMPLE_RATE_OFFSET..SAMPLE_RATE_OFFSET + 2]
                .copy_from_slice(&sample.sample_rate.to_be_bytes());
            out.extend_from_slice(&header);
            out.extend_from_slice(&sample.audio);
        }

        out.extend_from_slice(FOOTER_BEGIN);
        if self.count_prefix {
            out.extend_from_slice(&(offsets.len() as u32).to_be_bytes());
        }
        for offset in offsets {
            out.extend_from_slice(&offset.to_be_bytes());
        }
        out.extend_from_slice(FOOTER_END);

        out
    }

    fn push(
        &mut self,
        name: &str,
        sample_rate: u16,
        params: [u8; PARAM_BLOCK_SIZE],
        audio: Vec<u8>,
    ) -> usize {
        self.samples.push(PendingSample {
            name: name.to_string(),
            sample_rate,
            params,
            audio,
        });
        self.samples.len() - 1
    }
}

/// Write a name field, space padded and truncated to the field size
fn write_name(out: &mut Vec<u8>, name: &str) {
    let mut field = [b' '; NAME_FIELD_SIZE];
    for (dst, b) in field.iter_mut().zip(name.bytes()) {
        *dst = if b.is_ascii() && !b.is_ascii_control() { b } else { b'?' };
    }
    out.extend_from_slice(&field);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NAME_RECORD_SIZE;

    #[test]
    fn test_layout() {
        let mut writer = ContainerWriter::new();
        assert_eq!(writer.add_sample("Kick", 44_100, &[1, -1]), 0);
        let data = writer.to_bytes();

        assert_eq!(&data[..4], CONTAINER_MAGIC);
        assert_eq!(&data[0x24..0x28], b"Kick");
        assert_eq!(data[0x28], b' ');

        let block = NAME_TABLE_OFFSET + NAME_RECORD_SIZE;
        assert_eq!(
            &data[block + SAMPLE_RATE_OFFSET..block + SAMPLE_RATE_OFFSET + 2],
            &44_100u16.to_be_bytes()
        );
        let audio = block + SAMPLE_HEADER_SIZE;
        assert_eq!(&data[audio..audio + 4], &[0x00, 0x01, 0xFF, 0xFF]);
        assert_eq!(&data[audio + 4..audio + 8], FOOTER_BEGIN);
        assert_eq!(&data[audio + 8..audio + 12], &(block as u32).to_be_bytes());
        assert_eq!(&data[data.len() - 4..], FOOTER_END);
    }

    #[test]
    fn test_data_offset_pads() {
        let mut writer = ContainerWriter::new();
        writer.add_sample("Pad", 0, &[0; 4]);
        writer.set_data_offset(0x100);
        let data = writer.to_bytes();
        assert_eq!(&data[0x100 + SAMPLE_HEADER_SIZE + 8..0x100 + SAMPLE_HEADER_SIZE + 12], FOOTER_BEGIN);
        assert!(data[NAME_TABLE_OFFSET + NAME_RECORD_SIZE..0x100].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let mut writer = ContainerWriter::new();
        writer.add_sample("A very long sample name", 0, &[]);
        let data = writer.to_bytes();
        assert_eq!(&data[0x24..0x34], b"A very long samp");
    }
}
