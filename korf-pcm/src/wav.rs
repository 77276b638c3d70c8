//! WAV export of extracted samples

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::extract::AudioBuffer;
use crate::{BITS_PER_SAMPLE, CHANNELS};

/// 16-bit mono PCM at the buffer's rate
pub fn wav_spec(audio: &AudioBuffer) -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: audio.sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Write a buffer to a WAV file
pub fn write_wav(path: impl AsRef<Path>, audio: &AudioBuffer) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, wav_spec(audio))?;
    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Encode a buffer as WAV bytes
pub fn encode_wav(audio: &AudioBuffer) -> Result<Vec<u8>, hound::Error> {
    let mut bytes = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), wav_spec(audio))?;
        for &sample in &audio.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone() -> AudioBuffer {
        AudioBuffer {
            samples: vec![0, 1000, -1000, i16::MAX, i16::MIN],
            sample_rate: 22_050,
        }
    }

    #[test]
    fn test_encode_round_trip() {
        let bytes = encode_wav(&tone()).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 22_050);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, tone().samples);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, &tone()).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 5);
        assert_eq!(reader.spec().bits_per_sample, 16);
    }
}
