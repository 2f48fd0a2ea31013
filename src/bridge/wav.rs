// In: src/bridge/wav.rs

//! Canonical 44-byte RIFF/WAVE header plus sample-level reader and writer.
//!
//! Only the canonical layout is understood: a `fmt ` chunk of PCM parameters
//! directly followed by the `data` chunk. Extension chunks are rejected as a
//! container format error rather than skipped.

use std::io::{Read, Write};

use serde::Serialize;

use crate::error::{Result, SpikepackError};
use crate::utils::{read_exact_or_eof, read_exact_or_truncated};
use crate::Sample;

//==================================================================================
// 1. Header
//==================================================================================

pub const WAV_HEADER_SIZE_BYTES: usize = 44;

const RIFF_TAG: [u8; 4] = *b"RIFF";
const WAVE_TAG: [u8; 4] = *b"WAVE";
const FMT_TAG: [u8; 4] = *b"fmt ";
const DATA_TAG: [u8; 4] = *b"data";

const AUDIO_FORMAT_PCM: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavHeader {
    pub chunk_size: u32,
    pub fmt_chunk_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// A header for mono 16-bit PCM holding `num_samples` samples.
    ///
    /// # Errors
    /// `ContainerFormat` if the data size or byte rate does not fit the
    /// header's 32-bit fields.
    pub fn mono_pcm16(sample_rate: u32, num_samples: usize) -> Result<Self> {
        let too_large = |what: &str| {
            SpikepackError::ContainerFormat(format!("{} too large for a WAV header", what))
        };
        let data_size = u32::try_from(num_samples)
            .ok()
            .and_then(|n| n.checked_mul(2))
            .ok_or_else(|| too_large("sample count"))?;
        let chunk_size = data_size
            .checked_add(36)
            .ok_or_else(|| too_large("sample count"))?;
        let byte_rate = sample_rate
            .checked_mul(2)
            .ok_or_else(|| too_large("sample rate"))?;

        Ok(Self {
            chunk_size,
            fmt_chunk_size: 16,
            audio_format: AUDIO_FORMAT_PCM,
            num_channels: 1,
            sample_rate,
            byte_rate,
            block_align: 2,
            bits_per_sample: 16,
            data_size,
        })
    }

    pub fn is_pcm(&self) -> bool {
        self.audio_format == AUDIO_FORMAT_PCM
    }

    /// Checks that the samples are exactly what the codec handles.
    pub fn validate_for_codec(&self) -> Result<()> {
        if !self.is_pcm() {
            return Err(SpikepackError::UnsupportedContainer(format!(
                "PCM required, got audio format {}",
                self.audio_format
            )));
        }
        if self.num_channels != 1 {
            return Err(SpikepackError::UnsupportedContainer(format!(
                "single channel required, got {}",
                self.num_channels
            )));
        }
        if self.bits_per_sample != 16 {
            return Err(SpikepackError::UnsupportedContainer(format!(
                "16 bits per sample required, got {}",
                self.bits_per_sample
            )));
        }
        if self.block_align != 2 {
            return Err(SpikepackError::UnsupportedContainer(format!(
                "block align 2 required for 16-bit mono, got {}",
                self.block_align
            )));
        }
        Ok(())
    }

    /// Number of samples announced by the `data` chunk.
    pub fn num_samples(&self) -> usize {
        self.data_size as usize / 2
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE_BYTES] {
        let mut out = [0u8; WAV_HEADER_SIZE_BYTES];
        out[0..4].copy_from_slice(&RIFF_TAG);
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(&WAVE_TAG);
        out[12..16].copy_from_slice(&FMT_TAG);
        out[16..20].copy_from_slice(&self.fmt_chunk_size.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(&DATA_TAG);
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; WAV_HEADER_SIZE_BYTES]) -> Result<Self> {
        check_tag(bytes, 0, RIFF_TAG, "chunk ID")?;
        check_tag(bytes, 8, WAVE_TAG, "format")?;
        check_tag(bytes, 12, FMT_TAG, "subchunk1 ID")?;
        check_tag(bytes, 36, DATA_TAG, "subchunk2 ID")?;

        Ok(Self {
            chunk_size: le_u32(bytes, 4),
            fmt_chunk_size: le_u32(bytes, 16),
            audio_format: le_u16(bytes, 20),
            num_channels: le_u16(bytes, 22),
            sample_rate: le_u32(bytes, 24),
            byte_rate: le_u32(bytes, 28),
            block_align: le_u16(bytes, 32),
            bits_per_sample: le_u16(bytes, 34),
            data_size: le_u32(bytes, 40),
        })
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; WAV_HEADER_SIZE_BYTES];
        read_exact_or_truncated(reader, &mut bytes, "wav header")?;
        Self::from_bytes(&bytes)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }
}

fn check_tag(bytes: &[u8], at: usize, expected: [u8; 4], what: &str) -> Result<()> {
    let found = &bytes[at..at + 4];
    if found != expected {
        return Err(SpikepackError::ContainerFormat(format!(
            "invalid {}: ({}) != {}",
            what,
            String::from_utf8_lossy(found),
            String::from_utf8_lossy(&expected).trim_end()
        )));
    }
    Ok(())
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

//==================================================================================
// 2. Sample Reader / Writer
//==================================================================================

/// Reads the header, then hands out little-endian samples one at a time.
pub struct WavReader<R: Read> {
    header: WavHeader,
    reader: R,
}

impl<R: Read> WavReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let header = WavHeader::read_from(&mut reader)?;
        Ok(Self { header, reader })
    }

    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    /// The next sample, `None` at the end of input. The `data` size in the
    /// header is informational only; samples are read until the input ends.
    pub fn next_sample(&mut self) -> Result<Option<Sample>> {
        let mut bytes = [0u8; 2];
        if !read_exact_or_eof(&mut self.reader, &mut bytes, "wav sample")? {
            return Ok(None);
        }
        Ok(Some(Sample::from_le_bytes(bytes)))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for WavReader<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sample().transpose()
    }
}

pub struct WavWriter<W: Write> {
    header: WavHeader,
    writer: W,
}

impl<W: Write> WavWriter<W> {
    pub fn new(header: WavHeader, writer: W) -> Self {
        Self { header, writer }
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.header.write_to(&mut self.writer)
    }

    pub fn write_sample(&mut self, sample: Sample) -> Result<()> {
        self.writer.write_all(&sample.to_le_bytes())?;
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_layout() {
        let header = WavHeader::mono_pcm16(19_531, 3).unwrap();
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[4..8], &42u32.to_le_bytes());
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[20..22], &[1, 0]);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(&bytes[40..44], &6u32.to_le_bytes());
        assert_eq!(WavHeader::from_bytes(&bytes).unwrap(), header);
        assert_eq!(header.num_samples(), 3);
        header.validate_for_codec().unwrap();
    }

    #[test]
    fn test_oversized_header_fields_rejected() {
        // 2^31 samples need a 2^32-byte data chunk.
        for (rate, n) in [(8_000, 1usize << 31), (8_000, usize::MAX), (u32::MAX, 1)] {
            assert!(matches!(
                WavHeader::mono_pcm16(rate, n),
                Err(SpikepackError::ContainerFormat(_))
            ));
        }

        // The largest count whose chunk size still fits.
        let n = (u32::MAX as usize - 36) / 2;
        let header = WavHeader::mono_pcm16(8_000, n).unwrap();
        assert_eq!(header.chunk_size, u32::MAX - 1);
        assert_eq!(header.num_samples(), n);
    }

    #[test]
    fn test_bad_tags_are_container_errors() {
        let mut bytes = WavHeader::mono_pcm16(8_000, 0).unwrap().to_bytes();
        bytes[8..12].copy_from_slice(b"AVI ");
        let err = WavHeader::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, SpikepackError::ContainerFormat(_)));
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_validate_rejects_unsupported_layouts() {
        let base = WavHeader::mono_pcm16(8_000, 0).unwrap();
        for header in [
            WavHeader { audio_format: 3, ..base },
            WavHeader { num_channels: 2, ..base },
            WavHeader { bits_per_sample: 8, ..base },
            WavHeader { block_align: 4, ..base },
        ] {
            assert!(matches!(
                header.validate_for_codec(),
                Err(SpikepackError::UnsupportedContainer(_))
            ));
        }
    }

    #[test]
    fn test_reader_writer_roundtrip() {
        let header = WavHeader::mono_pcm16(8_000, 3).unwrap();
        let mut writer = WavWriter::new(header, Vec::new());
        writer.write_header().unwrap();
        for s in [1u16, 0x8000, 0xFFFF] {
            writer.write_sample(s).unwrap();
        }
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_SIZE_BYTES + 6);

        let reader = WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(*reader.header(), header);
        let samples: Vec<Sample> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(samples, vec![1, 0x8000, 0xFFFF]);
    }

    #[test]
    fn test_short_input() {
        let err = WavReader::new(Cursor::new(vec![0u8; 10])).err().unwrap();
        assert!(matches!(err, SpikepackError::TruncatedStream { context: "wav header" }));

        let mut bytes = WavHeader::mono_pcm16(8_000, 1).unwrap().to_bytes().to_vec();
        bytes.push(0x42);
        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            reader.next_sample(),
            Err(SpikepackError::TruncatedStream { .. })
        ));
    }
}
