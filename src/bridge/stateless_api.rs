// In: src/bridge/stateless_api.rs

use std::io::{Read, Write};

use crate::bridge::format::StreamInfo;
use crate::bridge::wav::{WavHeader, WavReader, WavWriter};
use crate::config::CodecConfig;
use crate::error::Result;
use crate::stream::{DecoderStats, EncoderStats, StreamDecoder, StreamEncoder};
use crate::Sample;

/// Encodes a complete sample buffer in one call.
pub fn encode_samples(
    samples: &[Sample],
    config: &CodecConfig,
) -> Result<(Vec<u8>, EncoderStats)> {
    let mut encoder = StreamEncoder::new(config.clone(), Vec::with_capacity(samples.len()))?;
    encoder.write_samples(samples)?;
    encoder.finish()
}

/// Decodes a complete encoded buffer in one call.
pub fn decode_samples(bytes: &[u8], config: &CodecConfig) -> Result<Vec<Sample>> {
    StreamDecoder::new(config.clone(), bytes)?.collect()
}

/// Copies the WAV header from `input` to `output` unchanged, then encodes the
/// sample data behind it.
///
/// # Errors
/// Header errors (`ContainerFormat`, `UnsupportedContainer`) are reported
/// before anything is written.
pub fn encode_wav<R: Read, W: Write>(
    input: R,
    output: &mut W,
    config: &CodecConfig,
) -> Result<EncoderStats> {
    let mut reader = WavReader::new(input)?;
    reader.header().validate_for_codec()?;
    log::info!(
        "encoding wav: {} Hz, {} samples announced",
        reader.header().sample_rate,
        reader.header().num_samples()
    );

    reader.header().write_to(output)?;
    let mut encoder = StreamEncoder::new(config.clone(), &mut *output)?;
    while let Some(sample) = reader.next_sample()? {
        encoder.write(sample)?;
    }
    let (_, stats) = encoder.finish()?;
    Ok(stats)
}

/// Inverse of `encode_wav`: copies the header, then decodes the samples.
pub fn decode_wav<R: Read, W: Write>(
    mut input: R,
    output: &mut W,
    config: &CodecConfig,
) -> Result<DecoderStats> {
    let header = WavHeader::read_from(&mut input)?;
    header.validate_for_codec()?;

    let mut writer = WavWriter::new(header, &mut *output);
    writer.write_header()?;

    let mut decoder = StreamDecoder::new(config.clone(), input)?;
    while let Some(sample) = decoder.next_sample()? {
        writer.write_sample(sample)?;
    }
    writer.into_inner()?;

    let stats = decoder.stats();
    if stats.num_decoded_samples != header.num_samples() {
        log::warn!(
            "decoded {} samples, header announced {}",
            stats.num_decoded_samples,
            header.num_samples()
        );
    }
    Ok(stats)
}

/// Summarizes an encoded stream (no WAV header) without decoding it.
pub fn analyze_stream(bytes: &[u8]) -> Result<StreamInfo> {
    StreamInfo::scan(bytes)
}
