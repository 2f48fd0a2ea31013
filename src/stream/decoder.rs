// In: src/stream/decoder.rs

//! The stream decoder: the exact mirror of `StreamEncoder`.
//!
//! It reads one segment at a time, replays the encoder's cache updates in the
//! same order, and hands samples out one by one.

use std::io::Read;

use crate::cache::FrequencyCache;
use crate::config::CodecConfig;
use crate::error::Result;
use crate::kernels::marker::{Marker, RunKind};
use crate::kernels::Packer;
use crate::stream::stats::DecoderStats;
use crate::utils::{le_samples, read_exact_or_truncated};
use crate::Sample;

/// Decodes samples from a stream produced by `StreamEncoder`.
pub struct StreamDecoder<R: Read> {
    cache: FrequencyCache,
    reader: R,
    /// Decoded samples of the current segment, last sample first.
    pending: Vec<Sample>,
    stats: DecoderStats,
    finished: bool,
    bytes: Vec<u8>,
    codes: Vec<u8>,
}

impl<R: Read> StreamDecoder<R> {
    pub fn new(config: CodecConfig, reader: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: FrequencyCache::new(config.cache_size),
            reader,
            pending: Vec::new(),
            stats: DecoderStats::default(),
            finished: false,
            bytes: Vec::new(),
            codes: Vec::new(),
        })
    }

    /// Returns the next sample, or `Ok(None)` once the stream has ended.
    ///
    /// After an error the decoder is finished: the stream position is unknown,
    /// so no further samples are produced.
    pub fn next_sample(&mut self) -> Result<Option<Sample>> {
        while self.pending.is_empty() {
            if self.finished {
                return Ok(None);
            }
            match self.read_into_buffer() {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!(
                        "decoder reached end of stream after {} samples",
                        self.stats.num_decoded_samples
                    );
                    self.finished = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }

        let sample = self.pending.pop();
        if sample.is_some() {
            self.stats.num_decoded_samples += 1;
        }
        Ok(sample)
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats.clone()
    }

    pub fn cache(&self) -> &FrequencyCache {
        &self.cache
    }

    /// Reads one marker and its payload into `pending`.
    /// Returns `false` at a clean end of stream.
    fn read_into_buffer(&mut self) -> Result<bool> {
        let Some(marker) = Marker::read_from(&mut self.reader)? else {
            return Ok(false);
        };

        match marker.kind {
            RunKind::Coded(packer) => self.read_encoded(marker.count, packer)?,
            RunKind::Literal => self.read_not_encoded(marker.count)?,
        }
        log_metric!(
            "event" = "segment",
            "coded" = marker.is_encoded(),
            "count" = marker.count
        );

        // Samples were pushed in stream order; flip so `pop` yields them in order.
        self.pending.reverse();
        Ok(true)
    }

    fn read_not_encoded(&mut self, count: usize) -> Result<()> {
        self.bytes.resize(count * 2, 0);
        read_exact_or_truncated(&mut self.reader, &mut self.bytes, "literal payload")?;

        for sample in le_samples(&self.bytes)? {
            self.cache.add(sample);
            self.pending.push(sample);
        }

        self.stats.num_literal_segments += 1;
        self.stats.num_literal_samples += count;
        Ok(())
    }

    fn read_encoded(&mut self, count: usize, packer: Packer) -> Result<()> {
        let groups = count.div_ceil(packer.unpacked_len());
        self.bytes.resize(groups * packer.packed_len(), 0);
        read_exact_or_truncated(&mut self.reader, &mut self.bytes, "coded payload")?;

        self.codes.clear();
        for group in self.bytes.chunks_exact(packer.packed_len()) {
            packer.unpack_into(group, &mut self.codes)?;
        }

        // A trailing partial group carries padding codes past `count`; skip them.
        for &rank in self.codes.iter().take(count) {
            let sample = self.cache.at(rank as usize)?;
            self.cache.add(sample);
            self.pending.push(sample);
        }

        self.stats.num_coded_segments += 1;
        self.stats.num_encoded_samples += count;
        Ok(())
    }
}

impl<R: Read> Iterator for StreamDecoder<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_sample().transpose()
    }
}
