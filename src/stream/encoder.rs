// In: src/stream/encoder.rs

//! The stream encoder: buffers samples, splits the buffer into coded and
//! literal segments, and writes `marker + payload` pairs in order.

use std::io::Write;

use crate::cache::FrequencyCache;
use crate::config::CodecConfig;
use crate::error::{Result, SpikepackError};
use crate::kernels::marker::{write_end_of_stream, Marker, MARKER_SIZE_BYTES};
use crate::kernels::Packer;
use crate::stream::stats::EncoderStats;
use crate::utils::extend_le_bytes;
use crate::Sample;

//==================================================================================
// 1. Segment Planning Types
//==================================================================================

/// What the encoder decided to emit at one offset of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentPlan {
    /// Coded run: packer and number of samples (a multiple of its group size).
    hits: Option<(Packer, usize)>,
    /// Literal run following the coded run.
    not_hits: usize,
    /// The literal run was forced to break a deadlock.
    forced: bool,
}

impl SegmentPlan {
    fn hits_len(&self) -> usize {
        self.hits.map_or(0, |(_, count)| count)
    }

    fn advance(&self) -> usize {
        self.hits_len() + self.not_hits
    }
}

//==================================================================================
// 2. The Encoder
//==================================================================================

/// Encodes a sample stream into markers and payloads written to `W`.
///
/// Call `finish` once all samples are written; dropping the encoder discards
/// whatever is still buffered.
///
/// Any error while emitting segments poisons the encoder: the writer may hold
/// a marker without its payload and the cache has moved on, so every later
/// `write`, `flush_buffer` or `finish` fails with `EncoderPoisoned`.
pub struct StreamEncoder<W: Write> {
    config: CodecConfig,
    poisoned: bool,
    cache: FrequencyCache,
    buffer: Vec<Sample>,
    writer: W,
    stats: EncoderStats,
    codes: Vec<u8>,
    payload: Vec<u8>,
}

impl<W: Write> StreamEncoder<W> {
    pub fn new(config: CodecConfig, writer: W) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: FrequencyCache::new(config.cache_size),
            buffer: Vec::with_capacity(config.encoded_seq_max_len),
            writer,
            stats: EncoderStats::default(),
            codes: Vec::with_capacity(Packer::Width7.unpacked_len()),
            payload: Vec::new(),
            poisoned: false,
            config,
        })
    }

    /// Buffers one sample, flushing first if the lookahead buffer is full.
    pub fn write(&mut self, sample: Sample) -> Result<()> {
        self.check_usable()?;
        self.stats.num_total_samples += 1;
        if self.buffer.len() >= self.config.encoded_seq_max_len {
            self.flush_buffer()?;
        }
        self.buffer.push(sample);
        Ok(())
    }

    pub fn write_samples(&mut self, samples: &[Sample]) -> Result<()> {
        for &sample in samples {
            self.write(sample)?;
        }
        Ok(())
    }

    /// Emits every buffered sample as a sequence of segments.
    ///
    /// Each iteration emits an optional coded run followed by an optional
    /// literal run and advances by at least one sample.
    pub fn flush_buffer(&mut self) -> Result<()> {
        self.check_usable()?;
        let result = self.flush_segments();
        if let Err(e) = &result {
            log::error!("flush failed, encoder poisoned: {}", e);
            self.poisoned = true;
        }
        result
    }

    /// True once a flush has failed.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn check_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(SpikepackError::EncoderPoisoned);
        }
        Ok(())
    }

    fn flush_segments(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        log::debug!(
            "flushing {} buffered samples (cache {}/{})",
            self.buffer.len(),
            self.cache.len(),
            self.cache.capacity()
        );

        let mut offset = 0;
        while offset < self.buffer.len() {
            let plan = self.plan_segment(offset);
            if plan.advance() == 0 {
                return Err(SpikepackError::InternalInvariantViolation(format!(
                    "segment planning made no progress at offset {} of {}",
                    offset,
                    self.buffer.len()
                )));
            }

            if let Some((packer, count)) = plan.hits {
                self.flush_hits(offset, count, packer)?;
            }
            if plan.not_hits > 0 {
                self.flush_not_hits(offset + plan.hits_len(), plan.not_hits)?;
            }
            if plan.forced {
                self.stats.record_forced(plan.not_hits);
            }

            offset += plan.advance();
        }

        self.buffer.clear();
        self.stats.refresh_ratio();
        Ok(())
    }

    /// Flushes the remaining samples, optionally terminates the stream with the
    /// end-of-stream word, and hands back the writer with the final stats.
    pub fn finish(mut self) -> Result<(W, EncoderStats)> {
        self.flush_buffer()?;
        if self.config.write_end_marker {
            write_end_of_stream(&mut self.writer)?;
            self.stats.num_marker_bytes += MARKER_SIZE_BYTES;
        }
        self.writer.flush()?;
        self.stats.refresh_ratio();
        log::debug!(
            "encoder finished: {} samples, {} bytes",
            self.stats.num_total_samples,
            self.stats.num_bytes_written()
        );
        Ok((self.writer, self.stats))
    }

    pub fn stats(&self) -> EncoderStats {
        let mut stats = self.stats.clone();
        stats.refresh_ratio();
        stats
    }

    pub fn cache(&self) -> &FrequencyCache {
        &self.cache
    }

    /// Samples written but not yet emitted.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    //==============================================================================
    // 3. Planning
    //==============================================================================

    fn plan_segment(&self, offset: usize) -> SegmentPlan {
        let hits = self.count_hits(offset);
        let hits_len = hits.map_or(0, |(_, count)| count);
        let not_hits = self.count_not_hits(offset + hits_len);

        if hits_len == 0 && not_hits == 0 {
            // The next sample is cached, but at a rank no packer can address, or
            // the cached run is shorter than a packed group. Push a short literal
            // run through regardless of cache state to guarantee progress.
            let forced = Packer::Width4
                .unpacked_len()
                .min(self.buffer.len() - offset);
            return SegmentPlan {
                hits: None,
                not_hits: forced,
                forced: true,
            };
        }

        SegmentPlan {
            hits,
            not_hits,
            forced: false,
        }
    }

    /// Finds the cheapest packer for the cached run starting at `offset`.
    ///
    /// For every width, counts the consecutive samples whose current rank fits
    /// that width, rounds down to whole groups, and keeps the candidate with the
    /// lowest bit cost (first one on ties).
    fn count_hits(&self, offset: usize) -> Option<(Packer, usize)> {
        let mut counts = [0usize; Packer::ALL.len()];
        let mut open = [true; Packer::ALL.len()];

        for &sample in &self.buffer[offset..] {
            let Some(rank) = self.cache.index(sample) else {
                break;
            };
            let mut any_open = false;
            for (i, packer) in Packer::ALL.iter().enumerate() {
                if open[i] && rank <= packer.max_key_index() {
                    counts[i] += 1;
                    any_open = true;
                } else {
                    open[i] = false;
                }
            }
            if !any_open {
                break;
            }
        }

        Packer::ALL
            .iter()
            .zip(counts)
            .map(|(&packer, count)| (packer, count - count % packer.unpacked_len()))
            .filter(|&(_, count)| count > 0)
            .min_by_key(|&(packer, count)| count * packer.encoding_size() as usize)
    }

    /// Length of the uncached run starting at `start`, capped at the literal limit.
    fn count_not_hits(&self, start: usize) -> usize {
        self.buffer[start..]
            .iter()
            .take(self.config.not_encoded_seq_max_len)
            .take_while(|&&sample| self.cache.index(sample).is_none())
            .count()
    }

    //==============================================================================
    // 4. Emission
    //==============================================================================

    fn flush_hits(&mut self, offset: usize, count: usize, packer: Packer) -> Result<()> {
        let marker = Marker::coded(count, packer);
        marker.write_to(&mut self.writer)?;
        self.stats.num_marker_bytes += marker.size_bytes();

        self.payload.clear();
        let group_len = packer.unpacked_len();
        for group_start in (offset..offset + count).step_by(group_len) {
            self.codes.clear();
            for i in group_start..group_start + group_len {
                let sample = self.buffer[i];
                let code = self.encode_one(sample, packer)?;
                self.codes.push(code);
            }
            packer.pack_into(&self.codes, &mut self.payload)?;
        }
        self.writer.write_all(&self.payload)?;

        self.stats.record_coded(packer, count, self.payload.len());
        log_metric!(
            "event" = "segment",
            "kind" = "coded",
            "width" = packer,
            "count" = count,
            "bytes" = self.payload.len()
        );
        Ok(())
    }

    fn flush_not_hits(&mut self, offset: usize, count: usize) -> Result<()> {
        let marker = Marker::literal(count);
        marker.write_to(&mut self.writer)?;
        self.stats.num_marker_bytes += marker.size_bytes();

        let run = &self.buffer[offset..offset + count];
        self.payload.clear();
        extend_le_bytes(&mut self.payload, run);
        for &sample in run {
            self.cache.add(sample);
        }
        self.writer.write_all(&self.payload)?;

        self.stats.record_literal(count);
        log_metric!("event" = "segment", "kind" = "literal", "count" = count);
        Ok(())
    }

    /// Looks up the code for `v` and reinforces it in the cache, mirroring the
    /// decoder's resolve-then-add step.
    fn encode_one(&mut self, v: Sample, packer: Packer) -> Result<u8> {
        match self.cache.index(v) {
            Some(rank) if rank <= packer.max_key_index() => {
                self.cache.add(v);
                Ok(rank as u8)
            }
            rank => Err(SpikepackError::InternalInvariantViolation(format!(
                "value {} got index {:?}, out of bound for {} code, expected [0, {}]",
                v,
                rank,
                packer,
                packer.max_key_index()
            ))),
        }
    }
}
