//! Running counters kept by the encoder and decoder.
//!
//! None of these values feed back into coding decisions; they exist for the
//! final report the CLI logs and for tests that pin down segment decisions.

use serde::Serialize;

use crate::kernels::Packer;

/// Samples written per code width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidthCounts {
    pub width4: usize,
    pub width6: usize,
    pub width7: usize,
}

impl WidthCounts {
    pub fn get(&self, packer: Packer) -> usize {
        match packer {
            Packer::Width4 => self.width4,
            Packer::Width6 => self.width6,
            Packer::Width7 => self.width7,
        }
    }

    pub(crate) fn add(&mut self, packer: Packer, n: usize) {
        match packer {
            Packer::Width4 => self.width4 += n,
            Packer::Width6 => self.width6 += n,
            Packer::Width7 => self.width7 += n,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncoderStats {
    /// Samples accepted by `write`.
    pub num_total_samples: usize,
    /// Samples emitted as dictionary codes.
    pub num_encoded_samples: usize,
    /// Samples emitted verbatim.
    pub num_literal_samples: usize,
    /// Fraction of emitted samples that were coded.
    pub ratio_encoded_samples: f32,
    pub num_marker_bytes: usize,
    pub num_payload_bytes: usize,
    pub max_len_hits_advanced: usize,
    pub max_len_not_hits_advanced: usize,
    pub num_hits_advanced: usize,
    pub num_not_hits_advanced: usize,
    /// Literal runs emitted only to break an encoding deadlock.
    pub num_forced_unpacked: usize,
    pub num_samples_forced_unpacked: usize,
    pub num_samples_by_width: WidthCounts,
}

impl EncoderStats {
    pub(crate) fn record_coded(&mut self, packer: Packer, count: usize, payload_bytes: usize) {
        self.num_encoded_samples += count;
        self.num_payload_bytes += payload_bytes;
        self.num_hits_advanced += 1;
        self.max_len_hits_advanced = self.max_len_hits_advanced.max(count);
        self.num_samples_by_width.add(packer, count);
    }

    pub(crate) fn record_literal(&mut self, count: usize) {
        self.num_literal_samples += count;
        self.num_payload_bytes += count * 2;
        self.num_not_hits_advanced += 1;
        self.max_len_not_hits_advanced = self.max_len_not_hits_advanced.max(count);
    }

    pub(crate) fn record_forced(&mut self, count: usize) {
        self.num_forced_unpacked += 1;
        self.num_samples_forced_unpacked += count;
    }

    pub(crate) fn refresh_ratio(&mut self) {
        let emitted = self.num_encoded_samples + self.num_literal_samples;
        if emitted > 0 {
            self.ratio_encoded_samples = self.num_encoded_samples as f32 / emitted as f32;
        }
    }

    /// Total bytes written for the segments so far.
    pub fn num_bytes_written(&self) -> usize {
        self.num_marker_bytes + self.num_payload_bytes
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    pub num_coded_segments: usize,
    pub num_literal_segments: usize,
    pub num_encoded_samples: usize,
    pub num_literal_samples: usize,
    /// Samples handed out by `next_sample`.
    pub num_decoded_samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_stats_accumulate() {
        let mut stats = EncoderStats::default();
        stats.record_literal(8);
        stats.record_coded(Packer::Width4, 192, 96);
        stats.record_coded(Packer::Width7, 16, 14);
        stats.record_forced(2);
        stats.record_literal(2);
        stats.refresh_ratio();

        assert_eq!(stats.num_encoded_samples, 208);
        assert_eq!(stats.num_literal_samples, 10);
        assert_eq!(stats.max_len_hits_advanced, 192);
        assert_eq!(stats.max_len_not_hits_advanced, 8);
        assert_eq!(stats.num_samples_by_width.get(Packer::Width4), 192);
        assert_eq!(stats.num_samples_by_width.get(Packer::Width6), 0);
        assert_eq!(stats.num_samples_by_width.get(Packer::Width7), 16);
        assert_eq!(stats.num_payload_bytes, 96 + 14 + 20);
        assert!((stats.ratio_encoded_samples - 208.0 / 218.0).abs() < 1e-6);
    }

    #[test]
    fn test_stats_serialize_to_json() {
        let stats = EncoderStats::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"num_forced_unpacked\":0"));
        assert!(json.contains("\"width7\":0"));
    }
}
