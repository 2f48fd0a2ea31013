//! Property tests for the codec's public surface.
//!
//! Tests cover:
//! - Lossless roundtrip for arbitrary inputs and configurations
//! - Bounded output size (every flush step makes progress)
//! - Packer and marker roundtrips over their full domains
//! - Agreement between the marker walk and the decoder

use proptest::prelude::*;

use spikepack::bridge::{analyze_stream, decode_samples, encode_samples};
use spikepack::kernels::{Marker, Packer, MARKER_MAX_COUNT};
use spikepack::{CodecConfig, Sample};

fn arb_config() -> impl Strategy<Value = CodecConfig> {
    (1usize..64, 1usize..200, 1usize..20, any::<bool>()).prop_map(
        |(cache_size, encoded_seq_max_len, not_encoded_seq_max_len, write_end_marker)| {
            CodecConfig {
                cache_size,
                encoded_seq_max_len,
                not_encoded_seq_max_len,
                write_end_marker,
            }
        },
    )
}

/// Mostly a small alphabet, so the cache gets hits, with arbitrary outliers.
fn arb_samples() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec(prop_oneof![6 => 0u16..24, 1 => any::<u16>()], 0..800)
}

fn arb_packer() -> impl Strategy<Value = Packer> {
    prop::sample::select(Packer::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_roundtrip_is_lossless(samples in arb_samples(), config in arb_config()) {
        let (bytes, stats) = encode_samples(&samples, &config).unwrap();
        prop_assert_eq!(bytes.len(), stats.num_bytes_written());
        prop_assert_eq!(stats.num_encoded_samples + stats.num_literal_samples, samples.len());

        let decoded = decode_samples(&bytes, &config).unwrap();
        prop_assert_eq!(decoded, samples);
    }

    #[test]
    fn prop_output_size_is_bounded(samples in arb_samples(), config in arb_config()) {
        // Worst case is a one-sample literal run per sample: 2 marker + 2 payload bytes.
        let (bytes, _) = encode_samples(&samples, &config).unwrap();
        let end = if config.write_end_marker { 2 } else { 0 };
        prop_assert!(bytes.len() <= samples.len() * 4 + end);
    }

    #[test]
    fn prop_marker_walk_matches_decoder(samples in arb_samples(), config in arb_config()) {
        let (bytes, stats) = encode_samples(&samples, &config).unwrap();
        let info = analyze_stream(&bytes).unwrap();
        prop_assert_eq!(info.num_samples, samples.len());
        prop_assert_eq!(info.has_end_marker, config.write_end_marker);
        prop_assert_eq!(info.num_samples_by_width, stats.num_samples_by_width);
    }

    #[test]
    fn prop_packer_roundtrip(packer in arb_packer(), seed in prop::collection::vec(any::<u8>(), 8)) {
        let codes: Vec<u8> = seed
            .iter()
            .take(packer.unpacked_len())
            .map(|&v| v & packer.max_key_index() as u8)
            .collect();

        let mut packed = Vec::new();
        packer.pack_into(&codes, &mut packed).unwrap();
        prop_assert_eq!(packed.len(), packer.packed_len());

        let mut unpacked = Vec::new();
        packer.unpack_into(&packed, &mut unpacked).unwrap();
        prop_assert_eq!(unpacked, codes);
    }

    #[test]
    fn prop_marker_roundtrip(
        count in 1usize..=MARKER_MAX_COUNT,
        packer in arb_packer(),
        literal in any::<bool>()
    ) {
        let marker = if literal { Marker::literal(count) } else { Marker::coded(count, packer) };
        let bytes = marker.marshal().unwrap();
        prop_assert_ne!(bytes, [0, 0]);
        prop_assert_eq!(Marker::unmarshal(bytes).unwrap(), Some(marker));
    }
}
