// In: src/stream/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Stream Layer
// ====================================================================================
//
// The stream layer is the codec proper. Both sides own a `FrequencyCache` built
// from the same `CodecConfig` and keep it in lockstep by applying the same
// sequence of `add` calls.
//
// Encoding:
//
//   write(sample) -> [lookahead buffer] --full or finish()--> flush_buffer()
//                                                                  |
//        for each offset: plan_segment() -> coded run? + literal run? (or forced literal)
//                                                                  |
//                              marker (2 bytes) + packed ranks | raw samples -> W
//
// Decoding:
//
//   R -> marker -> coded: unpack ranks, resolve each through the cache, add it
//               -> literal: read raw samples, add each
//               -> end of input / zero word: stream finished
//
// ====================================================================================
pub mod decoder;
pub mod encoder;
pub mod stats;

pub use decoder::StreamDecoder;
pub use encoder::StreamEncoder;
pub use stats::{DecoderStats, EncoderStats, WidthCounts};
