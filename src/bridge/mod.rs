// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` connects the raw sample codec in `stream` to the outside world.
// The stream layer knows nothing about files; the bridge knows nothing about
// caches or packers.
//
// Data Flow (Encoding):
//
//   1. [WAV Container (wav::WavReader)]     -> Reads and validates the 44-byte header
//         |
//         `-> header is copied to the output unchanged
//
//   2. [Stateless API (encode_wav)]         -> Feeds each sample to a `StreamEncoder`
//         |
//         `-> the encoder writes markers + payloads right behind the header
//
// Data Flow (Decoding):
//
//   1. [Stateless API (decode_wav)]         -> Reads the header, validates it, copies it
//         |
//         `-> a `StreamDecoder` reads the rest of the input
//
//   2. [WAV Container (wav::WavWriter)]     -> Writes each decoded sample
//
// `format::StreamInfo` summarizes an encoded stream from its markers alone.
//
// ====================================================================================
pub mod format;
pub mod stateless_api;
pub mod wav;

pub use format::StreamInfo;
pub use stateless_api::{analyze_stream, decode_samples, decode_wav, encode_samples, encode_wav};
pub use wav::{WavHeader, WavReader, WavWriter, WAV_HEADER_SIZE_BYTES};
