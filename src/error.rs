// In: src/error.rs

//! This module defines the single, unified error type for the entire spikepack library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

/// Convenience alias used by every fallible function in the crate.
pub type Result<T, E = SpikepackError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum SpikepackError {
    // =========================================================================
    // === Wire Format Errors (caller errors at encode time, corruption at decode time)
    // =========================================================================
    #[error("Malformed marker: {0}")]
    MalformedMarker(String),

    #[error("Marker count {count} is out of bounds, expected at most {max}")]
    MarkerCountOutOfRange { count: usize, max: usize },

    #[error("Unsupported encoding size {0}, expected one of 4, 6, 7")]
    UnsupportedEncodingSize(u8),

    /// The source ended in the middle of a marker, a payload or a sample.
    /// A clean end at a segment boundary is not an error.
    #[error("Truncated stream: unexpected end of input while reading {context}")]
    TruncatedStream { context: &'static str },

    // =========================================================================
    // === Internal Invariants (encoder/decoder divergence, never user input)
    // =========================================================================
    #[error("Internal invariant violated (this is a bug or a desynchronized stream): {0}")]
    InternalInvariantViolation(String),

    /// An earlier flush failed part-way; the bytes already written cannot be
    /// continued into a decodable stream.
    #[error("Encoder is unusable after a failed flush")]
    EncoderPoisoned,

    // =========================================================================
    // === Low-Level Kernel Errors
    // =========================================================================
    #[error("Buffer length mismatch: expected {0}, got {1}")]
    BufferMismatch(usize, usize),

    #[error("Bitpack encoding error: value {0} exceeds bit width {1}")]
    BitpackEncodeError(u64, u8),

    // =========================================================================
    // === Configuration & Container Errors
    // =========================================================================
    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid WAV container: {0}")]
    ContainerFormat(String),

    #[error("Unsupported WAV stream: {0}")]
    UnsupportedContainer(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config loading.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl SpikepackError {
    /// True for errors that indicate encoder/decoder logic divergence rather
    /// than bad input or a failing stream.
    pub fn is_internal(&self) -> bool {
        matches!(self, SpikepackError::InternalInvariantViolation(_))
    }
}
