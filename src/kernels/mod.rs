//! This module collects the pure, stateless kernels of the codec: the fixed-width
//! code packers and the run-header (marker) codec.
//!
//! Neither kernel holds state between calls. The stateful parts (the frequency
//! cache and the lookahead buffers) live in `cache` and `stream`.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Bit-Width Reduction: dictionary codes packed 4, 6 or 7 bits wide.
pub mod bitpack;

/// Framing: the 2-byte header in front of every segment.
pub mod marker;

//==================================================================================
// 2. Re-exports
//==================================================================================

pub use bitpack::Packer;
pub use marker::{Marker, RunKind, MARKER_MAX_COUNT};
