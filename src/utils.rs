//! This module provides a set of shared, low-level I/O helpers used by the
//! marker codec, the stream decoder and the WAV container reader.
//!
//! Their single job is to tell a clean end of input (nothing left at a record
//! boundary) apart from a truncated record (input ended part-way through).

use std::io::{ErrorKind, Read};

use crate::error::{Result, SpikepackError};
use crate::Sample;

//==================================================================================
// 1. Boundary-Aware Reads
//==================================================================================

/// Fills `buf` completely, or reports a clean end of input.
///
/// # Returns
/// `Ok(true)` when `buf` was filled, `Ok(false)` when the reader was already
/// exhausted before the first byte.
///
/// # Errors
/// `TruncatedStream` if the reader ends after some but not all bytes of `buf`;
/// any other I/O error is propagated unchanged.
pub fn read_exact_or_eof<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 if !buf.is_empty() => Ok(false),
        n if n == buf.len() => Ok(true),
        _ => Err(SpikepackError::TruncatedStream { context }),
    }
}

/// Fills `buf` completely; any end of input is a truncated stream.
pub fn read_exact_or_truncated<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => SpikepackError::TruncatedStream { context },
        _ => SpikepackError::Io(e),
    })
}

//==================================================================================
// 2. Sample Conversions
//==================================================================================

/// Appends samples to `out` as little-endian bytes.
pub fn extend_le_bytes(out: &mut Vec<u8>, samples: &[Sample]) {
    out.reserve(samples.len() * 2);
    for &s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
}

/// Iterates the little-endian samples held in `bytes`.
///
/// # Errors
/// Returns `BufferMismatch` if the byte count is odd.
pub fn le_samples(bytes: &[u8]) -> Result<impl Iterator<Item = Sample> + '_> {
    if bytes.len() % 2 != 0 {
        return Err(SpikepackError::BufferMismatch(bytes.len() + 1, bytes.len()));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| Sample::from_le_bytes([pair[0], pair[1]])))
}
