//! This module contains the run header ("marker") codec.
//!
//! Every segment on the wire starts with one little-endian 16-bit word:
//!
//! ```text
//!  15                              2  1  0
//! +----------------------------------+-----+
//! | count (14-bit two's complement)  | sel |
//! +----------------------------------+-----+
//! ```
//!
//! A non-negative count announces a coded run packed with the width named by
//! `sel` (`00` = 4, `01` = 6, `10` = 7). A negative count announces a literal run
//! of `|count|` raw samples and leaves `sel` at zero. The all-zero word is
//! reserved for end-of-stream.

use std::io::{Read, Write};

use crate::error::{Result, SpikepackError};
use crate::kernels::bitpack::Packer;
use crate::utils::read_exact_or_eof;

//==================================================================================
// Format Constants
//==================================================================================

/// Size of a marker on the wire.
pub const MARKER_SIZE_BYTES: usize = 2;

/// Largest run length a marker can carry. The count field is a 14-bit signed
/// integer, and literal runs need the negative side, so runs stop at 2^13 - 1.
pub const MARKER_MAX_COUNT: usize = (1 << 13) - 1;

/// The reserved end-of-stream word.
pub const END_OF_STREAM: u16 = 0;

const SELECTOR_MASK: u16 = 0b11;

//==================================================================================
// Public Structs
//==================================================================================

/// What follows a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Cache ranks packed with the given packer.
    Coded(Packer),
    /// Raw little-endian samples.
    Literal,
}

/// One run header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub count: usize,
    pub kind: RunKind,
}

//==================================================================================
// Core Implementation
//==================================================================================

impl Marker {
    pub fn coded(count: usize, packer: Packer) -> Self {
        Self { count, kind: RunKind::Coded(packer) }
    }

    pub fn literal(count: usize) -> Self {
        Self { count, kind: RunKind::Literal }
    }

    pub fn is_encoded(&self) -> bool {
        matches!(self.kind, RunKind::Coded(_))
    }

    /// The code width for coded runs, `None` for literal runs.
    pub fn encoding_size(&self) -> Option<u8> {
        match self.kind {
            RunKind::Coded(packer) => Some(packer.encoding_size()),
            RunKind::Literal => None,
        }
    }

    pub fn size_bytes(&self) -> usize {
        MARKER_SIZE_BYTES
    }

    /// Number of payload bytes that follow this marker on the wire.
    pub fn payload_len(&self) -> usize {
        match self.kind {
            RunKind::Coded(packer) => {
                self.count.div_ceil(packer.unpacked_len()) * packer.packed_len()
            }
            RunKind::Literal => self.count * 2,
        }
    }

    /// Serializes the marker into its 2-byte little-endian wire form.
    pub fn marshal(&self) -> Result<[u8; MARKER_SIZE_BYTES]> {
        if self.count > MARKER_MAX_COUNT {
            return Err(SpikepackError::MarkerCountOutOfRange {
                count: self.count,
                max: MARKER_MAX_COUNT,
            });
        }
        if self.count == 0 {
            return Err(SpikepackError::MalformedMarker(
                "zero-length runs collide with the end-of-stream word".to_string(),
            ));
        }

        // count fits in 13 bits, so the i16 conversion and negation are exact.
        let count = self.count as i16;
        let (signed, selector) = match self.kind {
            RunKind::Coded(packer) => (count, selector_of(packer)),
            RunKind::Literal => (-count, 0),
        };
        let word = ((signed as u16) << 2) | selector;
        Ok(word.to_le_bytes())
    }

    /// Parses a 2-byte wire word. Returns `Ok(None)` for the end-of-stream word.
    pub fn unmarshal(bytes: [u8; MARKER_SIZE_BYTES]) -> Result<Option<Marker>> {
        let word = u16::from_le_bytes(bytes);
        if word == END_OF_STREAM {
            return Ok(None);
        }

        let selector = word & SELECTOR_MASK;
        // Arithmetic shift on the signed view restores the sign of the 14-bit count.
        let signed = (word as i16) >> 2;

        let marker = if signed >= 0 {
            if signed == 0 {
                return Err(SpikepackError::MalformedMarker(format!(
                    "coded run of zero samples (word {:#06x})",
                    word
                )));
            }
            Marker::coded(signed as usize, packer_of(selector)?)
        } else {
            if selector != 0 {
                return Err(SpikepackError::MalformedMarker(format!(
                    "literal run with non-zero encoding selector {:#04b}",
                    selector
                )));
            }
            Marker::literal(signed.unsigned_abs() as usize)
        };
        Ok(Some(marker))
    }

    /// Writes the marker to a byte sink.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let bytes = self.marshal()?;
        writer.write_all(&bytes)?;
        log::trace!("{:016b}: marker {:?}", u16::from_le_bytes(bytes), self);
        Ok(())
    }

    /// Reads the next marker. A clean end of input at the marker boundary and the
    /// reserved zero word both yield `Ok(None)`; a single dangling byte is a
    /// truncated stream.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Marker>> {
        let mut bytes = [0u8; MARKER_SIZE_BYTES];
        if !read_exact_or_eof(reader, &mut bytes, "marker")? {
            return Ok(None);
        }
        Marker::unmarshal(bytes)
    }
}

/// Writes the reserved end-of-stream word.
pub fn write_end_of_stream<W: Write>(writer: &mut W) -> Result<()> {
    writer.write_all(&END_OF_STREAM.to_le_bytes())?;
    Ok(())
}

/// Code width for each selector value; `0b11` is unassigned.
const SELECTOR_WIDTHS: [u8; 3] = [4, 6, 7];

fn selector_of(packer: Packer) -> u16 {
    match packer {
        Packer::Width4 => 0b00,
        Packer::Width6 => 0b01,
        Packer::Width7 => 0b10,
    }
}

fn packer_of(selector: u16) -> Result<Packer> {
    let width = SELECTOR_WIDTHS.get(selector as usize).ok_or_else(|| {
        SpikepackError::MalformedMarker(format!(
            "unsupported encoding selector {:#04b}",
            selector
        ))
    })?;
    Packer::from_encoding_size(*width)
}
