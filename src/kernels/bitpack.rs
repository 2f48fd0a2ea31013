//! This module contains the pure, stateless kernels for packing small dictionary
//! codes into fixed-width byte groups.
//!
//! Every width uses the same "head" layout: a group of `n` codes packs into
//! `n - 1` bytes. Codes `1..n` each own the low `b` bits of one output byte,
//! and the first code (the head) is spread over the remaining `8 - b` high bits
//! of those bytes, most significant bits first:
//!
//! ```text
//! out[i] = (v[i + 1] & low_mask) | ((v[0] << ((i + 1) * (8 - b))) & !low_mask)
//! ```
//!
//! This gives 2 codes per byte at 4 bits, 4 codes per 3 bytes at 6 bits and
//! 8 codes per 7 bytes at 7 bits, with no padding. The set of widths is closed,
//! so it is modelled by the `Packer` enum and dispatched with a `match`.

use std::fmt;

use crate::error::{Result, SpikepackError};

//==================================================================================
// 1. Generic Core Logic (The "Engine")
//==================================================================================

/// Mask covering the low `width` bits of a byte.
const fn low_mask(width: u32) -> u8 {
    ((1u16 << width) - 1) as u8
}

/// Packs `N` codes of `width` bits into `P = N - 1` bytes.
fn pack_group<const N: usize, const P: usize>(vs: &[u8; N], width: u32) -> [u8; P] {
    debug_assert_eq!(N, P + 1);
    debug_assert_eq!(P as u32 * (8 - width), width);

    let low = low_mask(width);
    let head_bits = 8 - width;
    let mut out = [0u8; P];
    for (i, byte) in out.iter_mut().enumerate() {
        let shift = (i as u32 + 1) * head_bits;
        *byte = (vs[i + 1] & low) | ((vs[0] << shift) & !low);
    }
    out
}

/// Exact inverse of `pack_group`.
fn unpack_group<const P: usize, const N: usize>(packed: &[u8; P], width: u32) -> [u8; N] {
    debug_assert_eq!(N, P + 1);

    let low = low_mask(width);
    let head_bits = 8 - width;
    let mut out = [0u8; N];
    for (i, &byte) in packed.iter().enumerate() {
        let shift = (i as u32 + 1) * head_bits;
        out[0] |= (byte & !low) >> shift;
        out[i + 1] = byte & low;
    }
    out
}

//==================================================================================
// 2. Per-Width Array Kernels
//==================================================================================

/// Packs two 4-bit codes into one byte: head in the high nibble.
pub fn pack_2x4(vs: [u8; 2]) -> [u8; 1] {
    pack_group(&vs, 4)
}

pub fn unpack_2x4(packed: [u8; 1]) -> [u8; 2] {
    unpack_group(&packed, 4)
}

/// Packs four 6-bit codes into three bytes.
pub fn pack_4x6(vs: [u8; 4]) -> [u8; 3] {
    pack_group(&vs, 6)
}

pub fn unpack_4x6(packed: [u8; 3]) -> [u8; 4] {
    unpack_group(&packed, 6)
}

/// Packs eight 7-bit codes into seven bytes.
pub fn pack_8x7(vs: [u8; 8]) -> [u8; 7] {
    pack_group(&vs, 7)
}

pub fn unpack_8x7(packed: [u8; 7]) -> [u8; 8] {
    unpack_group(&packed, 7)
}

//==================================================================================
// 3. Public API (The Closed Set of Packers)
//==================================================================================

/// One of the three supported code widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Packer {
    Width4,
    Width6,
    Width7,
}

impl Packer {
    /// All packers, in increasing width order. The encoder evaluates them in
    /// this order and keeps the first cheapest candidate.
    pub const ALL: [Packer; 3] = [Packer::Width4, Packer::Width6, Packer::Width7];

    /// Resolves a bit width to its packer.
    pub fn from_encoding_size(encoding_size: u8) -> Result<Self> {
        match encoding_size {
            4 => Ok(Packer::Width4),
            6 => Ok(Packer::Width6),
            7 => Ok(Packer::Width7),
            other => Err(SpikepackError::UnsupportedEncodingSize(other)),
        }
    }

    /// Bits per code.
    pub const fn encoding_size(self) -> u8 {
        match self {
            Packer::Width4 => 4,
            Packer::Width6 => 6,
            Packer::Width7 => 7,
        }
    }

    /// Number of codes in one packed group.
    pub const fn unpacked_len(self) -> usize {
        match self {
            Packer::Width4 => 2,
            Packer::Width6 => 4,
            Packer::Width7 => 8,
        }
    }

    /// Number of bytes one packed group occupies.
    pub const fn packed_len(self) -> usize {
        self.unpacked_len() * self.encoding_size() as usize / 8
    }

    /// Highest cache rank this width can address.
    pub const fn max_key_index(self) -> usize {
        (1 << self.encoding_size()) - 1
    }

    /// Packs exactly `unpacked_len()` codes and appends `packed_len()` bytes to `out`.
    pub fn pack_into(self, values: &[u8], out: &mut Vec<u8>) -> Result<()> {
        if values.len() != self.unpacked_len() {
            return Err(SpikepackError::BufferMismatch(self.unpacked_len(), values.len()));
        }
        if let Some(&v) = values.iter().find(|&&v| v as usize > self.max_key_index()) {
            return Err(SpikepackError::BitpackEncodeError(v as u64, self.encoding_size()));
        }

        let mismatch = |_| SpikepackError::BufferMismatch(self.unpacked_len(), values.len());
        match self {
            Packer::Width4 => out.extend_from_slice(&pack_2x4(values.try_into().map_err(mismatch)?)),
            Packer::Width6 => out.extend_from_slice(&pack_4x6(values.try_into().map_err(mismatch)?)),
            Packer::Width7 => out.extend_from_slice(&pack_8x7(values.try_into().map_err(mismatch)?)),
        }
        Ok(())
    }

    /// Unpacks exactly `packed_len()` bytes and appends `unpacked_len()` codes to `out`.
    pub fn unpack_into(self, packed: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let mismatch = |_| SpikepackError::BufferMismatch(self.packed_len(), packed.len());
        match self {
            Packer::Width4 => out.extend_from_slice(&unpack_2x4(packed.try_into().map_err(mismatch)?)),
            Packer::Width6 => out.extend_from_slice(&unpack_4x6(packed.try_into().map_err(mismatch)?)),
            Packer::Width7 => out.extend_from_slice(&unpack_8x7(packed.try_into().map_err(mismatch)?)),
        }
        Ok(())
    }
}

impl fmt::Display for Packer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.encoding_size())
    }
}
