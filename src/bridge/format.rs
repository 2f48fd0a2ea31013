// In: src/bridge/format.rs

//! Describes an encoded stream without decoding it.
//!
//! The segment structure of a stream is fully determined by its markers, so a
//! stream can be summarized by walking marker to marker and skipping payloads.
//! No cache is needed for that, which makes it cheap enough for the CLI's
//! `inspect` command and for sanity checks in tests.

use std::io::{Cursor, Seek, SeekFrom};

use serde::Serialize;

use crate::error::{Result, SpikepackError};
use crate::kernels::marker::{Marker, RunKind, END_OF_STREAM};
use crate::stream::stats::WidthCounts;

/// Structural summary of an encoded stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub total_size: usize,
    pub marker_bytes: usize,
    pub payload_bytes: usize,
    pub num_coded_segments: usize,
    pub num_literal_segments: usize,
    pub num_samples: usize,
    pub num_samples_by_width: WidthCounts,
    /// The stream ends with the reserved end-of-stream word.
    pub has_end_marker: bool,
    /// Bytes after the end-of-stream word, ignored by decoders.
    pub trailing_bytes: usize,
}

impl StreamInfo {
    /// Walks the markers of `bytes`.
    ///
    /// # Errors
    /// Malformed markers and payloads cut short by the end of `bytes`.
    pub fn scan(bytes: &[u8]) -> Result<Self> {
        let mut info = StreamInfo {
            total_size: bytes.len(),
            ..Default::default()
        };
        let mut cursor = Cursor::new(bytes);

        loop {
            let start = cursor.position() as usize;
            let Some(marker) = Marker::read_from(&mut cursor)? else {
                let position = cursor.position() as usize;
                if position > start {
                    // Stopped on the reserved word rather than the end of input.
                    debug_assert_eq!(&bytes[start..position], &END_OF_STREAM.to_le_bytes());
                    info.has_end_marker = true;
                    info.marker_bytes += position - start;
                    info.trailing_bytes = bytes.len() - position;
                }
                break;
            };

            let payload = marker.payload_len();
            if start + marker.size_bytes() + payload > bytes.len() {
                return Err(SpikepackError::TruncatedStream {
                    context: if marker.is_encoded() { "coded payload" } else { "literal payload" },
                });
            }
            cursor.seek(SeekFrom::Current(payload as i64))?;

            info.marker_bytes += marker.size_bytes();
            info.payload_bytes += payload;
            info.num_samples += marker.count;
            match marker.kind {
                RunKind::Coded(packer) => {
                    info.num_coded_segments += 1;
                    info.num_samples_by_width.add(packer, marker.count);
                }
                RunKind::Literal => info.num_literal_segments += 1,
            }
        }

        Ok(info)
    }
}
