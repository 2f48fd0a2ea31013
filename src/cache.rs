//! The adaptive dictionary shared (by construction, not by memory) between the
//! encoder and the decoder.
//!
//! Entries live in a `Vec` ordered by descending hit count, and an entry's
//! position is its dictionary code. Nothing about the dictionary travels on the
//! wire: the decoder rebuilds the same ordering by replaying the same `add`
//! calls in the same order, so every tie-break must be deterministic. Equal
//! counts keep their previous relative order, exactly as a stable sort would.

use crate::error::{Result, SpikepackError};
use crate::Sample;

/// One dictionary slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: Sample,
    pub count: u64,
}

/// Bounded, frequency-ranked cache of sample values.
#[derive(Debug, Clone)]
pub struct FrequencyCache {
    capacity: usize,
    order: Vec<CacheEntry>,
}

impl FrequencyCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: Vec::with_capacity(capacity),
        }
    }

    /// Records one sighting of `v`.
    ///
    /// A known key has its count incremented; an unknown key is appended with a
    /// count of one, after evicting the last (lowest ranked) entry if the cache
    /// is full. The touched entry is then moved in front of the first entry with
    /// a strictly smaller count. Since only that entry changed, the result is
    /// the same as re-sorting everything with a stable descending sort.
    pub fn add(&mut self, v: Sample) {
        let idx = match self.index(v) {
            Some(i) => {
                self.order[i].count += 1;
                i
            }
            None => {
                if self.is_full() {
                    self.order.pop();
                }
                self.order.push(CacheEntry { key: v, count: 1 });
                self.order.len() - 1
            }
        };

        let count = self.order[idx].count;
        let new_idx = self.order[..idx].partition_point(|e| e.count >= count);
        if new_idx < idx {
            self.order[new_idx..=idx].rotate_right(1);
        }
    }

    /// Current rank of `v`, or `None` if it is not cached.
    pub fn index(&self, v: Sample) -> Option<usize> {
        self.order.iter().position(|e| e.key == v)
    }

    /// Key at `rank`.
    ///
    /// # Errors
    /// A rank past the populated range can only come from a corrupted stream or
    /// an encoder/decoder desync, and is reported as an invariant violation.
    pub fn at(&self, rank: usize) -> Result<Sample> {
        self.order.get(rank).map(|e| e.key).ok_or_else(|| {
            SpikepackError::InternalInvariantViolation(format!(
                "cache rank {} is out of range, cache holds {} entries",
                rank,
                self.order.len()
            ))
        })
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries in rank order.
    pub fn entries(&self) -> &[CacheEntry] {
        &self.order
    }
}
