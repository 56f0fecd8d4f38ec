//! Lengths carried from the length pass to the write pass of binary
//! encoding.
//!
//! A length-delimited field has to emit its length before its content, and
//! that length is only known once the content has been measured. The length
//! pass measures the whole tree once and records every length-delimited size
//! here in encode order; the write pass then takes them back in the same
//! order. An outer field reserves its slot before measuring its children so
//! the recorded order matches the order in which the write pass needs them.
use alloc::vec::Vec;

use tracing::debug;

use crate::error::WireError;

#[derive(Debug, Default, Clone)]
pub struct WriteCache {
    lengths: Vec<usize>,
    cursor: usize,
}

/// Position of a reserved length in a [`WriteCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSlot(usize);

impl WriteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next position; fill it with [`fill`](Self::fill) once
    /// the content is measured.
    pub fn reserve(&mut self) -> CacheSlot {
        self.lengths.push(0);
        CacheSlot(self.lengths.len() - 1)
    }

    pub fn fill(&mut self, slot: CacheSlot, length: usize) {
        self.lengths[slot.0] = length;
    }

    /// Takes the next length during the write pass.
    pub fn next_length(&mut self) -> Result<usize, WireError> {
        let length = *self
            .lengths
            .get(self.cursor)
            .ok_or(WireError::CacheExhausted)?;
        self.cursor += 1;
        Ok(length)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Checks the write pass took exactly what the length pass recorded.
    pub fn finish(&self) -> Result<(), WireError> {
        let left = self.lengths.len() - self.cursor;
        if left != 0 {
            debug!(left, recorded = self.lengths.len(), "write cache not fully consumed");
            return Err(WireError::CacheLeftover(left));
        }
        Ok(())
    }
}
