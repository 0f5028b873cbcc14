//! Dense, reusable id allocation
//!
//! The smallest released id is always handed out first, so ids stay packed
//! towards zero and bit sets indexed by them stay short.

use std::collections::BTreeSet;

use crate::core::error::{GraphError, Result};
use crate::structures::bitset::{GrowableBitSet, GrowthPolicy};

/// Allocator of dense `u32` ids with a free list
#[derive(Debug, Clone, Default)]
pub struct IdSpace {
    /// One past the highest outstanding id
    next: u32,
    /// Released ids below `next`
    free: BTreeSet<u32>,
    live: GrowableBitSet,
    len: usize,
}

impl IdSpace {
    /// Empty id space
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the smallest free id, or the next sequential one
    pub fn allocate(&mut self) -> u32 {
        let id = match self.free.pop_first() {
            Some(id) => id,
            None => {
                let id = self.next;
                self.next += 1;
                id
            }
        };
        self.live.insert(id as usize, GrowthPolicy::default());
        self.len += 1;
        id
    }

    /// Return `id` to the pool
    pub fn free(&mut self, id: u32) -> Result<()> {
        if !self.live.remove(id as usize) {
            return Err(GraphError::IdNotAllocated(id).into());
        }
        self.len -= 1;
        self.free.insert(id);
        // Keep `next` tight so it tracks the highest live id
        while self.next > 0 && self.free.remove(&(self.next - 1)) {
            self.next -= 1;
        }
        Ok(())
    }

    /// Whether `id` is currently allocated
    #[inline]
    pub fn is_live(&self, id: u32) -> bool {
        self.live.get(id as usize)
    }

    /// Highest outstanding id
    pub fn max_id(&self) -> Option<u32> {
        self.next.checked_sub(1)
    }

    /// Exclusive upper bound of outstanding ids, used to size bit sets
    pub fn capacity(&self) -> usize {
        self.next as usize
    }

    /// Number of outstanding ids
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no id is outstanding
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Outstanding ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.live.iter_ones().map(|i| i as u32)
    }

    /// Release every id
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
