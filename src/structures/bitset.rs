//! Capacity-tracked containers with geometric growth
//!
//! Node bits, edge bits and per-type counters all grow through the same
//! `GrowthPolicy` so their capacity always covers the highest id seen.

/// Growth rule shared by bit sets and counter arrays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPolicy {
    factor: f64,
}

impl GrowthPolicy {
    /// Policy growing by `factor` (clamped to at least 1.0)
    pub fn new(factor: f64) -> Self {
        Self { factor: if factor >= 1.0 { factor } else { 1.0 } }
    }

    /// New length for a container of `current` slots that must address `index`
    #[inline]
    pub fn grown_len(&self, current: usize, index: usize) -> usize {
        let needed = index.saturating_add(1);
        let scaled = (current as f64 * self.factor) as usize;
        needed.max(scaled).min(isize::MAX as usize)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new(1.1)
    }
}

/// Resizable bit set over `u64` words
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrowableBitSet {
    words: Vec<u64>,
    len: usize,
}

impl GrowableBitSet {
    /// Empty bit set addressing `len` bits
    pub fn with_len(len: usize) -> Self {
        Self { words: vec![0; len.div_ceil(64)], len }
    }

    /// Number of addressable bits
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bits are addressable
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read a bit; bits beyond the current length read as unset
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Grow so that `index` is addressable
    pub fn ensure_index(&mut self, index: usize, policy: GrowthPolicy) {
        if index >= self.len {
            let new_len = policy.grown_len(self.len, index);
            self.words.resize(new_len.div_ceil(64), 0);
            self.len = new_len;
        }
    }

    /// Set a bit, returning whether it was previously unset
    #[inline]
    pub fn insert(&mut self, index: usize, policy: GrowthPolicy) -> bool {
        self.ensure_index(index, policy);
        let word = &mut self.words[index / 64];
        let mask = 1u64 << (index % 64);
        let was_unset = *word & mask == 0;
        *word |= mask;
        was_unset
    }

    /// Clear a bit, returning whether it was previously set
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let word = &mut self.words[index / 64];
        let mask = 1u64 << (index % 64);
        let was_set = *word & mask != 0;
        *word &= !mask;
        was_set
    }

    /// Clear every bit, keeping capacity
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of set bits in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * 64 + bit)
            })
        })
    }
}

/// Per-slot counters that grow on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowableCounts {
    counts: Vec<usize>,
}

impl GrowableCounts {
    /// Counters for `len` slots, all zero
    pub fn with_len(len: usize) -> Self {
        Self { counts: vec![0; len] }
    }

    /// Number of tracked slots
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no slots are tracked
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counter value, `None` beyond the tracked range
    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.counts.get(index).copied()
    }

    /// Increment a slot, growing if needed
    pub fn increment(&mut self, index: usize, policy: GrowthPolicy) {
        if index >= self.counts.len() {
            let new_len = policy.grown_len(self.counts.len(), index);
            self.counts.resize(new_len, 0);
        }
        self.counts[index] += 1;
    }

    /// Decrement a tracked slot; never underflows
    pub fn decrement(&mut self, index: usize) {
        if let Some(c) = self.counts.get_mut(index) {
            debug_assert!(*c > 0, "counter underflow at slot {}", index);
            *c = c.saturating_sub(1);
        }
    }

    /// Sum over all slots
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Reset to `len` zeroed slots
    pub fn reset(&mut self, len: usize) {
        self.counts.clear();
        self.counts.resize(len, 0);
    }
}
