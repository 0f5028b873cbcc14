//! Shared sorted catalog of distinct timestamps
//!
//! Each distinct timestamp gets a dense ordinal. Scopes key their element sets
//! by ordinal and never own timestamp values themselves.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::core::error::{Error, Result};
use crate::structures::IdSpace;

/// Ordinal of a timestamp in the catalog
pub type Ordinal = u32;

/// Reference-counted timestamp catalog
#[derive(Debug, Default, Clone)]
pub struct TimestampCatalog {
    by_value: BTreeMap<OrderedFloat<f64>, Ordinal>,
    values: Vec<f64>,
    refs: Vec<u32>,
    ordinals: IdSpace,
}

impl TimestampCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal of `timestamp`, O(log n)
    pub fn ordinal(&self, timestamp: f64) -> Option<Ordinal> {
        self.by_value.get(&OrderedFloat(timestamp)).copied()
    }

    /// Timestamp of `ordinal`, O(1)
    pub fn timestamp(&self, ordinal: Ordinal) -> Option<f64> {
        if self.ordinals.is_live(ordinal) {
            self.values.get(ordinal as usize).copied()
        } else {
            None
        }
    }

    /// Reference `timestamp`, inserting it if new
    pub fn acquire(&mut self, timestamp: f64) -> Result<Ordinal> {
        if timestamp.is_nan() {
            return Err(Error::invalid_argument("timestamp can't be NaN"));
        }
        if let Some(&ord) = self.by_value.get(&OrderedFloat(timestamp)) {
            self.refs[ord as usize] += 1;
            return Ok(ord);
        }
        let ord = self.ordinals.allocate();
        let slot = ord as usize;
        if slot >= self.values.len() {
            self.values.resize(slot + 1, f64::NAN);
            self.refs.resize(slot + 1, 0);
        }
        self.values[slot] = timestamp;
        self.refs[slot] = 1;
        self.by_value.insert(OrderedFloat(timestamp), ord);
        Ok(ord)
    }

    /// Drop `count` references to `timestamp`; the entry disappears at zero
    pub fn release(&mut self, timestamp: f64, count: u32) -> Option<Ordinal> {
        let ord = self.ordinal(timestamp)?;
        let slot = ord as usize;
        self.refs[slot] = self.refs[slot].saturating_sub(count);
        if self.refs[slot] == 0 {
            self.by_value.remove(&OrderedFloat(timestamp));
            self.values[slot] = f64::NAN;
            // The ordinal was live, so freeing it can't fail
            let _ = self.ordinals.free(ord);
        }
        Some(ord)
    }

    /// Number of references held on `timestamp`
    pub fn ref_count(&self, timestamp: f64) -> u32 {
        self.ordinal(timestamp).map_or(0, |o| self.refs[o as usize])
    }

    /// `(timestamp, ordinal)` pairs within the closed interval, ascending
    pub fn range(&self, min: f64, max: f64) -> impl DoubleEndedIterator<Item = (f64, Ordinal)> + '_ {
        let range = if min.is_nan() || max.is_nan() || min > max {
            None
        } else {
            Some(self.by_value.range((
                Bound::Included(OrderedFloat(min)),
                Bound::Included(OrderedFloat(max)),
            )))
        };
        range.into_iter().flatten().map(|(t, &o)| (t.0, o))
    }

    /// Entries at or above `timestamp`, ascending
    pub fn up_from(&self, timestamp: f64) -> impl Iterator<Item = (f64, Ordinal)> + '_ {
        self.by_value
            .range((Bound::Included(OrderedFloat(timestamp)), Bound::Unbounded))
            .map(|(t, &o)| (t.0, o))
    }

    /// Entries at or below `timestamp`, descending
    pub fn down_from(&self, timestamp: f64) -> impl Iterator<Item = (f64, Ordinal)> + '_ {
        self.by_value
            .range((Bound::Unbounded, Bound::Included(OrderedFloat(timestamp))))
            .rev()
            .map(|(t, &o)| (t.0, o))
    }

    /// Every entry, ascending
    pub fn iter(&self) -> impl Iterator<Item = (f64, Ordinal)> + '_ {
        self.by_value.iter().map(|(t, &o)| (t.0, o))
    }

    /// Exclusive bound of ordinals in use
    pub fn ordinal_bound(&self) -> usize {
        self.ordinals.capacity()
    }

    /// Number of distinct timestamps
    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}
