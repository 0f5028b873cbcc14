//! Per-scope timestamp index
//!
//! Maps catalog ordinals to the set of elements associated with that
//! timestamp in this scope. Bounds are cached and only recomputed when the
//! current extreme ordinal empties, by walking the sorted catalog.

use ahash::AHashSet;
use std::marker::PhantomData;

use crate::core::types::Element;
use crate::timestamp::catalog::{Ordinal, TimestampCatalog};

/// Element sets by ordinal for one scope
#[derive(Debug, Clone)]
pub struct TimestampIndex {
    elements: Vec<AHashSet<u32>>,
    live_ordinals: usize,
    associations: usize,
    min: f64,
    max: f64,
}

impl Default for TimestampIndex {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            live_ordinals: 0,
            associations: 0,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl TimestampIndex {
    /// Empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `element` is associated with `ordinal`
    pub fn contains(&self, ordinal: Ordinal, element: u32) -> bool {
        self.elements.get(ordinal as usize).is_some_and(|s| s.contains(&element))
    }

    /// Associate `element` with `ordinal` (whose value is `timestamp`)
    pub fn add(&mut self, ordinal: Ordinal, timestamp: f64, element: u32) -> bool {
        let slot = ordinal as usize;
        if slot >= self.elements.len() {
            self.elements.resize_with(slot + 1, AHashSet::new);
        }
        let set = &mut self.elements[slot];
        if !set.insert(element) {
            return false;
        }
        self.associations += 1;
        if set.len() == 1 {
            if self.live_ordinals == 0 {
                self.min = timestamp;
                self.max = timestamp;
            } else {
                self.min = self.min.min(timestamp);
                self.max = self.max.max(timestamp);
            }
            self.live_ordinals += 1;
        }
        true
    }

    /// Inverse of [`add`](Self::add)
    pub fn remove(&mut self, catalog: &TimestampCatalog, ordinal: Ordinal, timestamp: f64, element: u32) -> bool {
        let Some(set) = self.elements.get_mut(ordinal as usize) else {
            return false;
        };
        if !set.remove(&element) {
            return false;
        }
        self.associations -= 1;
        if set.is_empty() {
            self.live_ordinals -= 1;
            if self.live_ordinals == 0 {
                self.min = f64::NEG_INFINITY;
                self.max = f64::INFINITY;
            } else {
                if timestamp == self.min {
                    self.min = self.first_live(catalog.up_from(timestamp));
                }
                if timestamp == self.max {
                    self.max = self.first_live(catalog.down_from(timestamp));
                }
            }
        }
        true
    }

    fn first_live(&self, walk: impl Iterator<Item = (f64, Ordinal)>) -> f64 {
        for (t, ord) in walk {
            if self.elements.get(ord as usize).is_some_and(|s| !s.is_empty()) {
                return t;
            }
        }
        // live_ordinals > 0 guarantees a hit; fall back to the empty sentinel
        f64::NAN
    }

    /// Elements associated with `ordinal`
    pub fn at(&self, ordinal: Ordinal) -> impl Iterator<Item = u32> + '_ {
        self.elements.get(ordinal as usize).into_iter().flat_map(|s| s.iter().copied())
    }

    /// Smallest timestamp present, negative infinity when empty
    pub fn min_timestamp(&self) -> f64 {
        self.min
    }

    /// Largest timestamp present, positive infinity when empty
    pub fn max_timestamp(&self) -> f64 {
        self.max
    }

    /// Whether any ordinal has an element
    pub fn has_elements(&self) -> bool {
        self.live_ordinals > 0
    }

    /// Number of `(timestamp, element)` pairs
    pub fn association_count(&self) -> usize {
        self.associations
    }

    /// Number of ordinals with at least one element
    pub fn live_ordinal_count(&self) -> usize {
        self.live_ordinals
    }

    /// Drop every association; the catalog is left alone
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Query handle over one scope and the shared catalog
pub struct TimestampIndexRef<'a, E: Element> {
    catalog: &'a TimestampCatalog,
    index: &'a TimestampIndex,
    _pd: PhantomData<E>,
}

impl<'a, E: Element + 'a> TimestampIndexRef<'a, E> {
    pub(crate) fn new(catalog: &'a TimestampCatalog, index: &'a TimestampIndex) -> Self {
        Self { catalog, index, _pd: PhantomData }
    }

    /// Elements with a timestamp in the closed interval `[min, max]`
    ///
    /// Each element is reported once per call, in catalog order of its first
    /// matching timestamp.
    pub fn get(&self, min: f64, max: f64) -> impl Iterator<Item = E> + 'a {
        let index = self.index;
        let mut seen = AHashSet::new();
        self.catalog
            .range(min, max)
            .flat_map(move |(_, ord)| index.at(ord))
            .filter(move |e| seen.insert(*e))
            .map(E::from_store_id)
    }

    /// Elements associated with exactly `timestamp`
    pub fn at(&self, timestamp: f64) -> impl Iterator<Item = E> + 'a {
        let index = self.index;
        self.catalog
            .ordinal(timestamp)
            .into_iter()
            .flat_map(move |ord| index.at(ord))
            .map(E::from_store_id)
    }

    /// Smallest timestamp in scope, negative infinity when empty
    pub fn min_timestamp(&self) -> f64 {
        self.index.min_timestamp()
    }

    /// Largest timestamp in scope, positive infinity when empty
    pub fn max_timestamp(&self) -> f64 {
        self.index.max_timestamp()
    }

    /// Whether the scope holds any association
    pub fn has_elements(&self) -> bool {
        self.index.has_elements()
    }

    /// Number of `(timestamp, element)` pairs in scope
    pub fn association_count(&self) -> usize {
        self.index.association_count()
    }
}
