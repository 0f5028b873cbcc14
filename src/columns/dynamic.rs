//! Time-varying attribute values
//!
//! The store only talks to dynamic values through [`DynamicMap`], so any
//! representation honouring it can back a dynamic column.

use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::{Error, Result};
use crate::core::value::{Estimator, ScalarType, Value};

/// Capability contract of a dynamic value
pub trait DynamicMap {
    /// Whether `estimator` can collapse this map to a scalar
    fn is_supported(&self, estimator: Estimator) -> bool;

    /// Associate `value` with `timestamp`, returning the replaced value
    fn put(&mut self, timestamp: f64, value: Value) -> Result<Option<Value>>;

    /// Drop the value at `timestamp`
    fn remove(&mut self, timestamp: f64) -> Option<Value>;

    /// Timestamps carrying a value, ascending
    fn timestamps(&self) -> impl Iterator<Item = f64> + '_;

    /// Collapse the series with `estimator`; `None` if empty or unsupported
    fn estimate(&self, estimator: Estimator) -> Option<Value>;
}

/// Sorted map from timestamp to scalar value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimestampMap {
    scalar: ScalarType,
    entries: BTreeMap<OrderedFloat<f64>, Value>,
}

impl TimestampMap {
    /// Empty map holding values of type `scalar`
    pub fn new(scalar: ScalarType) -> Self {
        Self { scalar, entries: BTreeMap::new() }
    }

    /// Build a map from `(timestamp, value)` pairs
    pub fn from_pairs<I>(scalar: ScalarType, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, Value)>,
    {
        let mut map = Self::new(scalar);
        for (t, v) in pairs {
            map.put(t, v)?;
        }
        Ok(map)
    }

    /// Type of the values
    pub fn scalar_type(&self) -> ScalarType {
        self.scalar
    }

    /// Value at exactly `timestamp`
    pub fn get(&self, timestamp: f64) -> Option<&Value> {
        self.entries.get(&OrderedFloat(timestamp))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.values().filter_map(Value::as_f64)
    }

    fn extreme_by(&self, take_max: bool) -> Option<Value> {
        let mut best: Option<&Value> = None;
        for v in self.entries.values() {
            let x = v.as_f64()?;
            best = match best {
                Some(b) => {
                    let y = b.as_f64()?;
                    if (take_max && x > y) || (!take_max && x < y) { Some(v) } else { Some(b) }
                }
                None => Some(v),
            };
        }
        best.cloned()
    }

    fn mode(&self) -> Option<Value> {
        let mut counts: Vec<(&Value, usize)> = Vec::new();
        for v in self.entries.values() {
            match counts.iter_mut().find(|(seen, _)| *seen == v) {
                Some((_, c)) => *c += 1,
                None => counts.push((v, 1)),
            }
        }
        // Ties resolve to the earliest value in time order
        let mut best: Option<(&Value, usize)> = None;
        for (v, c) in counts {
            if best.map_or(true, |(_, bc)| c > bc) {
                best = Some((v, c));
            }
        }
        best.map(|(v, _)| v.clone())
    }
}

impl DynamicMap for TimestampMap {
    fn is_supported(&self, estimator: Estimator) -> bool {
        if self.scalar.is_number() {
            return true;
        }
        matches!(estimator, Estimator::First | Estimator::Last | Estimator::Mode)
    }

    fn put(&mut self, timestamp: f64, value: Value) -> Result<Option<Value>> {
        if timestamp.is_nan() {
            return Err(Error::invalid_argument("timestamp can't be NaN"));
        }
        if value.value_type().and_then(|t| t.scalar()) != Some(self.scalar) {
            return Err(Error::invalid_argument(format!(
                "value {} doesn't match dynamic type {:?}",
                value, self.scalar
            )));
        }
        Ok(self.entries.insert(OrderedFloat(timestamp), value))
    }

    fn remove(&mut self, timestamp: f64) -> Option<Value> {
        self.entries.remove(&OrderedFloat(timestamp))
    }

    fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.keys().map(|t| t.0)
    }

    fn estimate(&self, estimator: Estimator) -> Option<Value> {
        if self.entries.is_empty() || !self.is_supported(estimator) {
            return None;
        }
        match estimator {
            Estimator::First => self.entries.values().next().cloned(),
            Estimator::Last => self.entries.values().next_back().cloned(),
            Estimator::Mode => self.mode(),
            Estimator::Min => self.extreme_by(false),
            Estimator::Max => self.extreme_by(true),
            Estimator::Sum => Some(Value::double(self.numbers().sum())),
            Estimator::Average => {
                let sum: f64 = self.numbers().sum();
                Some(Value::double(sum / self.entries.len() as f64))
            }
            Estimator::Median => {
                let mut sorted: Vec<f64> = self.numbers().collect();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                let median = if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                };
                Some(Value::double(median))
            }
        }
    }
}

impl fmt::Display for TimestampMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, (t, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "[{}, {}]", t, v)?;
        }
        write!(f, ">")
    }
}
