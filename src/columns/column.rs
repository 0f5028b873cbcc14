//! Column schema entries, version counters and observers

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::columns::dynamic::{DynamicMap, TimestampMap};
use crate::core::error::{Error, Result};
use crate::core::types::{ColumnStoreId, ElementKind};
use crate::core::value::{Estimator, Value, ValueType};

/// Where a column comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// Built-in property of every element
    Property,
    /// User-defined data column
    Data,
}

/// Parameters for a new column
#[derive(Clone, Debug)]
pub struct ColumnBuilder {
    id: String,
    value_type: Option<ValueType>,
    title: Option<String>,
    default_value: Value,
    origin: Origin,
    indexed: bool,
    read_only: bool,
}

impl ColumnBuilder {
    /// Start describing a column named `id`
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value_type: None,
            title: None,
            default_value: Value::Null,
            origin: Origin::Data,
            indexed: false,
            read_only: false,
        }
    }

    /// Value type; required
    pub fn value_type(mut self, ty: ValueType) -> Self {
        self.value_type = Some(ty);
        self
    }

    /// Human-readable title, defaults to the id as given
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Value reported for elements that never set this column
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    /// Column origin
    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Maintain a value index for this column
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Reject attribute writes
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Attribute column
#[derive(Debug)]
pub struct Column {
    id: String,
    value_type: ValueType,
    title: String,
    default_value: Value,
    origin: Origin,
    indexed: bool,
    dynamic: bool,
    read_only: bool,
    estimator: Option<Estimator>,
    version: Arc<AtomicU64>,
    observers: Option<Mutex<Vec<ObserverSlot>>>,
    next_observer: AtomicU64,
    pub(crate) table: Option<ElementKind>,
    pub(crate) store_id: Option<ColumnStoreId>,
}

#[derive(Debug)]
struct ObserverSlot {
    id: u64,
    destroyed: Arc<AtomicBool>,
}

impl Column {
    /// Build a detached column; `observers_enabled` is read once, here
    pub fn new(builder: ColumnBuilder, observers_enabled: bool) -> Result<Self> {
        let ColumnBuilder { id, value_type, title, default_value, origin, indexed, read_only } = builder;
        if id.trim().is_empty() {
            return Err(Error::invalid_argument("The column ID can't be null or empty"));
        }
        let normalized = id.to_lowercase();
        let value_type = value_type.ok_or_else(|| Error::NullType { column: normalized.clone() })?;
        if !default_value.conforms_to(value_type) {
            return Err(Error::invalid_argument(format!(
                "default value {} doesn't match column type {:?}",
                default_value, value_type
            )));
        }
        let dynamic = value_type.is_dynamic();
        Ok(Self {
            title: title.unwrap_or(id),
            id: normalized,
            value_type,
            default_value,
            origin,
            // Dynamic values are reached through the timestamp index instead
            indexed: indexed && !dynamic,
            dynamic,
            read_only,
            estimator: if dynamic { Some(Estimator::First) } else { None },
            version: Arc::new(AtomicU64::new(0)),
            observers: if observers_enabled { Some(Mutex::new(Vec::new())) } else { None },
            next_observer: AtomicU64::new(0),
            table: None,
            store_id: None,
        })
    }

    /// Normalized (lowercase) id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Column title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Value type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Default value
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Column origin
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether a value index is maintained
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Whether values are time-varying maps
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Whether attribute writes are rejected
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the type is an array type
    pub fn is_array(&self) -> bool {
        self.value_type.is_array()
    }

    /// Whether the type is a plain number
    pub fn is_number(&self) -> bool {
        self.value_type.is_number()
    }

    /// Whether this is a built-in property column
    pub fn is_property(&self) -> bool {
        self.origin == Origin::Property
    }

    /// Table the column is attached to
    pub fn table(&self) -> Option<ElementKind> {
        self.table
    }

    /// Store id inside the table; `None` while detached
    pub fn store_id(&self) -> Option<ColumnStoreId> {
        self.store_id
    }

    /// Current estimator; set iff the column is dynamic
    pub fn estimator(&self) -> Option<Estimator> {
        self.estimator
    }

    /// Change the estimator of a dynamic column
    pub fn set_estimator(&mut self, estimator: Estimator) -> Result<()> {
        let scalar = match self.value_type {
            ValueType::Dynamic(scalar) => scalar,
            _ => return Err(Error::invalid_state("The column must have a dynamic type")),
        };
        if !TimestampMap::new(scalar).is_supported(estimator) {
            return Err(Error::invalid_argument(format!(
                "The column doesn't support the {:?} estimator",
                estimator
            )));
        }
        self.estimator = Some(estimator);
        Ok(())
    }

    /// Current mutation version
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Record a value mutation
    pub fn increment_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Register a version watcher; `None` when observers are disabled
    pub fn create_observer(&self) -> Option<ColumnObserver> {
        let observers = self.observers.as_ref()?;
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        let destroyed = Arc::new(AtomicBool::new(false));
        observers.lock().push(ObserverSlot { id, destroyed: Arc::clone(&destroyed) });
        Some(ColumnObserver {
            id,
            column: self.id.clone(),
            version: Arc::clone(&self.version),
            last_seen: self.version(),
            destroyed,
        })
    }

    /// Unregister a watcher; returns whether it was registered here
    pub fn destroy_observer(&self, observer: &ColumnObserver) -> bool {
        let Some(observers) = self.observers.as_ref() else {
            return false;
        };
        let mut slots = observers.lock();
        match slots.iter().position(|s| s.id == observer.id && Arc::ptr_eq(&s.destroyed, &observer.destroyed)) {
            Some(pos) => {
                let slot = slots.swap_remove(pos);
                slot.destroyed.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.as_ref().map_or(0, |o| o.lock().len())
    }

    pub(crate) fn destroy_all_observers(&self) {
        if let Some(observers) = self.observers.as_ref() {
            for slot in observers.lock().drain(..) {
                slot.destroyed.store(true, Ordering::Release);
            }
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.value_type == other.value_type
    }
}

impl Eq for Column {}

/// Watcher reporting whether a column changed since it last looked
#[derive(Debug)]
pub struct ColumnObserver {
    id: u64,
    column: String,
    version: Arc<AtomicU64>,
    last_seen: u64,
    destroyed: Arc<AtomicBool>,
}

impl ColumnObserver {
    /// Id of the observed column
    pub fn column_id(&self) -> &str {
        &self.column
    }

    /// Whether the column was mutated since the previous call
    pub fn has_column_changed(&mut self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let current = self.version.load(Ordering::Acquire);
        if current != self.last_seen {
            self.last_seen = current;
            return true;
        }
        false
    }

    /// Whether the observer was unregistered
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}
