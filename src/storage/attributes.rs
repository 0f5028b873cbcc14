//! Attribute rows and the indices derived from them, for one element kind
//!
//! Every write goes through here so the value index (main and member view
//! scopes), the timestamp index and the shared catalog stay in step with the
//! stored rows.

use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::columns::{Column, ColumnBuilder, DynamicMap, Table};
use crate::core::error::{Error, GraphError, Result};
use crate::core::types::{ColumnStoreId, Element, ElementKind, Scope, ViewId};
use crate::core::value::{Estimator, Value};
use crate::index::{ElementIndex, ValueIndexStore};
use crate::timestamp::{TimestampIndexRef, TimestampIndexStore};
use crate::view::{GraphView, ViewStore};
use crate::log_trace;

type MemberViews = SmallVec<[ViewId; 4]>;

#[derive(Debug, Default, Clone)]
struct Row {
    /// Explicitly written values by column store id; `None` reads as the default
    cells: Vec<Option<Value>>,
    timestamps: BTreeSet<OrderedFloat<f64>>,
}

fn cell(table: &Table, row: Option<&Row>, column: ColumnStoreId) -> Value {
    if let Some(value) = row.and_then(|r| r.cells.get(column as usize)).and_then(Option::as_ref) {
        return value.clone();
    }
    table
        .by_store_id(column)
        .map(|c| c.default_value().clone())
        .unwrap_or_default()
}

fn member_views<E: Element>(views: &ViewStore, element: E) -> MemberViews {
    views.iter().filter(|v| v.contains(element)).map(GraphView::id).collect()
}

/// Columns, rows and indices of one element kind
#[derive(Debug)]
pub struct AttributeStore<E: Element> {
    table: Table,
    values: ValueIndexStore<E>,
    timestamps: TimestampIndexStore<E>,
    rows: Vec<Row>,
}

impl<E: Element> AttributeStore<E> {
    /// Empty store for `E`
    pub fn new(observers_enabled: bool, index_enabled: bool) -> Self {
        Self {
            table: Table::new(E::KIND, observers_enabled),
            values: ValueIndexStore::new(index_enabled),
            timestamps: TimestampIndexStore::new(),
            rows: Vec::new(),
        }
    }

    /// Column table
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Value indices
    pub fn values(&self) -> &ValueIndexStore<E> {
        &self.values
    }

    /// Timestamp indices
    pub fn timestamps(&self) -> &TimestampIndexStore<E> {
        &self.timestamps
    }

    fn row(&self, element: E) -> Option<&Row> {
        self.rows.get(element.store_id() as usize)
    }

    /// Attach a column; an indexed column is indexed with every element's
    /// default value in the main scope and in each view
    pub(crate) fn create_column(
        &mut self,
        builder: ColumnBuilder,
        live: impl Iterator<Item = E>,
        views: &ViewStore,
    ) -> Result<ColumnStoreId> {
        let sid = self.table.create_column(builder)?;
        let indexed = self.table.by_store_id(sid).is_some_and(Column::is_indexed);
        if !indexed || !self.values.is_enabled() {
            return Ok(sid);
        }
        self.values.add_column(sid);
        let default = cell(&self.table, None, sid);
        if let Some(index) = self.values.main_mut().column_mut(sid) {
            for element in live {
                index.insert(&default, element.store_id());
            }
        }
        for view in views.iter() {
            if let Some(index) = self.values.view_mut(view.id()).and_then(|s| s.column_mut(sid)) {
                for element in view.members::<E>() {
                    index.insert(&default, element.store_id());
                }
            }
        }
        Ok(sid)
    }

    /// Detach a column, dropping its indices and stored values
    pub(crate) fn remove_column(&mut self, id: &str) -> Result<Column> {
        let sid = self
            .table
            .store_id(id)
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' doesn't exist", id)))?;
        let column = self.table.remove_column(id)?;
        self.values.remove_column(sid);
        for row in &mut self.rows {
            if let Some(Some(Value::Dynamic(map))) = row.cells.get_mut(sid as usize).map(Option::take) {
                for t in map.timestamps() {
                    self.timestamps.catalog_mut().release(t, 1);
                }
            }
        }
        Ok(column)
    }

    /// Mutable column access for schema tweaks such as the estimator
    pub(crate) fn column_mut(&mut self, id: &str) -> Result<&mut Column> {
        self.table
            .column_mut(id)
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' doesn't exist", id)))
    }

    /// Start tracking a freshly allocated element
    pub(crate) fn on_insert(&mut self, element: E) {
        let slot = element.store_id() as usize;
        if slot >= self.rows.len() {
            self.rows.resize_with(slot + 1, Row::default);
        }
        self.rows[slot] = Row::default();
        let table = &self.table;
        self.values.main_mut().insert_element(element, |sid| cell(table, None, sid));
    }

    /// Stop tracking an element; it must already have left every view
    pub(crate) fn on_remove(&mut self, element: E) {
        let slot = element.store_id() as usize;
        let row = match self.rows.get_mut(slot) {
            Some(row) => std::mem::take(row),
            None => return,
        };
        let table = &self.table;
        self.values.main_mut().remove_element(element, |sid| cell(table, Some(&row), sid));
        for t in &row.timestamps {
            self.timestamps.remove(t.0, element);
        }
        for value in row.cells.iter().flatten() {
            if let Value::Dynamic(map) = value {
                for t in map.timestamps() {
                    self.timestamps.catalog_mut().release(t, 1);
                }
            }
        }
    }

    /// Mirror an element into the scoped indices of `view` after it joined
    pub(crate) fn view_join(&mut self, view: ViewId, element: E) {
        let table = &self.table;
        let row = self.rows.get(element.store_id() as usize);
        if let Some(scope) = self.values.view_mut(view) {
            scope.insert_element(element, |sid| cell(table, row, sid));
        }
        if let Some(row) = row {
            self.timestamps.view_add_element(view, element, row.timestamps.iter().map(|t| t.0));
        }
    }

    /// Drop an element from the scoped indices of `view` after it left
    pub(crate) fn view_leave(&mut self, view: ViewId, element: E) {
        let table = &self.table;
        let row = self.rows.get(element.store_id() as usize);
        if let Some(scope) = self.values.view_mut(view) {
            scope.remove_element(element, |sid| cell(table, row, sid));
        }
        if let Some(row) = row {
            self.timestamps.view_remove_element(view, element, row.timestamps.iter().map(|t| t.0));
        }
    }

    pub(crate) fn view_created(&mut self, view: ViewId) {
        self.values.create_view(view);
    }

    pub(crate) fn view_destroyed(&mut self, view: ViewId) {
        self.values.destroy_view(view);
        self.timestamps.destroy_view_index(view);
    }

    /// Empty the scoped indices of `view` after its members of this kind were dropped
    pub(crate) fn view_cleared(&mut self, view: ViewId) -> Result<()> {
        if let Some(scope) = self.values.view_mut(view) {
            scope.clear();
        }
        if self.timestamps.has_view_index(view) {
            self.timestamps.clear_view(view)?;
        }
        Ok(())
    }

    /// Build the scoped timestamp index of `view` from its current members
    pub(crate) fn create_view_index(&mut self, view: &GraphView) {
        self.timestamps.create_view_index(view.id(), |e| view.contains(e));
    }

    /// Write `value` to `column` of `element`, returning the previous value
    pub(crate) fn set(&mut self, element: E, column: &str, value: Value, views: &ViewStore) -> Result<Value> {
        let col = self
            .table
            .column(column)
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' doesn't exist", column)))?;
        if col.is_read_only() {
            return Err(Error::invalid_state(format!("The column '{}' is read-only", col.id())));
        }
        if !value.conforms_to(col.value_type()) {
            return Err(Error::invalid_argument(format!(
                "value {} doesn't match column '{}' of type {:?}",
                value,
                col.id(),
                col.value_type()
            )));
        }
        let sid = col
            .store_id()
            .ok_or_else(|| Error::invalid_state(format!("column '{}' is detached", col.id())))?;
        let slot = element.store_id() as usize;
        if slot >= self.rows.len() {
            return Err(Error::invalid_state(format!("no row for {:?} {}", E::KIND, slot)));
        }

        if let Value::Dynamic(map) = &value {
            for t in map.timestamps() {
                self.timestamps.catalog_mut().acquire(t)?;
            }
        }
        let row = &mut self.rows[slot];
        if row.cells.len() <= sid as usize {
            row.cells.resize(sid as usize + 1, None);
        }
        let previous = row.cells[sid as usize].replace(value.clone());
        if let Some(Value::Dynamic(map)) = &previous {
            for t in map.timestamps() {
                self.timestamps.catalog_mut().release(t, 1);
            }
        }
        let old = previous.unwrap_or_else(|| col.default_value().clone());

        col.increment_version();
        if col.is_indexed() {
            let members = member_views(views, element);
            self.values.replace(sid, &old, &value, element, members);
        }
        log_trace!(kind = ?E::KIND, element = slot, column = col.id(), "attribute set");
        Ok(old)
    }

    /// Current value of `column` for `element`
    pub(crate) fn get(&self, element: E, column: &str) -> Result<Value> {
        let sid = self
            .table
            .store_id(column)
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' doesn't exist", column)))?;
        Ok(cell(&self.table, self.row(element), sid))
    }

    /// Value of `column` collapsed with the column's estimator
    pub(crate) fn estimate(&self, element: E, column: &str) -> Result<Value> {
        let col = self
            .table
            .column(column)
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' doesn't exist", column)))?;
        let value = self.get(element, column)?;
        if let Value::Dynamic(map) = &value {
            let estimator = col.estimator().unwrap_or(Estimator::First);
            return Ok(map.estimate(estimator).unwrap_or_default());
        }
        Ok(value)
    }

    /// Associate `element` with `timestamp` in the main scope and its views
    pub(crate) fn add_timestamp(&mut self, element: E, timestamp: f64, views: &ViewStore) -> Result<bool> {
        let slot = element.store_id() as usize;
        if slot >= self.rows.len() {
            return Err(Error::invalid_state(format!("no row for {:?} {}", E::KIND, slot)));
        }
        let members = member_views(views, element);
        if !self.timestamps.add(timestamp, element, members)? {
            return Ok(false);
        }
        self.rows[slot].timestamps.insert(OrderedFloat(timestamp));
        log_trace!(kind = ?E::KIND, element = slot, timestamp, "timestamp added");
        Ok(true)
    }

    /// Inverse of [`add_timestamp`](Self::add_timestamp)
    pub(crate) fn remove_timestamp(&mut self, element: E, timestamp: f64) -> bool {
        let Some(row) = self.rows.get_mut(element.store_id() as usize) else {
            return false;
        };
        if !row.timestamps.remove(&OrderedFloat(timestamp)) {
            return false;
        }
        self.timestamps.remove(timestamp, element)
    }

    /// Timestamps of `element`, ascending
    pub(crate) fn timestamps_of(&self, element: E) -> impl Iterator<Item = f64> + '_ {
        self.row(element).into_iter().flat_map(|r| r.timestamps.iter().map(|t| t.0))
    }

    /// Value index of `scope`
    pub(crate) fn index(&self, scope: Scope) -> Result<ElementIndex<'_, E>> {
        let noun = match E::KIND {
            ElementKind::Node => "nodes",
            ElementKind::Edge => "edges",
        };
        match scope {
            Scope::Main => Ok(ElementIndex::new(&self.table, self.values.main(), format!("{} index", noun))),
            Scope::View(view) => {
                let scoped = self
                    .values
                    .view(view)
                    .ok_or(GraphError::ViewNotFound(view))?;
                Ok(ElementIndex::new(&self.table, scoped, format!("{} index of view {}", noun, view)))
            }
        }
    }

    /// Timestamp index of `scope`
    pub(crate) fn timestamp_index(&self, scope: Scope) -> Result<TimestampIndexRef<'_, E>> {
        match scope {
            Scope::Main => Ok(self.timestamps.main()),
            Scope::View(view) => self.timestamps.view(view).ok_or_else(|| {
                Error::invalid_state(format!("view {} has no timestamp index, create it first", view))
            }),
        }
    }
}
