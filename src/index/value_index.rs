//! Inverted value index per column, per scope

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::columns::Table;
use crate::core::error::{Error, Result};
use crate::core::types::{ColumnStoreId, Element, ElementKind, ViewId};
use crate::core::value::Value;

/// Value to element-set buckets for one column
#[derive(Debug, Default, Clone)]
pub struct ColumnIndex {
    buckets: AHashMap<Value, AHashSet<u32>>,
    /// Numeric keys of non-empty buckets with the number of buckets mapping
    /// to each; distinct longs can share one `f64`
    numbers: BTreeMap<OrderedFloat<f64>, usize>,
    len: usize,
}

impl ColumnIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// File `element` under `value`; returns whether it was newly added
    pub fn insert(&mut self, value: &Value, element: u32) -> bool {
        let added = match self.buckets.get_mut(value) {
            Some(bucket) => bucket.insert(element),
            None => {
                if let Some(x) = value.as_f64() {
                    *self.numbers.entry(OrderedFloat(x)).or_insert(0) += 1;
                }
                let mut bucket = AHashSet::new();
                bucket.insert(element);
                self.buckets.insert(value.clone(), bucket);
                true
            }
        };
        if added {
            self.len += 1;
        }
        added
    }

    /// Take `element` out of the `value` bucket; returns whether it was present
    pub fn remove(&mut self, value: &Value, element: u32) -> bool {
        let Some(bucket) = self.buckets.get_mut(value) else {
            return false;
        };
        if !bucket.remove(&element) {
            return false;
        }
        self.len -= 1;
        if bucket.is_empty() {
            self.buckets.remove(value);
            if let Some(x) = value.as_f64() {
                let key = OrderedFloat(x);
                if let Some(refs) = self.numbers.get_mut(&key) {
                    *refs -= 1;
                    if *refs == 0 {
                        self.numbers.remove(&key);
                    }
                }
            }
        }
        true
    }

    /// Move `element` from `old` to `new`
    pub fn replace(&mut self, old: &Value, new: &Value, element: u32) {
        if old != new {
            self.remove(old, element);
            self.insert(new, element);
        }
    }

    /// Number of elements holding `value`
    pub fn count(&self, value: &Value) -> usize {
        self.buckets.get(value).map_or(0, |b| b.len())
    }

    /// Raw ids of the elements holding `value`
    pub fn get(&self, value: &Value) -> impl Iterator<Item = u32> + '_ {
        self.buckets.get(value).into_iter().flat_map(|b| b.iter().copied())
    }

    /// Every `(value, element)` pair
    pub fn iter(&self) -> impl Iterator<Item = (&Value, u32)> + '_ {
        self.buckets.iter().flat_map(|(v, b)| b.iter().map(move |&e| (v, e)))
    }

    /// Distinct values present
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.buckets.keys()
    }

    /// Smallest numeric value present
    pub fn min_value(&self) -> Option<f64> {
        self.numbers.first_key_value().map(|(x, _)| x.0)
    }

    /// Largest numeric value present
    pub fn max_value(&self) -> Option<f64> {
        self.numbers.last_key_value().map(|(x, _)| x.0)
    }

    /// Number of indexed elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.numbers.clear();
        self.len = 0;
    }
}

/// Column indices of one scope, addressed by column store id
#[derive(Debug, Clone)]
pub struct ScopeIndex<E: Element> {
    columns: Vec<Option<ColumnIndex>>,
    _pd: PhantomData<E>,
}

impl<E: Element> Default for ScopeIndex<E> {
    fn default() -> Self {
        Self { columns: Vec::new(), _pd: PhantomData }
    }
}

impl<E: Element> ScopeIndex<E> {
    /// Index of a column, if it is indexed
    pub fn column(&self, column: ColumnStoreId) -> Option<&ColumnIndex> {
        self.columns.get(column as usize)?.as_ref()
    }

    pub(crate) fn column_mut(&mut self, column: ColumnStoreId) -> Option<&mut ColumnIndex> {
        self.columns.get_mut(column as usize)?.as_mut()
    }

    pub(crate) fn add_column(&mut self, column: ColumnStoreId) {
        let slot = column as usize;
        if slot >= self.columns.len() {
            self.columns.resize_with(slot + 1, || None);
        }
        self.columns[slot] = Some(ColumnIndex::new());
    }

    pub(crate) fn remove_column(&mut self, column: ColumnStoreId) {
        if let Some(slot) = self.columns.get_mut(column as usize) {
            *slot = None;
        }
    }

    /// File `element` under `value` in every indexed column of `values`
    pub(crate) fn insert_element(&mut self, element: E, values: impl Fn(ColumnStoreId) -> Value) {
        for (sid, index) in self.columns.iter_mut().enumerate() {
            if let Some(index) = index {
                index.insert(&values(sid as ColumnStoreId), element.store_id());
            }
        }
    }

    pub(crate) fn remove_element(&mut self, element: E, values: impl Fn(ColumnStoreId) -> Value) {
        for (sid, index) in self.columns.iter_mut().enumerate() {
            if let Some(index) = index {
                index.remove(&values(sid as ColumnStoreId), element.store_id());
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.columns.iter_mut().flatten().for_each(ColumnIndex::clear);
    }
}

/// Value indices of one element kind: the main scope plus one per view
#[derive(Debug)]
pub struct ValueIndexStore<E: Element> {
    enabled: bool,
    main: ScopeIndex<E>,
    views: AHashMap<ViewId, ScopeIndex<E>>,
}

impl<E: Element> ValueIndexStore<E> {
    /// Store; when `enabled` is false no column is ever indexed
    pub fn new(enabled: bool) -> Self {
        Self { enabled, main: ScopeIndex::default(), views: AHashMap::new() }
    }

    /// Whether indexing is enabled for this kind
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Main scope
    pub fn main(&self) -> &ScopeIndex<E> {
        &self.main
    }

    pub(crate) fn main_mut(&mut self) -> &mut ScopeIndex<E> {
        &mut self.main
    }

    /// View scope
    pub fn view(&self, view: ViewId) -> Option<&ScopeIndex<E>> {
        self.views.get(&view)
    }

    pub(crate) fn view_mut(&mut self, view: ViewId) -> Option<&mut ScopeIndex<E>> {
        self.views.get_mut(&view)
    }

    /// Create an empty index for `column` in every scope
    pub(crate) fn add_column(&mut self, column: ColumnStoreId) {
        if !self.enabled {
            return;
        }
        self.main.add_column(column);
        for scope in self.views.values_mut() {
            scope.add_column(column);
        }
    }

    pub(crate) fn remove_column(&mut self, column: ColumnStoreId) {
        self.main.remove_column(column);
        for scope in self.views.values_mut() {
            scope.remove_column(column);
        }
    }

    /// Register an empty view scope mirroring the main scope's columns
    pub(crate) fn create_view(&mut self, view: ViewId) {
        let mut scope = ScopeIndex::default();
        for (sid, index) in self.main.columns.iter().enumerate() {
            if index.is_some() {
                scope.add_column(sid as ColumnStoreId);
            }
        }
        self.views.insert(view, scope);
    }

    pub(crate) fn destroy_view(&mut self, view: ViewId) {
        self.views.remove(&view);
    }

    /// Apply a value change of `element` to the main scope and to `views`
    pub(crate) fn replace(
        &mut self,
        column: ColumnStoreId,
        old: &Value,
        new: &Value,
        element: E,
        views: impl IntoIterator<Item = ViewId>,
    ) {
        if let Some(index) = self.main.column_mut(column) {
            index.replace(old, new, element.store_id());
        } else {
            return;
        }
        for view in views {
            if let Some(index) = self.views.get_mut(&view).and_then(|s| s.column_mut(column)) {
                index.replace(old, new, element.store_id());
            }
        }
    }
}

/// Read handle implementing the index contract over one scope
pub struct ElementIndex<'a, E: Element> {
    table: &'a Table,
    scope: &'a ScopeIndex<E>,
    name: String,
}

impl<'a, E: Element> ElementIndex<'a, E> {
    pub(crate) fn new(table: &'a Table, scope: &'a ScopeIndex<E>, name: String) -> Self {
        Self { table, scope, name }
    }

    fn column_index(&self, column: &str) -> Result<&'a ColumnIndex> {
        let col = self.table.column(column).ok_or_else(|| {
            Error::invalid_argument(format!("The column '{}' doesn't belong to the {:?} table", column, E::KIND))
        })?;
        if !col.is_indexed() {
            return Err(Error::invalid_argument(format!("The column '{}' is not indexed", col.id())));
        }
        let sid = col
            .store_id()
            .ok_or_else(|| Error::invalid_state(format!("column '{}' is detached", col.id())))?;
        self.scope
            .column(sid)
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' is not indexed", col.id())))
    }

    /// Number of elements whose `column` equals `value`
    pub fn count(&self, column: &str, value: &Value) -> Result<usize> {
        Ok(self.column_index(column)?.count(value))
    }

    /// Elements whose `column` equals `value`
    pub fn get(&self, column: &str, value: &Value) -> Result<impl Iterator<Item = E> + 'a> {
        let index = self.column_index(column)?;
        Ok(index
            .buckets
            .get(value)
            .into_iter()
            .flat_map(|b| b.iter().map(|&e| E::from_store_id(e))))
    }

    /// Every `(value, element)` pair of `column`
    pub fn entries(&self, column: &str) -> Result<impl Iterator<Item = (&'a Value, E)> + 'a> {
        let index = self.column_index(column)?;
        Ok(index.iter().map(|(v, e)| (v, E::from_store_id(e))))
    }

    /// Smallest numeric value of `column`, `None` if there is none
    pub fn min_value(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.column_index(column)?.min_value())
    }

    /// Largest numeric value of `column`, `None` if there is none
    pub fn max_value(&self, column: &str) -> Result<Option<f64>> {
        Ok(self.column_index(column)?.max_value())
    }

    /// Element kind served by this index
    pub fn index_kind(&self) -> ElementKind {
        E::KIND
    }

    /// Descriptive name of the index
    pub fn index_name(&self) -> &str {
        &self.name
    }
}
