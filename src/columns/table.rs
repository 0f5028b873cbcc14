//! Per-kind column catalog

use ahash::AHashMap;

use crate::columns::column::{Column, ColumnBuilder};
use crate::core::error::{Error, Result};
use crate::core::types::{ColumnStoreId, ElementKind};
use crate::structures::IdSpace;
use crate::log_debug;

/// Column registry of one element kind
#[derive(Debug)]
pub struct Table {
    kind: ElementKind,
    columns: Vec<Option<Column>>,
    by_id: AHashMap<String, ColumnStoreId>,
    ids: IdSpace,
    observers_enabled: bool,
}

impl Table {
    /// Empty table for `kind`
    pub fn new(kind: ElementKind, observers_enabled: bool) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            by_id: AHashMap::new(),
            ids: IdSpace::new(),
            observers_enabled,
        }
    }

    /// Element kind described by this table
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Create and attach a column
    pub fn create_column(&mut self, builder: ColumnBuilder) -> Result<ColumnStoreId> {
        let mut column = Column::new(builder, self.observers_enabled)?;
        if self.by_id.contains_key(column.id()) {
            return Err(Error::invalid_argument(format!(
                "The column '{}' already exists",
                column.id()
            )));
        }
        let raw = self.ids.allocate();
        let store_id = match ColumnStoreId::try_from(raw) {
            Ok(id) => id,
            Err(_) => {
                self.ids.free(raw)?;
                return Err(Error::invalid_state("column limit reached"));
            }
        };
        column.table = Some(self.kind);
        column.store_id = Some(store_id);
        log_debug!(table = ?self.kind, column = column.id(), store_id, "column created");

        let slot = store_id as usize;
        if slot >= self.columns.len() {
            self.columns.resize_with(slot + 1, || None);
        }
        self.by_id.insert(column.id().to_string(), store_id);
        self.columns[slot] = Some(column);
        Ok(store_id)
    }

    /// Detach a column, returning it
    pub fn remove_column(&mut self, id: &str) -> Result<Column> {
        let store_id = self
            .by_id
            .remove(&id.to_lowercase())
            .ok_or_else(|| Error::invalid_argument(format!("The column '{}' doesn't exist", id)))?;
        self.ids.free(store_id as u32)?;
        let mut column = self.columns[store_id as usize]
            .take()
            .ok_or_else(|| Error::invalid_state(format!("column slot {} is empty", store_id)))?;
        column.destroy_all_observers();
        column.table = None;
        column.store_id = None;
        log_debug!(table = ?self.kind, column = column.id(), "column removed");
        Ok(column)
    }

    /// Look a column up by id (case-insensitive)
    pub fn column(&self, id: &str) -> Option<&Column> {
        let store_id = self.store_id(id)?;
        self.by_store_id(store_id)
    }

    /// Mutable lookup by id
    pub fn column_mut(&mut self, id: &str) -> Option<&mut Column> {
        let store_id = self.store_id(id)?;
        self.columns.get_mut(store_id as usize)?.as_mut()
    }

    /// Store id of a column
    pub fn store_id(&self, id: &str) -> Option<ColumnStoreId> {
        match self.by_id.get(id) {
            Some(sid) => Some(*sid),
            None => self.by_id.get(&id.to_lowercase()).copied(),
        }
    }

    /// Look a column up by store id
    pub fn by_store_id(&self, store_id: ColumnStoreId) -> Option<&Column> {
        self.columns.get(store_id as usize)?.as_ref()
    }

    /// Whether a column with this id exists
    pub fn has_column(&self, id: &str) -> bool {
        self.store_id(id).is_some()
    }

    /// Attached columns in store id order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().flatten()
    }

    /// Number of attached columns
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no column is attached
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Exclusive bound of column store ids
    pub fn slot_count(&self) -> usize {
        self.columns.len()
    }
}
