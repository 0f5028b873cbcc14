//! Timestamp indices of one element kind: main scope, view scopes, shared catalog

use ahash::AHashMap;
use std::marker::PhantomData;

use crate::core::error::{GraphError, Result};
use crate::core::types::{Element, ViewId};
use crate::timestamp::catalog::TimestampCatalog;
use crate::timestamp::index::{TimestampIndex, TimestampIndexRef};

/// Main and view-scoped timestamp indices over a shared catalog
///
/// The catalog holds one reference per main-scope association. Dynamic
/// attribute values may hold extra references through
/// [`catalog_mut`](Self::catalog_mut); view scopes never hold any.
#[derive(Debug)]
pub struct TimestampIndexStore<E: Element> {
    catalog: TimestampCatalog,
    main: TimestampIndex,
    views: AHashMap<ViewId, TimestampIndex>,
    _pd: PhantomData<E>,
}

impl<E: Element> Default for TimestampIndexStore<E> {
    fn default() -> Self {
        Self {
            catalog: TimestampCatalog::new(),
            main: TimestampIndex::new(),
            views: AHashMap::new(),
            _pd: PhantomData,
        }
    }
}

impl<E: Element> TimestampIndexStore<E> {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared catalog
    pub fn catalog(&self) -> &TimestampCatalog {
        &self.catalog
    }

    pub(crate) fn catalog_mut(&mut self) -> &mut TimestampCatalog {
        &mut self.catalog
    }

    /// Query handle over the main scope
    pub fn main(&self) -> TimestampIndexRef<'_, E> {
        TimestampIndexRef::new(&self.catalog, &self.main)
    }

    /// Query handle over a view scope, if it was created
    pub fn view(&self, view: ViewId) -> Option<TimestampIndexRef<'_, E>> {
        self.views.get(&view).map(|index| TimestampIndexRef::new(&self.catalog, index))
    }

    /// Whether `view` has a scoped index
    pub fn has_view_index(&self, view: ViewId) -> bool {
        self.views.contains_key(&view)
    }

    /// Associate `element` with `timestamp` in the main scope and in each of
    /// `views` that has a scoped index
    ///
    /// Returns false when the association already existed.
    pub fn add(&mut self, timestamp: f64, element: E, views: impl IntoIterator<Item = ViewId>) -> Result<bool> {
        if let Some(ord) = self.catalog.ordinal(timestamp) {
            if self.main.contains(ord, element.store_id()) {
                return Ok(false);
            }
        }
        let ord = self.catalog.acquire(timestamp)?;
        self.main.add(ord, timestamp, element.store_id());
        for view in views {
            if let Some(index) = self.views.get_mut(&view) {
                index.add(ord, timestamp, element.store_id());
            }
        }
        Ok(true)
    }

    /// Drop the association from every scope
    pub fn remove(&mut self, timestamp: f64, element: E) -> bool {
        let Some(ord) = self.catalog.ordinal(timestamp) else {
            return false;
        };
        if !self.main.remove(&self.catalog, ord, timestamp, element.store_id()) {
            return false;
        }
        for index in self.views.values_mut() {
            index.remove(&self.catalog, ord, timestamp, element.store_id());
        }
        self.catalog.release(timestamp, 1);
        true
    }

    /// Build the scoped index of `view` from the main scope, keeping elements
    /// for which `is_member` holds
    ///
    /// Rebuilding an existing view index replaces it.
    pub fn create_view_index(&mut self, view: ViewId, is_member: impl Fn(E) -> bool) {
        let mut index = TimestampIndex::new();
        for (t, ord) in self.catalog.iter() {
            for raw in self.main.at(ord) {
                if is_member(E::from_store_id(raw)) {
                    index.add(ord, t, raw);
                }
            }
        }
        self.views.insert(view, index);
    }

    /// Mirror an element's timestamps into `view` after it joined the view
    pub fn view_add_element(&mut self, view: ViewId, element: E, timestamps: impl IntoIterator<Item = f64>) {
        let Some(index) = self.views.get_mut(&view) else {
            return;
        };
        for t in timestamps {
            if let Some(ord) = self.catalog.ordinal(t) {
                index.add(ord, t, element.store_id());
            }
        }
    }

    /// Drop an element's timestamps from `view` after it left the view
    pub fn view_remove_element(&mut self, view: ViewId, element: E, timestamps: impl IntoIterator<Item = f64>) {
        let Some(index) = self.views.get_mut(&view) else {
            return;
        };
        for t in timestamps {
            if let Some(ord) = self.catalog.ordinal(t) {
                index.remove(&self.catalog, ord, t, element.store_id());
            }
        }
    }

    /// Empty the scoped index of `view` without destroying it
    pub fn clear_view(&mut self, view: ViewId) -> Result<()> {
        self.views
            .get_mut(&view)
            .ok_or(GraphError::ViewNotFound(view))?
            .clear();
        Ok(())
    }

    /// Forget the scoped index of `view`
    pub fn destroy_view_index(&mut self, view: ViewId) -> bool {
        self.views.remove(&view).is_some()
    }
}
