//! Collection of views bound to one base store

use crate::core::config::ViewConfig;
use crate::core::error::{GraphError, Result};
use crate::core::types::ViewId;
use crate::structures::IdSpace;
use crate::view::graph_view::GraphView;
use crate::log_debug;

/// Owner of every live view of a store
#[derive(Debug)]
pub struct ViewStore {
    config: ViewConfig,
    ids: IdSpace,
    views: Vec<Option<GraphView>>,
}

impl ViewStore {
    /// Empty view store
    pub fn new(config: ViewConfig) -> Self {
        Self { config, ids: IdSpace::new(), views: Vec::new() }
    }

    /// Allocate an empty view sized to the given id bounds
    pub fn create_view(&mut self, node_capacity: usize, edge_capacity: usize) -> ViewId {
        let id = ViewId(self.ids.allocate());
        let slot = id.0 as usize;
        if slot >= self.views.len() {
            self.views.resize_with(slot + 1, || None);
        }
        self.views[slot] = Some(GraphView::new(id, node_capacity, edge_capacity, &self.config));
        log_debug!(view = %id, node_capacity, edge_capacity, "view created");
        id
    }

    /// Release a view, returning it
    pub fn destroy_view(&mut self, id: ViewId) -> Result<GraphView> {
        let view = self
            .views
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(GraphError::ViewNotFound(id))?;
        self.ids.free(id.0)?;
        log_debug!(view = %id, "view destroyed");
        Ok(view)
    }

    /// Live view
    pub fn get(&self, id: ViewId) -> Result<&GraphView> {
        self.views
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::ViewNotFound(id).into())
    }

    /// Live view, mutably
    pub fn get_mut(&mut self, id: ViewId) -> Result<&mut GraphView> {
        self.views
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| GraphError::ViewNotFound(id).into())
    }

    /// Whether `id` names a live view
    pub fn contains(&self, id: ViewId) -> bool {
        self.ids.is_live(id.0)
    }

    /// Live views
    pub fn iter(&self) -> impl Iterator<Item = &GraphView> {
        self.views.iter().flatten()
    }

    /// Live views, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GraphView> {
        self.views.iter_mut().flatten()
    }

    /// Number of live views
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no view is live
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
