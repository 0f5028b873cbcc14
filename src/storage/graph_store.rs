//! Base graph store
//!
//! Owns topology, attribute stores and views, and routes every mutation so
//! that main-scope and view-scoped indices stay consistent with membership.

use crate::columns::{Column, ColumnBuilder, Table};
use crate::core::config::StoreConfig;
use crate::core::error::{Error, Result};
use crate::core::types::{ColumnStoreId, EdgeId, EdgeTypeId, ElementKind, ElementRef, NodeId, Scope, ViewId};
use crate::core::value::{Estimator, Value};
use crate::index::ElementIndex;
use crate::storage::attributes::AttributeStore;
use crate::storage::records::{ElementStore, MutualFlip};
use crate::system::StoreMetrics;
use crate::timestamp::TimestampIndexRef;
use crate::view::graph_view::MembershipDelta;
use crate::view::{GraphView, ViewGraph, ViewGraphMut, ViewStore};
use crate::{log_debug, log_warn};

/// In-memory graph store with columns, indices and views
#[derive(Debug)]
pub struct GraphStore {
    config: StoreConfig,
    elements: ElementStore,
    nodes: AttributeStore<NodeId>,
    edges: AttributeStore<EdgeId>,
    views: ViewStore,
    metrics: Option<StoreMetrics>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Store with the default configuration
    pub fn new() -> Self {
        let config = StoreConfig::default();
        let metrics = match StoreMetrics::new() {
            Ok(m) => Some(m),
            Err(e) => {
                log_warn!("Failed to register store metrics: {}", e);
                None
            }
        };
        Self::assemble(config, metrics)
    }

    /// Store with a validated configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let metrics = if config.metrics.enabled { Some(StoreMetrics::new()?) } else { None };
        Ok(Self::assemble(config, metrics))
    }

    fn assemble(config: StoreConfig, metrics: Option<StoreMetrics>) -> Self {
        log_debug!(?config, "graph store created");
        Self {
            elements: ElementStore::new(),
            nodes: AttributeStore::new(config.observers.enabled, config.index.nodes),
            edges: AttributeStore::new(config.observers.enabled, config.index.edges),
            views: ViewStore::new(config.view.clone()),
            metrics,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Topology records
    pub fn elements(&self) -> &ElementStore {
        &self.elements
    }

    /// Node columns, rows and indices
    pub fn node_attributes(&self) -> &AttributeStore<NodeId> {
        &self.nodes
    }

    /// Edge columns, rows and indices
    pub fn edge_attributes(&self) -> &AttributeStore<EdgeId> {
        &self.edges
    }

    /// Metrics, when enabled
    pub fn metrics(&self) -> Option<&StoreMetrics> {
        self.metrics.as_ref()
    }

    /// Prometheus text exposition of this store's metrics
    pub fn render_metrics(&self) -> Result<String> {
        self.metrics
            .as_ref()
            .ok_or_else(|| Error::invalid_state("metrics are disabled for this store"))?
            .render()
    }

    fn record<F: FnOnce(&StoreMetrics)>(&self, f: F) {
        if let Some(m) = &self.metrics {
            f(m);
        }
    }

    fn sync_size_gauges(&self) {
        self.record(|m| {
            m.size.live_nodes.set(self.elements.node_count() as i64);
            m.size.live_edges.set(self.elements.edge_count() as i64);
            m.size.live_views.set(self.views.len() as i64);
        });
    }

    // ---- topology ----

    /// Register an edge type label
    pub fn add_edge_type(&mut self, label: &str) -> Result<EdgeTypeId> {
        self.elements.add_edge_type(label)
    }

    /// Add a node with a unique label
    pub fn add_node(&mut self, label: impl Into<String>) -> Result<NodeId> {
        let node = self.elements.insert_node(label.into())?;
        self.nodes.on_insert(node);
        self.record(|m| m.operations.nodes_added.inc());
        self.sync_size_gauges();
        log_debug!(node = %node, "node added");
        Ok(node)
    }

    /// Add an edge between two live nodes
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, edge_type: EdgeTypeId) -> Result<EdgeId> {
        let (edge, flip) = self.elements.insert_edge(source, target, edge_type)?;
        self.edges.on_insert(edge);
        if let Some(flip) = flip {
            self.apply_mutual_flip(flip);
        }
        self.record(|m| m.operations.edges_added.inc());
        self.sync_size_gauges();
        log_debug!(edge = %edge, source = %source, target = %target, edge_type, "edge added");
        Ok(edge)
    }

    /// Remove an edge from every view, then from the store
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<()> {
        self.elements.edge(edge)?;
        for view in self.views.iter_mut() {
            if view.remove_edge(&self.elements, edge)? {
                self.edges.view_leave(view.id(), edge);
            }
        }
        self.edges.on_remove(edge);
        let (_, flip) = self.elements.remove_edge(edge)?;
        if let Some(flip) = flip {
            self.apply_mutual_flip(flip);
        }
        self.record(|m| m.operations.edges_removed.inc());
        self.sync_size_gauges();
        log_debug!(edge = %edge, "edge removed");
        Ok(())
    }

    /// Remove a node with its incident edges from every view, then from the store
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        let incident: Vec<EdgeId> = self.elements.incident(node)?.collect();
        for edge in incident {
            self.remove_edge(edge)?;
        }
        let mut cascaded = Vec::new();
        for view in self.views.iter_mut() {
            if view.remove_node(&self.elements, node, &mut cascaded)? {
                self.nodes.view_leave(view.id(), node);
            }
        }
        self.nodes.on_remove(node);
        self.elements.remove_node(node)?;
        self.record(|m| m.operations.nodes_removed.inc());
        self.sync_size_gauges();
        log_debug!(node = %node, "node removed");
        Ok(())
    }

    fn apply_mutual_flip(&mut self, flip: MutualFlip) {
        if !flip.counted {
            return;
        }
        let Ok(edge_type) = self.elements.edge(flip.edge).map(|r| r.edge_type) else {
            return;
        };
        for view in self.views.iter_mut() {
            view.set_mutual(flip.edge, edge_type, flip.mutual);
        }
    }

    /// Node carrying `label`
    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.elements.node_by_label(label)
    }

    /// Edge from `source` to `target` of `edge_type`
    pub fn edge(&self, source: NodeId, target: NodeId, edge_type: EdgeTypeId) -> Option<EdgeId> {
        self.elements.find_edge(source, target, edge_type)
    }

    /// Every edge incident to `node`
    pub fn edges_of(&self, node: NodeId) -> Result<impl Iterator<Item = EdgeId> + '_> {
        self.elements.incident(node)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.elements.node_count()
    }

    /// Number of live edges
    pub fn edge_count(&self) -> usize {
        self.elements.edge_count()
    }

    // ---- columns and attributes ----

    /// Column table of `kind`
    pub fn table(&self, kind: ElementKind) -> &Table {
        match kind {
            ElementKind::Node => self.nodes.table(),
            ElementKind::Edge => self.edges.table(),
        }
    }

    /// Create a column on the `kind` table
    pub fn create_column(&mut self, kind: ElementKind, builder: ColumnBuilder) -> Result<ColumnStoreId> {
        match kind {
            ElementKind::Node => self.nodes.create_column(builder, self.elements.nodes(), &self.views),
            ElementKind::Edge => self.edges.create_column(builder, self.elements.edges(), &self.views),
        }
    }

    /// Remove a column from the `kind` table
    pub fn remove_column(&mut self, kind: ElementKind, id: &str) -> Result<Column> {
        match kind {
            ElementKind::Node => self.nodes.remove_column(id),
            ElementKind::Edge => self.edges.remove_column(id),
        }
    }

    /// Change the estimator of a dynamic column
    pub fn set_estimator(&mut self, kind: ElementKind, column: &str, estimator: Estimator) -> Result<()> {
        match kind {
            ElementKind::Node => self.nodes.column_mut(column)?.set_estimator(estimator),
            ElementKind::Edge => self.edges.column_mut(column)?.set_estimator(estimator),
        }
    }

    /// Write an attribute, returning the previous value
    pub fn set_attribute(&mut self, element: impl Into<ElementRef>, column: &str, value: Value) -> Result<Value> {
        let old = match element.into() {
            ElementRef::Node(node) => {
                self.elements.node(node)?;
                self.nodes.set(node, column, value, &self.views)?
            }
            ElementRef::Edge(edge) => {
                self.elements.edge(edge)?;
                self.edges.set(edge, column, value, &self.views)?
            }
        };
        self.record(|m| m.operations.attributes_set.inc());
        Ok(old)
    }

    /// Read an attribute; unset cells read as the column default
    pub fn attribute(&self, element: impl Into<ElementRef>, column: &str) -> Result<Value> {
        match element.into() {
            ElementRef::Node(node) => {
                self.elements.node(node)?;
                self.nodes.get(node, column)
            }
            ElementRef::Edge(edge) => {
                self.elements.edge(edge)?;
                self.edges.get(edge, column)
            }
        }
    }

    /// Read an attribute collapsed by the column's estimator
    pub fn estimate(&self, element: impl Into<ElementRef>, column: &str) -> Result<Value> {
        match element.into() {
            ElementRef::Node(node) => {
                self.elements.node(node)?;
                self.nodes.estimate(node, column)
            }
            ElementRef::Edge(edge) => {
                self.elements.edge(edge)?;
                self.edges.estimate(edge, column)
            }
        }
    }

    // ---- element timestamps ----

    /// Associate a node with a timestamp
    pub fn add_node_timestamp(&mut self, node: NodeId, timestamp: f64) -> Result<bool> {
        self.elements.node(node)?;
        self.nodes.add_timestamp(node, timestamp, &self.views)
    }

    /// Drop a node's timestamp
    pub fn remove_node_timestamp(&mut self, node: NodeId, timestamp: f64) -> Result<bool> {
        self.elements.node(node)?;
        Ok(self.nodes.remove_timestamp(node, timestamp))
    }

    /// Associate an edge with a timestamp
    pub fn add_edge_timestamp(&mut self, edge: EdgeId, timestamp: f64) -> Result<bool> {
        self.elements.edge(edge)?;
        self.edges.add_timestamp(edge, timestamp, &self.views)
    }

    /// Drop an edge's timestamp
    pub fn remove_edge_timestamp(&mut self, edge: EdgeId, timestamp: f64) -> Result<bool> {
        self.elements.edge(edge)?;
        Ok(self.edges.remove_timestamp(edge, timestamp))
    }

    /// Timestamps of a node, ascending
    pub fn node_timestamps(&self, node: NodeId) -> Result<Vec<f64>> {
        self.elements.node(node)?;
        Ok(self.nodes.timestamps_of(node).collect())
    }

    /// Timestamps of an edge, ascending
    pub fn edge_timestamps(&self, edge: EdgeId) -> Result<Vec<f64>> {
        self.elements.edge(edge)?;
        Ok(self.edges.timestamps_of(edge).collect())
    }

    // ---- indices ----

    fn check_scope(&self, scope: Scope) -> Result<()> {
        if let Scope::View(view) = scope {
            self.views.get(view)?;
        }
        Ok(())
    }

    /// Node value index of `scope`
    pub fn node_index(&self, scope: Scope) -> Result<ElementIndex<'_, NodeId>> {
        self.check_scope(scope)?;
        self.record(|m| m.index.value_queries.inc());
        self.nodes.index(scope)
    }

    /// Edge value index of `scope`
    pub fn edge_index(&self, scope: Scope) -> Result<ElementIndex<'_, EdgeId>> {
        self.check_scope(scope)?;
        self.record(|m| m.index.value_queries.inc());
        self.edges.index(scope)
    }

    /// Node timestamp index of `scope`
    pub fn node_timestamp_index(&self, scope: Scope) -> Result<TimestampIndexRef<'_, NodeId>> {
        self.check_scope(scope)?;
        self.record(|m| m.index.timestamp_queries.inc());
        self.nodes.timestamp_index(scope)
    }

    /// Edge timestamp index of `scope`
    pub fn edge_timestamp_index(&self, scope: Scope) -> Result<TimestampIndexRef<'_, EdgeId>> {
        self.check_scope(scope)?;
        self.record(|m| m.index.timestamp_queries.inc());
        self.edges.timestamp_index(scope)
    }

    /// Build node and edge timestamp indices scoped to `view`
    ///
    /// The indices follow the view's membership from then on.
    pub fn create_view_index(&mut self, view: ViewId) -> Result<()> {
        let graph_view = self.views.get(view)?;
        self.nodes.create_view_index(graph_view);
        self.edges.create_view_index(graph_view);
        Ok(())
    }

    // ---- views ----

    /// Create an empty view sized to the current id bounds
    pub fn create_view(&mut self) -> ViewId {
        let view = self
            .views
            .create_view(self.elements.node_capacity(), self.elements.edge_capacity());
        self.nodes.view_created(view);
        self.edges.view_created(view);
        self.record(|m| m.views.views_created.inc());
        self.sync_size_gauges();
        view
    }

    /// Destroy a view and every index bound to it
    pub fn destroy_view(&mut self, view: ViewId) -> Result<()> {
        self.views.destroy_view(view)?;
        self.nodes.view_destroyed(view);
        self.edges.view_destroyed(view);
        self.record(|m| m.views.views_destroyed.inc());
        self.sync_size_gauges();
        Ok(())
    }

    /// Membership and counters of a view
    pub fn view(&self, view: ViewId) -> Result<&GraphView> {
        self.views.get(view)
    }

    /// Every live view
    pub fn views(&self) -> impl Iterator<Item = &GraphView> {
        self.views.iter()
    }

    /// Read handle over a view
    pub fn view_graph(&self, view: ViewId) -> Result<ViewGraph<'_>> {
        Ok(ViewGraph::new(&self.elements, self.views.get(view)?))
    }

    /// Mutating handle over a view
    pub fn view_graph_mut(&mut self, view: ViewId) -> Result<ViewGraphMut<'_>> {
        self.views.get(view)?;
        Ok(ViewGraphMut::new(self, view))
    }

    /// Add a node to a view
    pub fn view_add_node(&mut self, view: ViewId, node: NodeId) -> Result<bool> {
        let changed = self.views.get_mut(view)?.add_node(&self.elements, node)?;
        if changed {
            self.nodes.view_join(view, node);
        }
        Ok(changed)
    }

    /// Add an edge to a view; both endpoints must be members
    pub fn view_add_edge(&mut self, view: ViewId, edge: EdgeId) -> Result<bool> {
        let changed = self.views.get_mut(view)?.add_edge(&self.elements, edge)?;
        if changed {
            self.edges.view_join(view, edge);
        }
        Ok(changed)
    }

    /// Remove a node and its member edges from a view
    pub fn view_remove_node(&mut self, view: ViewId, node: NodeId) -> Result<bool> {
        let mut delta = MembershipDelta::default();
        let changed = self.views.get_mut(view)?.remove_node(&self.elements, node, &mut delta.edges)?;
        if changed {
            delta.nodes.push(node);
        }
        self.mirror_leave(view, &delta);
        Ok(changed)
    }

    /// Remove an edge from a view
    pub fn view_remove_edge(&mut self, view: ViewId, edge: EdgeId) -> Result<bool> {
        let changed = self.views.get_mut(view)?.remove_edge(&self.elements, edge)?;
        if changed {
            self.edges.view_leave(view, edge);
        }
        Ok(changed)
    }

    /// Add several nodes to a view, all or nothing
    pub fn view_add_nodes<I>(&mut self, view: ViewId, nodes: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let nodes = self.views.get_mut(view)?.join_nodes(&self.elements, nodes)?;
        let delta = MembershipDelta { nodes, edges: Vec::new() };
        self.mirror_join(view, &delta);
        Ok(!delta.is_empty())
    }

    /// Add several edges to a view, all or nothing
    pub fn view_add_edges<I>(&mut self, view: ViewId, edges: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let edges = self.views.get_mut(view)?.join_edges(&self.elements, edges)?;
        let delta = MembershipDelta { nodes: Vec::new(), edges };
        self.mirror_join(view, &delta);
        Ok(!delta.is_empty())
    }

    /// Remove several nodes and their member edges from a view, all or nothing
    pub fn view_remove_nodes<I>(&mut self, view: ViewId, nodes: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let delta = self.views.get_mut(view)?.leave_nodes(&self.elements, nodes)?;
        self.mirror_leave(view, &delta);
        Ok(!delta.nodes.is_empty())
    }

    /// Remove several edges from a view, all or nothing
    pub fn view_remove_edges<I>(&mut self, view: ViewId, edges: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let edges = self.views.get_mut(view)?.leave_edges(&self.elements, edges)?;
        let delta = MembershipDelta { nodes: Vec::new(), edges };
        self.mirror_leave(view, &delta);
        Ok(!delta.is_empty())
    }

    /// Add every node, then every edge, of the store to a view
    pub fn view_fill(&mut self, view: ViewId) -> Result<bool> {
        let delta = self.views.get_mut(view)?.fill_members(&self.elements)?;
        self.mirror_join(view, &delta);
        Ok(!delta.is_empty())
    }

    /// Empty a view
    pub fn view_clear(&mut self, view: ViewId) -> Result<()> {
        self.views.get_mut(view)?.clear();
        self.nodes.view_cleared(view)?;
        self.edges.view_cleared(view)
    }

    /// Drop every edge of a view, keeping its nodes
    pub fn view_clear_edges(&mut self, view: ViewId) -> Result<()> {
        self.views.get_mut(view)?.clear_edges();
        self.edges.view_cleared(view)
    }

    fn mirror_join(&mut self, view: ViewId, delta: &MembershipDelta) {
        for node in &delta.nodes {
            self.nodes.view_join(view, *node);
        }
        for edge in &delta.edges {
            self.edges.view_join(view, *edge);
        }
    }

    fn mirror_leave(&mut self, view: ViewId, delta: &MembershipDelta) {
        for edge in &delta.edges {
            self.edges.view_leave(view, *edge);
        }
        for node in &delta.nodes {
            self.nodes.view_leave(view, *node);
        }
    }
}
