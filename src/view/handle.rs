//! Graph handles composed over a view

use ahash::AHashSet;

use crate::core::error::{Error, Result};
use crate::core::types::{EdgeId, EdgeTypeId, ElementRef, NodeId, ViewId};
use crate::storage::records::ElementStore;
use crate::storage::GraphStore;
use crate::view::graph_view::GraphView;

/// Read-only traversal over the members of a view
#[derive(Clone, Copy)]
pub struct ViewGraph<'a> {
    store: &'a ElementStore,
    view: &'a GraphView,
}

impl<'a> ViewGraph<'a> {
    pub(crate) fn new(store: &'a ElementStore, view: &'a GraphView) -> Self {
        Self { store, view }
    }

    /// Underlying view
    pub fn view(&self) -> &'a GraphView {
        self.view
    }

    /// Member nodes
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.view.nodes()
    }

    /// Member edges
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + 'a {
        self.view.edges()
    }

    /// Whether `node` is a member
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.view.contains_node(node)
    }

    /// Whether `edge` is a member
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.view.contains_edge(edge)
    }

    /// Number of member nodes
    pub fn node_count(&self) -> usize {
        self.view.node_count()
    }

    /// Number of member edges
    pub fn edge_count(&self) -> usize {
        self.view.edge_count()
    }

    /// Member edge count with mutual pairs counted once
    pub fn undirected_edge_count(&self) -> usize {
        self.view.undirected_edge_count()
    }

    /// Member edges of one type
    pub fn edge_count_of_type(&self, edge_type: EdgeTypeId) -> Result<usize> {
        self.view.edge_count_of_type(edge_type)
    }

    /// Outgoing member edges of `node`
    pub fn out_edges(&self, node: NodeId) -> Result<impl Iterator<Item = EdgeId> + 'a> {
        let view = self.view;
        let rec = self.store.node(node)?;
        Ok(rec.outgoing().iter().copied().filter(move |e| view.contains_edge(*e)))
    }

    /// Incoming member edges of `node`
    pub fn in_edges(&self, node: NodeId) -> Result<impl Iterator<Item = EdgeId> + 'a> {
        let view = self.view;
        let rec = self.store.node(node)?;
        Ok(rec.incoming().iter().copied().filter(move |e| view.contains_edge(*e)))
    }

    /// Number of outgoing member edges
    pub fn out_degree(&self, node: NodeId) -> Result<usize> {
        Ok(self.out_edges(node)?.count())
    }

    /// Number of incoming member edges
    pub fn in_degree(&self, node: NodeId) -> Result<usize> {
        Ok(self.in_edges(node)?.count())
    }

    /// In plus out degree; a self loop counts twice
    pub fn degree(&self, node: NodeId) -> Result<usize> {
        Ok(self.out_degree(node)? + self.in_degree(node)?)
    }

    /// Distinct member neighbours of `node` reached through member edges
    pub fn neighbors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        for edge in self.out_edges(node)?.chain(self.in_edges(node)?) {
            let rec = self.store.edge(edge)?;
            let other = if rec.source == node { rec.target } else { rec.source };
            if seen.insert(other) {
                out.push(other);
            }
        }
        Ok(out)
    }

    /// Source and target of a member edge
    pub fn endpoints(&self, edge: EdgeId) -> Result<(NodeId, NodeId)> {
        let rec = self.store.edge(edge)?;
        if !self.view.contains_edge(edge) {
            return Err(Error::invalid_argument(format!("edge {} is not a member of view {}", edge, self.view.id())));
        }
        Ok((rec.source, rec.target))
    }
}

/// Mutating handle over a view
///
/// Every change is routed through the owning store so view-scoped indices
/// follow membership.
pub struct ViewGraphMut<'a> {
    store: &'a mut GraphStore,
    view: ViewId,
}

impl<'a> ViewGraphMut<'a> {
    pub(crate) fn new(store: &'a mut GraphStore, view: ViewId) -> Self {
        Self { store, view }
    }

    /// Id of the view
    pub fn id(&self) -> ViewId {
        self.view
    }

    /// Read handle over the same view
    pub fn as_graph(&self) -> Result<ViewGraph<'_>> {
        self.store.view_graph(self.view)
    }

    /// Add a node
    pub fn add_node(&mut self, node: NodeId) -> Result<bool> {
        self.store.view_add_node(self.view, node)
    }

    /// Add an edge whose endpoints are members
    pub fn add_edge(&mut self, edge: EdgeId) -> Result<bool> {
        self.store.view_add_edge(self.view, edge)
    }

    /// Remove a node and its member edges
    pub fn remove_node(&mut self, node: NodeId) -> Result<bool> {
        self.store.view_remove_node(self.view, node)
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<bool> {
        self.store.view_remove_edge(self.view, edge)
    }

    /// Add several nodes
    pub fn add_all_nodes<I>(&mut self, nodes: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        self.store.view_add_nodes(self.view, nodes)
    }

    /// Add several edges
    pub fn add_all_edges<I>(&mut self, edges: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        self.store.view_add_edges(self.view, edges)
    }

    /// Remove several nodes
    pub fn remove_node_all<I>(&mut self, nodes: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        self.store.view_remove_nodes(self.view, nodes)
    }

    /// Remove several edges
    pub fn remove_edge_all<I>(&mut self, edges: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        self.store.view_remove_edges(self.view, edges)
    }

    /// Add the whole store
    pub fn fill(&mut self) -> Result<bool> {
        self.store.view_fill(self.view)
    }

    /// Drop every member
    pub fn clear(&mut self) -> Result<()> {
        self.store.view_clear(self.view)
    }

    /// Drop every member edge
    pub fn clear_edges(&mut self) -> Result<()> {
        self.store.view_clear_edges(self.view)
    }
}
