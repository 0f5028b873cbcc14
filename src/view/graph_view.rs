//! Bit-set scoped subgraph over the base store
//!
//! A view never owns elements. It records membership in two growable bit sets
//! and keeps edge counters per type so that counts are O(1).

use crate::core::config::ViewConfig;
use crate::core::error::{Error, GraphError, Result};
use crate::core::types::{EdgeId, EdgeTypeId, Element, ElementKind, ElementRef, NodeId, ViewId};
use crate::storage::records::{EdgeRecord, ElementStore};
use crate::structures::{GrowableBitSet, GrowableCounts, GrowthPolicy};
use crate::log_trace;

/// Nodes and edges whose membership changed in one operation
#[derive(Debug, Default)]
pub(crate) struct MembershipDelta {
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) edges: Vec<EdgeId>,
}

impl MembershipDelta {
    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Membership bits and derived edge counters of one view
#[derive(Debug, Clone)]
pub struct GraphView {
    id: ViewId,
    policy: GrowthPolicy,
    default_type_count: usize,
    nodes: GrowableBitSet,
    edges: GrowableBitSet,
    node_count: usize,
    edge_count: usize,
    type_counts: GrowableCounts,
    mutual_type_counts: GrowableCounts,
    mutual_edges: usize,
}

impl GraphView {
    /// Empty view sized for the given id bounds
    pub fn new(id: ViewId, node_capacity: usize, edge_capacity: usize, config: &ViewConfig) -> Self {
        let default_type_count = config.default_type_count.max(1);
        Self {
            id,
            policy: GrowthPolicy::new(config.growing_factor),
            default_type_count,
            nodes: GrowableBitSet::with_len(node_capacity),
            edges: GrowableBitSet::with_len(edge_capacity),
            node_count: 0,
            edge_count: 0,
            type_counts: GrowableCounts::with_len(default_type_count),
            mutual_type_counts: GrowableCounts::with_len(default_type_count),
            mutual_edges: 0,
        }
    }

    /// Id of this view in its store
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Add a live node; returns false if it was already a member
    pub fn add_node(&mut self, store: &ElementStore, node: NodeId) -> Result<bool> {
        store.node(node)?;
        Ok(self.insert_node(node))
    }

    /// Add a live edge whose endpoints are both members
    pub fn add_edge(&mut self, store: &ElementStore, edge: EdgeId) -> Result<bool> {
        let rec = *store.edge(edge)?;
        if self.edges.get(edge.index()) {
            return Ok(false);
        }
        self.check_endpoints(edge, &rec)?;
        Ok(self.insert_edge(edge, &rec))
    }

    /// Remove a node and every incident edge that is a member
    ///
    /// Edges dropped by the cascade are appended to `removed_edges`.
    pub fn remove_node(&mut self, store: &ElementStore, node: NodeId, removed_edges: &mut Vec<EdgeId>) -> Result<bool> {
        store.node(node)?;
        Ok(self.erase_node(store, node, removed_edges))
    }

    /// Remove an edge; node membership is left alone
    pub fn remove_edge(&mut self, store: &ElementStore, edge: EdgeId) -> Result<bool> {
        let rec = *store.edge(edge)?;
        Ok(self.erase_edge(edge, &rec))
    }

    /// Add several nodes; nothing changes unless every input is a live node
    pub fn add_all_nodes<I>(&mut self, store: &ElementStore, nodes: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        Ok(!self.join_nodes(store, nodes)?.is_empty())
    }

    /// Add several edges; nothing changes unless every input is a live edge
    /// whose endpoints are members
    pub fn add_all_edges<I>(&mut self, store: &ElementStore, edges: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        Ok(!self.join_edges(store, edges)?.is_empty())
    }

    /// Remove several nodes with their member edges
    ///
    /// Edges dropped by the cascade are appended to `removed_edges`.
    pub fn remove_node_all<I>(&mut self, store: &ElementStore, nodes: I, removed_edges: &mut Vec<EdgeId>) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let delta = self.leave_nodes(store, nodes)?;
        removed_edges.extend(delta.edges);
        Ok(!delta.nodes.is_empty())
    }

    /// Remove several edges
    pub fn remove_edge_all<I>(&mut self, store: &ElementStore, edges: I) -> Result<bool>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        Ok(!self.leave_edges(store, edges)?.is_empty())
    }

    /// Add every live node, then every live edge
    pub fn fill(&mut self, store: &ElementStore) -> Result<bool> {
        Ok(!self.fill_members(store)?.is_empty())
    }

    /// Validate every node, then add them; returns the nodes that joined
    pub(crate) fn join_nodes<I>(&mut self, store: &ElementStore, nodes: I) -> Result<Vec<NodeId>>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let nodes = validate_nodes(store, nodes)?;
        Ok(nodes.into_iter().filter(|n| self.insert_node(*n)).collect())
    }

    /// Validate every edge and its endpoints, then add them; returns the edges
    /// that joined
    pub(crate) fn join_edges<I>(&mut self, store: &ElementStore, edges: I) -> Result<Vec<EdgeId>>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let edges = validate_edges(store, edges)?;
        for (edge, rec) in &edges {
            if !self.edges.get(edge.index()) {
                self.check_endpoints(*edge, rec)?;
            }
        }
        Ok(edges.into_iter().filter(|(e, rec)| self.insert_edge(*e, rec)).map(|(e, _)| e).collect())
    }

    /// Validate every node, then remove them with their member edges
    pub(crate) fn leave_nodes<I>(&mut self, store: &ElementStore, nodes: I) -> Result<MembershipDelta>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let nodes = validate_nodes(store, nodes)?;
        let mut delta = MembershipDelta::default();
        for node in nodes {
            if self.erase_node(store, node, &mut delta.edges) {
                delta.nodes.push(node);
            }
        }
        Ok(delta)
    }

    /// Validate every edge, then remove them; returns the edges that left
    pub(crate) fn leave_edges<I>(&mut self, store: &ElementStore, edges: I) -> Result<Vec<EdgeId>>
    where
        I: IntoIterator,
        I::Item: Into<ElementRef>,
    {
        let edges = validate_edges(store, edges)?;
        Ok(edges.into_iter().filter(|(e, rec)| self.erase_edge(*e, rec)).map(|(e, _)| e).collect())
    }

    /// Add the whole store; returns what joined
    pub(crate) fn fill_members(&mut self, store: &ElementStore) -> Result<MembershipDelta> {
        let mut delta = MembershipDelta::default();
        for node in store.nodes() {
            if self.insert_node(node) {
                delta.nodes.push(node);
            }
        }
        for edge in store.edges() {
            let rec = *store.edge(edge)?;
            if self.insert_edge(edge, &rec) {
                delta.edges.push(edge);
            }
        }
        Ok(delta)
    }

    /// Drop every member and reset counters
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_count = 0;
        self.clear_edges();
    }

    /// Drop every member edge and reset edge counters
    pub fn clear_edges(&mut self) {
        self.edges.clear();
        self.edge_count = 0;
        self.mutual_edges = 0;
        self.type_counts.reset(self.default_type_count);
        self.mutual_type_counts.reset(self.default_type_count);
    }

    /// Follow a mutual flag change of a member edge that carries its pair's count
    pub(crate) fn set_mutual(&mut self, edge: EdgeId, edge_type: EdgeTypeId, mutual: bool) {
        if !self.edges.get(edge.index()) {
            return;
        }
        let slot = edge_type as usize;
        if mutual {
            self.mutual_type_counts.increment(slot, self.policy);
            self.mutual_edges += 1;
        } else {
            self.mutual_type_counts.decrement(slot);
            self.mutual_edges -= 1;
        }
    }

    /// Whether `node` is a member
    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.get(node.index())
    }

    /// Whether `edge` is a member
    #[inline]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.get(edge.index())
    }

    /// Membership test for either kind
    #[inline]
    pub fn contains<E: Element>(&self, element: E) -> bool {
        let index = element.store_id() as usize;
        match E::KIND {
            ElementKind::Node => self.nodes.get(index),
            ElementKind::Edge => self.edges.get(index),
        }
    }

    /// Members of kind `E`, ascending
    pub fn members<E: Element>(&self) -> impl Iterator<Item = E> + '_ {
        let bits = match E::KIND {
            ElementKind::Node => &self.nodes,
            ElementKind::Edge => &self.edges,
        };
        bits.iter_ones().map(|i| E::from_store_id(i as u32))
    }

    /// Member nodes, ascending
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter_ones().map(|i| NodeId(i as u32))
    }

    /// Member edges, ascending
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter_ones().map(|i| EdgeId(i as u32))
    }

    /// Number of member nodes
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of member edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of member edges with every mutual pair counted once
    pub fn undirected_edge_count(&self) -> usize {
        self.edge_count - self.mutual_edges
    }

    /// Number of mutual pairs counted in this view
    pub fn mutual_edge_count(&self) -> usize {
        self.mutual_edges
    }

    /// Number of member edges of `edge_type`
    pub fn edge_count_of_type(&self, edge_type: EdgeTypeId) -> Result<usize> {
        self.type_counts
            .get(edge_type as usize)
            .ok_or_else(|| Error::invalid_argument(format!("Incorrect type={}", edge_type)))
    }

    /// Undirected edge count restricted to `edge_type`
    pub fn undirected_edge_count_of_type(&self, edge_type: EdgeTypeId) -> Result<usize> {
        let total = self.edge_count_of_type(edge_type)?;
        let mutual = self.mutual_type_counts.get(edge_type as usize).unwrap_or(0);
        Ok(total - mutual)
    }

    /// Number of edge types currently tracked
    pub fn tracked_type_count(&self) -> usize {
        self.type_counts.len()
    }

    /// Sum of the per-type counters
    pub fn type_count_total(&self) -> usize {
        self.type_counts.total()
    }

    /// Addressable node bits
    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Addressable edge bits
    pub fn edge_capacity(&self) -> usize {
        self.edges.len()
    }

    fn check_endpoints(&self, edge: EdgeId, rec: &EdgeRecord) -> Result<()> {
        if self.contains_node(rec.source) && self.contains_node(rec.target) {
            Ok(())
        } else {
            Err(GraphError::EndpointsNotInView { edge }.into())
        }
    }

    fn insert_node(&mut self, node: NodeId) -> bool {
        if !self.nodes.insert(node.index(), self.policy) {
            return false;
        }
        self.node_count += 1;
        log_trace!(view = %self.id, node = %node, "node added to view");
        true
    }

    fn insert_edge(&mut self, edge: EdgeId, rec: &EdgeRecord) -> bool {
        if !self.edges.insert(edge.index(), self.policy) {
            return false;
        }
        self.edge_count += 1;
        let slot = rec.edge_type as usize;
        self.type_counts.increment(slot, self.policy);
        if rec.counts_as_mutual() {
            self.mutual_type_counts.increment(slot, self.policy);
            self.mutual_edges += 1;
        }
        true
    }

    fn erase_node(&mut self, store: &ElementStore, node: NodeId, removed_edges: &mut Vec<EdgeId>) -> bool {
        if !self.nodes.remove(node.index()) {
            return false;
        }
        self.node_count -= 1;
        if let Ok(incident) = store.incident(node) {
            for edge in incident {
                if let Ok(edge_rec) = store.edge(edge) {
                    if self.erase_edge(edge, edge_rec) {
                        removed_edges.push(edge);
                    }
                }
            }
        }
        log_trace!(view = %self.id, node = %node, "node removed from view");
        true
    }

    fn erase_edge(&mut self, edge: EdgeId, rec: &EdgeRecord) -> bool {
        if !self.edges.remove(edge.index()) {
            return false;
        }
        self.edge_count -= 1;
        let slot = rec.edge_type as usize;
        self.type_counts.decrement(slot);
        if rec.counts_as_mutual() {
            self.mutual_type_counts.decrement(slot);
            self.mutual_edges -= 1;
        }
        true
    }
}

fn validate_nodes<I>(store: &ElementStore, nodes: I) -> Result<Vec<NodeId>>
where
    I: IntoIterator,
    I::Item: Into<ElementRef>,
{
    nodes
        .into_iter()
        .map(|item| {
            let node = item.into().expect_node()?;
            store.node(node)?;
            Ok(node)
        })
        .collect()
}

fn validate_edges<I>(store: &ElementStore, edges: I) -> Result<Vec<(EdgeId, EdgeRecord)>>
where
    I: IntoIterator,
    I::Item: Into<ElementRef>,
{
    edges
        .into_iter()
        .map(|item| {
            let edge = item.into().expect_edge()?;
            Ok((edge, *store.edge(edge)?))
        })
        .collect()
}
