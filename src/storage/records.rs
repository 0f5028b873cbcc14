//! Node and edge topology records
//!
//! Ids come from per-kind [`IdSpace`]s; records live in slot vectors indexed
//! by store id. Adjacency uses small inline vectors since most nodes have a
//! handful of incident edges.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::core::error::{Error, GraphError, Result};
use crate::core::types::{EdgeId, EdgeTypeId, ElementKind, NodeId};
use crate::structures::IdSpace;

/// Adjacency list of one direction
pub type Adjacency = SmallVec<[EdgeId; 8]>;

/// Live node
#[derive(Debug, Clone)]
pub struct NodeRecord {
    label: String,
    pub(crate) outgoing: Adjacency,
    pub(crate) incoming: Adjacency,
}

impl NodeRecord {
    /// Unique label of the node
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Outgoing edges
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    /// Incoming edges
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }
}

/// Live edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Edge type id
    pub edge_type: EdgeTypeId,
    /// Whether the reverse edge of the same type exists
    pub mutual: bool,
}

impl EdgeRecord {
    /// Whether this edge carries the mutual count of its pair
    #[inline]
    pub fn counts_as_mutual(&self) -> bool {
        self.mutual && self.source.0 < self.target.0
    }

    /// Whether source and target coincide
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Side effect of adding or removing an edge on its reverse edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutualFlip {
    /// The reverse edge whose mutual flag changed
    pub edge: EdgeId,
    /// Its new mutual flag
    pub mutual: bool,
    /// Whether it carries the pair's mutual count
    pub counted: bool,
}

/// Topology of the base store
#[derive(Debug, Default)]
pub struct ElementStore {
    node_ids: IdSpace,
    edge_ids: IdSpace,
    nodes: Vec<Option<NodeRecord>>,
    edges: Vec<Option<EdgeRecord>>,
    labels: AHashMap<String, NodeId>,
    endpoints: AHashMap<(NodeId, NodeId, EdgeTypeId), EdgeId>,
    type_labels: Vec<String>,
    types_by_label: AHashMap<String, EdgeTypeId>,
}

impl ElementStore {
    /// Empty store with the default edge type registered as id 0
    pub fn new() -> Self {
        let mut store = Self::default();
        store.type_labels.push(String::new());
        store.types_by_label.insert(String::new(), 0);
        store
    }

    /// Register an edge type label, returning its id; existing labels are reused
    pub fn add_edge_type(&mut self, label: &str) -> Result<EdgeTypeId> {
        if let Some(&id) = self.types_by_label.get(label) {
            return Ok(id);
        }
        let id = EdgeTypeId::try_from(self.type_labels.len())
            .map_err(|_| Error::invalid_state("edge type limit reached"))?;
        self.type_labels.push(label.to_string());
        self.types_by_label.insert(label.to_string(), id);
        Ok(id)
    }

    /// Id of a registered edge type
    pub fn edge_type(&self, label: &str) -> Option<EdgeTypeId> {
        self.types_by_label.get(label).copied()
    }

    /// Label of an edge type id
    pub fn edge_type_label(&self, id: EdgeTypeId) -> Option<&str> {
        self.type_labels.get(id as usize).map(String::as_str)
    }

    /// Number of registered edge types, default included
    pub fn edge_type_count(&self) -> usize {
        self.type_labels.len()
    }

    /// Record of a live node
    pub fn node(&self, node: NodeId) -> Result<&NodeRecord> {
        if node.is_null() {
            return Err(GraphError::NullElement(ElementKind::Node).into());
        }
        self.nodes
            .get(node.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::NodeNotInStore(node).into())
    }

    /// Record of a live edge
    pub fn edge(&self, edge: EdgeId) -> Result<&EdgeRecord> {
        if edge.is_null() {
            return Err(GraphError::NullElement(ElementKind::Edge).into());
        }
        self.edges
            .get(edge.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::EdgeNotInStore(edge).into())
    }

    /// Every edge incident to `node`; a self loop appears once
    ///
    /// Self loops sit in both adjacency lists and are skipped on the
    /// incoming side by their source.
    pub fn incident(&self, node: NodeId) -> Result<impl Iterator<Item = EdgeId> + '_> {
        let rec = self.node(node)?;
        let incoming = rec.incoming.iter().copied().filter(move |e| {
            self.edges
                .get(e.index())
                .and_then(Option::as_ref)
                .map_or(true, |r| r.source != node)
        });
        Ok(rec.outgoing.iter().copied().chain(incoming))
    }

    /// Whether `node` is live
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node_ids.is_live(node.0)
    }

    /// Whether `edge` is live
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edge_ids.is_live(edge.0)
    }

    /// Node carrying `label`
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    /// Edge from `source` to `target` with `edge_type`
    pub fn find_edge(&self, source: NodeId, target: NodeId, edge_type: EdgeTypeId) -> Option<EdgeId> {
        self.endpoints.get(&(source, target, edge_type)).copied()
    }

    /// Live nodes, ascending
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids.iter().map(NodeId)
    }

    /// Live edges, ascending
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_ids.iter().map(EdgeId)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Number of live edges
    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    /// Exclusive bound of node store ids
    pub fn node_capacity(&self) -> usize {
        self.node_ids.capacity()
    }

    /// Exclusive bound of edge store ids
    pub fn edge_capacity(&self) -> usize {
        self.edge_ids.capacity()
    }

    /// Insert a node with a unique label
    pub(crate) fn insert_node(&mut self, label: String) -> Result<NodeId> {
        if self.labels.contains_key(&label) {
            return Err(Error::invalid_argument(format!("The node '{}' already exists", label)));
        }
        let node = NodeId(self.node_ids.allocate());
        let slot = node.index();
        if slot >= self.nodes.len() {
            self.nodes.resize_with(slot + 1, || None);
        }
        self.labels.insert(label.clone(), node);
        self.nodes[slot] = Some(NodeRecord { label, outgoing: Adjacency::new(), incoming: Adjacency::new() });
        Ok(node)
    }

    /// Check an edge insertion without mutating anything
    pub(crate) fn check_new_edge(&self, source: NodeId, target: NodeId, edge_type: EdgeTypeId) -> Result<()> {
        self.node(source)?;
        self.node(target)?;
        if edge_type as usize >= self.type_labels.len() {
            return Err(Error::invalid_argument(format!("Unknown edge type {}", edge_type)));
        }
        if self.endpoints.contains_key(&(source, target, edge_type)) {
            return Err(Error::invalid_argument(format!(
                "An edge {} -> {} of type {} already exists",
                source, target, edge_type
            )));
        }
        Ok(())
    }

    /// Insert an edge; reports the reverse edge whose mutual flag flipped
    pub(crate) fn insert_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: EdgeTypeId,
    ) -> Result<(EdgeId, Option<MutualFlip>)> {
        self.check_new_edge(source, target, edge_type)?;
        let reverse = if source == target {
            None
        } else {
            self.endpoints.get(&(target, source, edge_type)).copied()
        };

        let edge = EdgeId(self.edge_ids.allocate());
        let slot = edge.index();
        if slot >= self.edges.len() {
            self.edges.resize_with(slot + 1, || None);
        }
        self.edges[slot] = Some(EdgeRecord { source, target, edge_type, mutual: reverse.is_some() });
        self.endpoints.insert((source, target, edge_type), edge);
        if let Some(rec) = self.nodes[source.index()].as_mut() {
            rec.outgoing.push(edge);
        }
        if let Some(rec) = self.nodes[target.index()].as_mut() {
            rec.incoming.push(edge);
        }

        let flip = reverse.and_then(|r| self.set_mutual(r, true));
        Ok((edge, flip))
    }

    /// Remove an edge record; reports the reverse edge whose mutual flag flipped
    pub(crate) fn remove_edge(&mut self, edge: EdgeId) -> Result<(EdgeRecord, Option<MutualFlip>)> {
        let rec = *self.edge(edge)?;
        self.edges[edge.index()] = None;
        self.endpoints.remove(&(rec.source, rec.target, rec.edge_type));
        if let Some(node) = self.nodes[rec.source.index()].as_mut() {
            node.outgoing.retain(|e| *e != edge);
        }
        if let Some(node) = self.nodes[rec.target.index()].as_mut() {
            node.incoming.retain(|e| *e != edge);
        }
        self.edge_ids.free(edge.0)?;

        let flip = if rec.mutual {
            self.endpoints
                .get(&(rec.target, rec.source, rec.edge_type))
                .copied()
                .and_then(|r| self.set_mutual(r, false))
        } else {
            None
        };
        Ok((rec, flip))
    }

    /// Remove a node record; its edges must already be gone
    pub(crate) fn remove_node(&mut self, node: NodeId) -> Result<NodeRecord> {
        let rec = self.node(node)?;
        if !rec.outgoing.is_empty() || !rec.incoming.is_empty() {
            return Err(Error::invalid_state(format!("node {} still has incident edges", node)));
        }
        let rec = self.nodes[node.index()]
            .take()
            .ok_or(GraphError::NodeNotInStore(node))?;
        self.labels.remove(&rec.label);
        self.node_ids.free(node.0)?;
        Ok(rec)
    }

    fn set_mutual(&mut self, edge: EdgeId, mutual: bool) -> Option<MutualFlip> {
        let rec = self.edges.get_mut(edge.index())?.as_mut()?;
        if rec.mutual == mutual {
            return None;
        }
        rec.mutual = mutual;
        Some(MutualFlip { edge, mutual, counted: rec.source.0 < rec.target.0 })
    }
}
