//! Identifier and element handle types
//!
//! Nodes and edges are addressed by dense `u32` store ids. Views, columns and
//! edge types use their own small dense id spaces.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{Error, GraphError, Result};

/// Dense store id of a node
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(pub u32);

/// Dense store id of an edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EdgeId(pub u32);

/// Identifier of a view inside its view store
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ViewId(pub u32);

/// Dense edge type id; 0 is the default type
pub type EdgeTypeId = u16;

/// Store id of a column inside its table
pub type ColumnStoreId = u16;

/// Sentinel for a handle that was never attached to a store
pub const NULL_ID: u32 = u32::MAX;

impl NodeId {
    /// Handle that does not belong to any store
    pub const NULL: NodeId = NodeId(NULL_ID);

    /// Index form of the id
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this handle carries a store id
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == NULL_ID
    }
}

impl EdgeId {
    /// Handle that does not belong to any store
    pub const NULL: EdgeId = EdgeId(NULL_ID);

    /// Index form of the id
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this handle carries a store id
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == NULL_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Element kind tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Graph node
    Node,
    /// Graph edge
    Edge,
}

/// Kind-tagged element handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// Node handle
    Node(NodeId),
    /// Edge handle
    Edge(EdgeId),
}

impl ElementRef {
    /// Raw store id, regardless of kind
    pub fn store_id(self) -> u32 {
        match self {
            ElementRef::Node(n) => n.0,
            ElementRef::Edge(e) => e.0,
        }
    }

    /// Kind tag
    pub fn kind(self) -> ElementKind {
        match self {
            ElementRef::Node(_) => ElementKind::Node,
            ElementRef::Edge(_) => ElementKind::Edge,
        }
    }

    /// Validate this handle as a node carrying a store id
    pub fn expect_node(self) -> Result<NodeId> {
        match self {
            ElementRef::Node(n) if n.is_null() => Err(GraphError::NullElement(ElementKind::Node).into()),
            ElementRef::Node(n) => Ok(n),
            ElementRef::Edge(e) => Err(Error::invalid_argument(format!("expected a node, got edge {}", e))),
        }
    }

    /// Validate this handle as an edge carrying a store id
    pub fn expect_edge(self) -> Result<EdgeId> {
        match self {
            ElementRef::Edge(e) if e.is_null() => Err(GraphError::NullElement(ElementKind::Edge).into()),
            ElementRef::Edge(e) => Ok(e),
            ElementRef::Node(n) => Err(Error::invalid_argument(format!("expected an edge, got node {}", n))),
        }
    }
}

impl From<NodeId> for ElementRef {
    fn from(node: NodeId) -> Self {
        ElementRef::Node(node)
    }
}

impl From<EdgeId> for ElementRef {
    fn from(edge: EdgeId) -> Self {
        ElementRef::Edge(edge)
    }
}

/// Store-id keyed element, implemented by both handle types
pub trait Element: Copy + Eq + std::hash::Hash + fmt::Debug {
    /// Kind of element this handle addresses
    const KIND: ElementKind;

    /// Raw store id
    fn store_id(self) -> u32;

    /// Rebuild the handle from a raw store id
    fn from_store_id(id: u32) -> Self;
}

impl Element for NodeId {
    const KIND: ElementKind = ElementKind::Node;

    #[inline]
    fn store_id(self) -> u32 {
        self.0
    }

    #[inline]
    fn from_store_id(id: u32) -> Self {
        NodeId(id)
    }
}

impl Element for EdgeId {
    const KIND: ElementKind = ElementKind::Edge;

    #[inline]
    fn store_id(self) -> u32 {
        self.0
    }

    #[inline]
    fn from_store_id(id: u32) -> Self {
        EdgeId(id)
    }
}

/// Query scope: the base store or one of its views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every live element of the base store
    Main,
    /// Members of a single view
    View(ViewId),
}
