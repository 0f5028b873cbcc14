//! Error types and handling for the graph store
//!
//! Every failure is local and synchronous. An operation that returns an error
//! has not mutated any structure.

use thiserror::Error;

use crate::core::types::{EdgeId, ElementKind, NodeId, ViewId};

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the graph store
#[derive(Error, Debug)]
pub enum Error {
    /// Bad argument: empty or duplicate column id, out-of-range type, wrong element kind
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not allowed in the current state of the target
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Column created without a value type
    #[error("Column '{column}' has no value type")]
    NullType {
        /// Normalized id of the rejected column
        column: String,
    },

    /// Structural consistency violations
    #[error("Graph consistency error: {0}")]
    Graph(#[from] GraphError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML decoding errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Structural consistency errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node id is not live in the base store
    #[error("Node {0} does not belong to the store")]
    NodeNotInStore(NodeId),

    /// Edge id is not live in the base store
    #[error("Edge {0} does not belong to the store")]
    EdgeNotInStore(EdgeId),

    /// Edge added to a view that lacks one of its endpoints
    #[error("Both source and target nodes of edge {edge} must be in the view")]
    EndpointsNotInView {
        /// The rejected edge
        edge: EdgeId,
    },

    /// View id unknown or already destroyed
    #[error("View {0} not found")]
    ViewNotFound(ViewId),

    /// Element handle carries the null store id
    #[error("{0:?} does not carry a store id")]
    NullElement(ElementKind),

    /// Store id released twice
    #[error("Id {0} is not allocated")]
    IdNotAllocated(u32),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::InvalidState(_)
                | Error::NullType { .. }
                | Error::Graph(_)
        )
    }

    /// Check if this error is a structural consistency violation
    pub fn is_consistency_violation(&self) -> bool {
        matches!(self, Error::Graph(_))
    }
}
