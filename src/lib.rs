//! Dense Graph Store - an embedded, in-process graph storage engine
//!
//! Nodes and edges live in a dense columnar store addressed by reusable
//! integer ids. On top of it the crate maintains typed attribute columns
//! (including time-varying ones), per-column value indices, a shared
//! timestamp catalog with interval queries, and bit-set backed views whose
//! counters and scoped indices follow their membership.
//!
//! The store is single-writer: mutations take `&mut GraphStore` and must be
//! serialized by the caller. Column observers are the exception and may be
//! created or destroyed from any thread.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;
pub mod structures;

// Main functional modules
pub mod columns;
pub mod index;
pub mod timestamp;
pub mod storage;
pub mod view;
pub mod system;

// Re-export commonly used items for convenience
pub use crate::core::logging::init_logging;
pub use crate::core::{
    EdgeId, EdgeTypeId, Element, ElementKind, ElementRef, Error, Estimator, GraphError, NodeId, Result, ScalarType,
    Scope, StoreConfig, Value, ValueType, ViewId,
};
pub use columns::{Column, ColumnBuilder, ColumnObserver, DynamicMap, Origin, TimestampMap};
pub use storage::GraphStore;
pub use view::{GraphView, ViewGraph, ViewGraphMut};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
