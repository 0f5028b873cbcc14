//! Graph views
//!
//! Bit-set scoped subgraphs over a shared base store, the store owning them,
//! and graph handles composed over a single view.

/// Membership bits and edge counters
pub mod graph_view;
/// Owner of the live views
pub mod view_store;
/// Read and write graph handles over a view
pub mod handle;

pub use graph_view::GraphView;
pub use handle::{ViewGraph, ViewGraphMut};
pub use view_store::ViewStore;
