//! Base element store
//!
//! Node and edge topology, attribute rows with their derived indices, and the
//! `GraphStore` that keeps them consistent with the views.

/// Topology records and id spaces
pub mod records;
/// Attribute rows and derived indices per element kind
pub mod attributes;
/// The store orchestrating topology, attributes and views
pub mod graph_store;

pub use attributes::AttributeStore;
pub use graph_store::GraphStore;
pub use records::{EdgeRecord, ElementStore, NodeRecord};

#[cfg(test)]
mod tests;
