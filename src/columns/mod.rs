//! Column registry
//!
//! Typed attribute columns per element kind, their mutation versions and
//! observers, and the dynamic (time-varying) value contract.

/// Dynamic value contract and its sorted-map implementation
pub mod dynamic;
/// Column schema entries and observers
pub mod column;
/// Per-kind column catalog
pub mod table;

pub use column::{Column, ColumnBuilder, ColumnObserver, Origin};
pub use dynamic::{DynamicMap, TimestampMap};
pub use table::Table;
