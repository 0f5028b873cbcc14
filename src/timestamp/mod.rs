//! Timestamp index
//!
//! Element-to-time associations queryable by closed interval, with bounds
//! tracking, in the main scope and optionally per view.

/// Reference-counted sorted timestamp catalog
pub mod catalog;
/// Per-scope element sets by ordinal
pub mod index;
/// Main and view scopes of one element kind
pub mod store;

pub use catalog::{Ordinal, TimestampCatalog};
pub use index::{TimestampIndex, TimestampIndexRef};
pub use store::TimestampIndexStore;

#[cfg(test)]
mod tests;
