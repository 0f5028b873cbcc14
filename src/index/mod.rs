//! Value index
//!
//! Inverted value-to-elements indices for indexed columns, one per scope.

/// Column, scope and store level value indices
pub mod value_index;

pub use value_index::{ColumnIndex, ElementIndex, ScopeIndex, ValueIndexStore};
