//! Core system types and foundations
//!
//! Identifier types, attribute values, error handling, configuration and
//! logging shared by every other module.

/// Identifiers and element handles
pub mod types;
/// Attribute values and types
pub mod value;
/// Error types
pub mod error;
/// Store configuration
pub mod config;
/// Logging setup and macros
pub mod logging;

// Re-export commonly used items
pub use types::{EdgeId, EdgeTypeId, Element, ElementKind, ElementRef, NodeId, Scope, ViewId};
pub use value::{Estimator, ScalarType, Value, ValueType};
pub use error::{Error, GraphError, Result};
pub use config::{load_config, load_config_or_default, StoreConfig};
