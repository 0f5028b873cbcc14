//! Core reusable data structures

/// Growable bit sets and counter arrays
pub mod bitset;
/// Dense reusable id allocation
pub mod id_space;

// Export the main types
pub use bitset::{GrowableBitSet, GrowableCounts, GrowthPolicy};
pub use id_space::IdSpace;
