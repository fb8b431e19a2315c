//! Model artifacts and inference
//!
//! This module provides:
//! - `gbtree`: the boosted-tree classifier and its JSON model reader
//! - `table`: the reference training table and its column means
//! - `store`: startup loading and process-lifetime ownership of both, plus
//!   the feature column schema

pub mod gbtree;
pub mod store;
pub mod table;

// Re-export main types for convenience
pub use gbtree::GbtModel;
pub use store::ModelStore;
pub use table::ReferenceTable;
