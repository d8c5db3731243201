//! Data Models
//!
//! This module contains the core data structures used throughout TreeCache:
//!
//! - `Node` - the single entity of the tree
//! - `NodeState` - change-tracking state relative to the store of record
//!
//! All entities are serde-serializable with camelCase field names for the
//! adapter layer.

mod node;

pub use node::{Node, NodeId, NodeState};
