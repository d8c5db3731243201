//! TreeCache Core Business Logic Layer
//!
//! This crate manages a single rooted tree of identified nodes through two
//! cooperating stores: an authoritative backing store and a mutable
//! front-end cache that accumulates pending changes until explicitly
//! committed.
//!
//! # Architecture
//!
//! - **Two Tiers**: one process-wide backing store of record, one cache
//!   holding the working set and its pending changes
//! - **Change Tracking**: every node carries an `Unchanged | Added |
//!   Modified | Deleted` state relative to the backing store
//! - **Soft Delete**: deletion is a monotonic flag that cascades to every
//!   descendant; nodes are never physically removed
//! - **Lazy Population**: cache misses clone nodes out of the backing
//!   store, in arbitrary order, with orphan links resolved after the fact
//!
//! # Modules
//!
//! - [`models`] - data structures (`Node`, `NodeState`)
//! - [`db`] - in-memory node stores and the canonical seed
//! - [`services`] - repositories implementing the two-tier commit protocol
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use treecache_core::db::{demo_tree, TreeContext};
//! use treecache_core::{CachedTreeRepository, Node, Repository, TreeRepository};
//!
//! let backing = Arc::new(TreeRepository::new(Arc::new(TreeContext::with_seed(demo_tree))));
//! let cached = CachedTreeRepository::new(Arc::new(TreeContext::new()), backing.clone());
//!
//! // lazily pull the root, stage a child, commit
//! let root_id = backing.find_children(None)[0].id.unwrap();
//! let root = cached.load(root_id).unwrap().unwrap();
//! let child = cached.add(Node::new("Node 11", root.id)).unwrap();
//! cached.apply().unwrap();
//!
//! assert_eq!(backing.get_by_id(child.id.unwrap()).unwrap().value, "Node 11");
//! ```

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
