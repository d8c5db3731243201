//! Storage Layer
//!
//! This module holds the in-memory node stores backing both tiers:
//!
//! - `TreeContext` - identity-keyed mapping of node id to node
//! - `demo_tree` - the canonical ten-node seed used by the backing tier
//!
//! The store is deliberately dumb: it knows how to keep nodes and how to
//! reseed itself, nothing about tree invariants. Those live in the
//! repository layer ([`crate::services`]).

mod tree_context;

pub use tree_context::{demo_tree, SeedFn, TreeContext};
