//! Repository Trait - Tier Abstraction Layer
//!
//! This module defines the `Repository` trait shared by both tiers. The
//! trait enables the adapter layer to address either tier through one
//! CRUD-style contract, and lets the cached tier compose the backing tier
//! explicitly instead of inheriting from it.
//!
//! # Design Decisions
//!
//! 1. **Snapshot reads**: every read returns owned value copies; callers
//!    mutate a snapshot and hand it back through `update`/`delete`.
//! 2. **Object safety**: `find` takes a `&dyn Fn` predicate so the trait
//!    stays usable behind `Arc<dyn Repository>`.
//! 3. **Synchronous**: no operation blocks on I/O; every call completes in
//!    time proportional to tree size.

use crate::models::{Node, NodeId};
use crate::services::error::TreeError;

/// CRUD contract over one tier of the tree.
///
/// Implementations must be `Send + Sync`; mutations on one repository are
/// serialized by a per-repository writer lock.
pub trait Repository: Send + Sync {
    /// Snapshot of the stored node, or [`TreeError::NotFound`] - no
    /// defaulting, no lazy fetch.
    fn get_by_id(&self, id: NodeId) -> Result<Node, TreeError>;

    /// Snapshots of every stored node; never fails, empty when empty.
    /// Order is store-internal and not semantically significant.
    fn get_all(&self) -> Vec<Node>;

    /// Filtered view of [`Repository::get_all`].
    fn find(&self, filter: &dyn Fn(&Node) -> bool) -> Vec<Node>;

    /// Nodes whose `parent_id` equals the argument. Passing `None` returns
    /// the root (exactly zero or one under the base invariants; the cache
    /// tier may also hold unresolved orphans there).
    fn find_children(&self, parent_id: Option<NodeId>) -> Vec<Node>;

    /// Insert a node and return the stored snapshot (with the assigned id).
    fn add(&self, node: Node) -> Result<Node, TreeError>;

    /// Overwrite the stored node's value and advance its tracking state.
    fn update(&self, node: &Node) -> Result<(), TreeError>;

    /// Soft-delete the node and every descendant reachable via `parent_id`.
    fn delete(&self, node: &Node) -> Result<(), TreeError>;

    /// Commit: collapse every pending state to `Unchanged`.
    fn apply(&self) -> Result<(), TreeError>;

    /// Rollback: clear the store and run its seed strategy.
    fn reset(&self);
}
