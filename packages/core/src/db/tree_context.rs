//! In-Memory Node Store
//!
//! `TreeContext` is an identity-keyed mapping of node id to node, owned
//! exclusively by the repository that wraps it. Reads hand out value
//! snapshots, never references into the map, so tier boundaries stay
//! enforceable: the only way to relate nodes across stores is an id lookup
//! plus an explicit clone.
//!
//! A context is built either empty (the cache tier) or with a seed strategy
//! (the backing tier). The seed strategy replaces subclassing: `seed()` runs
//! whatever seeder the context was constructed with.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{Node, NodeId};

/// Seed strategy run by [`TreeContext::seed`]. Returns the nodes to insert
/// into an empty store; every invocation generates fresh ids.
pub type SeedFn = fn() -> Vec<Node>;

/// Identity-keyed in-memory node store for one tier.
///
/// Interior mutability via `RwLock` lets repositories share a handle
/// (`Arc<TreeContext>`) across threads; each individual store operation is
/// atomic. Multi-step invariants are the repository layer's job.
///
/// # Examples
///
/// ```rust
/// use treecache_core::db::{demo_tree, TreeContext};
///
/// let backing = TreeContext::with_seed(demo_tree);
/// assert_eq!(backing.get_all().len(), 10);
///
/// let cache = TreeContext::new();
/// assert!(cache.get_all().is_empty());
/// ```
pub struct TreeContext {
    nodes: RwLock<HashMap<NodeId, Node>>,
    seeder: Option<SeedFn>,
}

impl TreeContext {
    /// Create an empty store with no seed strategy; `seed()` is a no-op.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            seeder: None,
        }
    }

    /// Create a store with a seed strategy and run it once.
    pub fn with_seed(seeder: SeedFn) -> Self {
        let context = Self {
            nodes: RwLock::new(HashMap::new()),
            seeder: Some(seeder),
        };
        context.seed();
        context
    }

    /// Snapshot of the stored node, or `None` when absent.
    pub fn get(&self, id: &NodeId) -> Option<Node> {
        self.read().get(id).cloned()
    }

    /// Snapshots of every stored node, in no significant order.
    pub fn get_all(&self) -> Vec<Node> {
        self.read().values().cloned().collect()
    }

    /// Insert or overwrite a node under the given id.
    pub fn put(&self, id: NodeId, node: Node) {
        self.write().insert(id, node);
    }

    /// Whether a node is stored under the given id.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.read().contains_key(id)
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every node.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Run the seed strategy. Assumes the store is empty; callers `clear()`
    /// first when re-seeding.
    pub fn seed(&self) {
        let Some(seeder) = self.seeder else {
            return;
        };
        let mut nodes = self.write();
        for node in seeder() {
            if let Some(id) = node.id {
                nodes.insert(id, node);
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<NodeId, Node>> {
        self.nodes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<NodeId, Node>> {
        self.nodes.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TreeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical ten-node demonstration tree: single root, values
/// "Node 1" through "Node 10", fresh ids on every call.
///
/// Shape:
///
/// ```text
/// Node 1 ── Node 2
///        ├─ Node 3 ── Node 5 ── Node 9 ── Node 10
///        │         └─ Node 6 ── Node 7 ── Node 8
///        └─ Node 4
/// ```
pub fn demo_tree() -> Vec<Node> {
    let node1 = Node::with_id(NodeId::new_v4(), "Node 1", None);
    let node2 = Node::with_id(NodeId::new_v4(), "Node 2", node1.id);
    let node3 = Node::with_id(NodeId::new_v4(), "Node 3", node1.id);
    let node4 = Node::with_id(NodeId::new_v4(), "Node 4", node1.id);
    let node5 = Node::with_id(NodeId::new_v4(), "Node 5", node3.id);
    let node6 = Node::with_id(NodeId::new_v4(), "Node 6", node3.id);
    let node7 = Node::with_id(NodeId::new_v4(), "Node 7", node6.id);
    let node8 = Node::with_id(NodeId::new_v4(), "Node 8", node7.id);
    let node9 = Node::with_id(NodeId::new_v4(), "Node 9", node5.id);
    let node10 = Node::with_id(NodeId::new_v4(), "Node 10", node9.id);

    vec![
        node1, node2, node3, node4, node5, node6, node7, node8, node9, node10,
    ]
}
