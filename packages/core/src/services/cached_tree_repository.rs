//! Cached Tree Repository - Two-Tier Commit Protocol
//!
//! `CachedTreeRepository` composes a cache-tier [`TreeRepository`] with a
//! reference to the backing repository (the store of record). On top of the
//! plain CRUD engine it adds:
//!
//! - **Lazy population** (`load`): cache misses pull a clone from the
//!   backing store; deleted nodes are never resurrected into the cache.
//! - **Orphan relinking** (`restore_links`): the cache tolerates nodes
//!   arriving in arbitrary order. A node whose parent is not cached yet is
//!   held as an orphan (`original_parent_id` set) and linked back the
//!   moment its parent shows up.
//! - **Commit** (`apply`): pending cache changes are replayed onto the
//!   backing store parent-before-child, both tiers collapse their tracking
//!   states, and the cache re-fetches deletion flags the push could not
//!   have observed.
//! - **Rollback** (`reset`): empties the cache and reseeds the backing
//!   store.
//!
//! The cache tier deliberately skips the single-root and parent-existence
//! checks of the base engine; a partially loaded tree is structurally
//! incomplete by design.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::TreeContext;
use crate::models::{Node, NodeId, NodeState};
use crate::services::error::TreeError;
use crate::services::repository::Repository;
use crate::services::tree_repository::TreeRepository;

/// Cache-tier repository over a backing store of record.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use treecache_core::db::{demo_tree, TreeContext};
/// use treecache_core::services::{CachedTreeRepository, Repository, TreeRepository};
///
/// let backing = Arc::new(TreeRepository::new(Arc::new(TreeContext::with_seed(demo_tree))));
/// let cached = CachedTreeRepository::new(Arc::new(TreeContext::new()), backing.clone());
///
/// // the cache starts empty and fills lazily
/// assert!(cached.get_all().is_empty());
/// let root_id = backing.find_children(None)[0].id.unwrap();
/// let root = cached.load(root_id).unwrap().unwrap();
/// assert_eq!(root.value, "Node 1");
/// ```
pub struct CachedTreeRepository {
    /// Cache-tier engine; holds the working set and pending changes
    cache: TreeRepository,

    /// Store of record
    backing: Arc<TreeRepository>,

    /// Commit guard: one mutation, load-insert, or full apply at a time,
    /// so an apply always observes a stable cache snapshot.
    commit_lock: Mutex<()>,
}

impl CachedTreeRepository {
    /// Create a cached repository over the given cache store and backing
    /// repository.
    pub fn new(cache_context: Arc<TreeContext>, backing: Arc<TreeRepository>) -> Self {
        Self {
            cache: TreeRepository::new(cache_context),
            backing,
            commit_lock: Mutex::new(()),
        }
    }

    /// Access to the backing repository.
    pub fn backing(&self) -> &Arc<TreeRepository> {
        &self.backing
    }

    fn commit_guard(&self) -> MutexGuard<'_, ()> {
        self.commit_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Lazy read path. Cache hits return the cached snapshot directly; on a
    /// miss the node is cloned out of the backing store (fresh `Unchanged`
    /// state), inserted through the relinking path, and returned. Absent or
    /// backing-deleted nodes yield `Ok(None)`.
    pub fn load(&self, id: NodeId) -> Result<Option<Node>, TreeError> {
        if let Some(cached) = self.cache.context().get(&id) {
            return Ok(Some(cached));
        }

        let _guard = self.commit_guard();
        // re-check: the id may have been populated while we waited
        if let Some(cached) = self.cache.context().get(&id) {
            return Ok(Some(cached));
        }

        let mut clone = match self.backing.get_by_id(id) {
            Ok(node) => node,
            Err(TreeError::NotFound { .. }) => return Ok(None),
            Err(other) => return Err(other),
        };
        if clone.is_deleted {
            // deleted nodes are not resurrected into the cache
            return Ok(None);
        }

        clone.state = NodeState::Unchanged;
        tracing::debug!("cache miss for {}, pulled from the backing store", id);
        self.insert_cached(clone).map(Some)
    }

    /// Insert a node carrying an id into the cache store and resolve links,
    /// returning the post-relink snapshot.
    fn insert_cached(&self, node: Node) -> Result<Node, TreeError> {
        let context = self.cache.context();
        let id = node.id.ok_or(TreeError::MissingId)?;
        if context.contains(&id) {
            return Err(TreeError::already_exists(id));
        }
        context.put(id, node);
        self.restore_links(id)?;
        self.cache.get_by_id(id)
    }

    /// Orphan resolution, run after every cache insert:
    ///
    /// 1. Cached nodes waiting for this node (`original_parent_id` matches)
    ///    get their `parent_id` resolved to it.
    /// 2. A parentless node is done (root, or still-pending orphan).
    /// 3. A cached parent that is already deleted cascades the deletion
    ///    onto this node (and everything step 1 just linked under it).
    /// 4. A parent absent from the cache demotes the link: `parent_id`
    ///    moves into `original_parent_id` and this node waits as an orphan.
    fn restore_links(&self, node_id: NodeId) -> Result<(), TreeError> {
        let context = self.cache.context();

        for mut child in context.get_all() {
            if child.original_parent_id == Some(node_id) {
                if let Some(child_id) = child.id {
                    child.parent_id = Some(node_id);
                    context.put(child_id, child);
                }
            }
        }

        let Some(node) = context.get(&node_id) else {
            return Ok(());
        };
        let Some(parent_id) = node.parent_id else {
            return Ok(());
        };

        match context.get(&parent_id) {
            Some(parent) => {
                if parent.is_deleted {
                    self.cache.delete(&node)?;
                }
            }
            None => {
                let mut orphan = node;
                orphan.original_parent_id = orphan.parent_id.take();
                context.put(node_id, orphan);
                tracing::debug!("parent {} not cached, holding {} as orphan", parent_id, node_id);
            }
        }

        Ok(())
    }

    /// Apply phase 1: replay pending cache changes onto the backing store,
    /// walking the cache tree top-down from the parentless nodes with an
    /// explicit work-list. Always passes value copies; the backing tier's
    /// own state machine governs them independently.
    fn push_changes(&self) -> Result<(), TreeError> {
        let mut queue: VecDeque<Node> = self.cache.find_children(None).into_iter().collect();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut pushed = 0usize;

        while let Some(node) = queue.pop_front() {
            let Some(id) = node.id else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }

            match node.state {
                NodeState::Added => {
                    self.backing.add(node.clone())?;
                    pushed += 1;
                }
                NodeState::Modified => {
                    self.backing.update(&node)?;
                    pushed += 1;
                }
                NodeState::Deleted => {
                    self.backing.delete(&node)?;
                    pushed += 1;
                }
                NodeState::Unchanged => {}
            }

            // descend by cache topology regardless of the action taken
            queue.extend(self.cache.find_children(Some(id)));
        }

        tracing::debug!("pushed {} pending change(s) to the backing store", pushed);
        Ok(())
    }

    /// Apply phase 4: overwrite every cached node's deletion flag with the
    /// backing store's value. An ancestor may have been deleted in the
    /// backing store without this node's intermediate ancestors ever being
    /// cached, so the cache's own cascade never ran for it; asking the
    /// backing store after the push is the only way to learn that.
    fn reconcile(&self) -> Result<(), TreeError> {
        let context = self.cache.context();

        for mut node in context.get_all() {
            let Some(id) = node.id else {
                continue;
            };
            let backing_node = self.backing.get_by_id(id)?;
            if node.is_deleted != backing_node.is_deleted {
                tracing::debug!("reconciled deletion flag for {} from the backing store", id);
                node.is_deleted = backing_node.is_deleted;
                context.put(id, node);
            }
        }

        Ok(())
    }
}

impl Repository for CachedTreeRepository {
    /// Direct cache access; never falls through to the backing store.
    /// Use [`CachedTreeRepository::load`] for the lazy path.
    fn get_by_id(&self, id: NodeId) -> Result<Node, TreeError> {
        self.cache.get_by_id(id)
    }

    fn get_all(&self) -> Vec<Node> {
        self.cache.get_all()
    }

    fn find(&self, filter: &dyn Fn(&Node) -> bool) -> Vec<Node> {
        self.cache.find(filter)
    }

    fn find_children(&self, parent_id: Option<NodeId>) -> Vec<Node> {
        self.cache.find_children(parent_id)
    }

    /// Permissive insert: no single-root or parent-existence checks. A node
    /// without an id gets one and is marked `Added`; a caller-supplied id
    /// leaves id and state untouched. Runs the relinking pass afterwards.
    fn add(&self, mut node: Node) -> Result<Node, TreeError> {
        let _guard = self.commit_guard();

        if node.id.is_none() {
            node.id = Some(NodeId::new_v4());
            node.state = NodeState::Added;
        }
        self.insert_cached(node)
    }

    fn update(&self, node: &Node) -> Result<(), TreeError> {
        let _guard = self.commit_guard();
        self.cache.update(node)
    }

    fn delete(&self, node: &Node) -> Result<(), TreeError> {
        let _guard = self.commit_guard();
        self.cache.delete(node)
    }

    /// The commit protocol: push pending changes down, collapse tracking
    /// state on both tiers, then pull deletion flags back up. A failure
    /// during the push is fatal to this call; no partial-commit recovery.
    fn apply(&self) -> Result<(), TreeError> {
        let _guard = self.commit_guard();

        self.push_changes()?;
        self.cache.apply()?;
        self.backing.apply()?;
        self.reconcile()
    }

    /// Empties the cache (its seed strategy is empty) and resets the
    /// backing store to the canonical seed tree.
    fn reset(&self) {
        let _guard = self.commit_guard();

        self.cache.reset();
        self.backing.reset();
    }
}
