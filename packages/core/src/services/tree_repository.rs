//! Tree Repository - Single-Tier CRUD Engine
//!
//! `TreeRepository` operates directly on one [`TreeContext`] and enforces
//! the tree invariants for that store:
//!
//! - at most one root (`parent_id == None`)
//! - a resolved `parent_id` references a node present in the same store
//! - `is_deleted` is monotonic; deletion cascades to every descendant
//! - tracking state advances `Unchanged → Modified/Deleted` and never
//!   downgrades until `apply` collapses it
//!
//! The same type serves as the backing tier (store of record) and as the
//! inner engine of the cache tier.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::db::TreeContext;
use crate::models::{Node, NodeId, NodeState};
use crate::services::error::TreeError;
use crate::services::repository::Repository;

/// CRUD engine bound to one node store.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use treecache_core::db::{demo_tree, TreeContext};
/// use treecache_core::services::{Repository, TreeRepository};
///
/// let repository = TreeRepository::new(Arc::new(TreeContext::with_seed(demo_tree)));
/// let root = &repository.find_children(None)[0];
/// assert_eq!(root.value, "Node 1");
/// ```
pub struct TreeRepository {
    context: Arc<TreeContext>,

    /// Single writer lock: one mutation (or apply/reset) at a time, so a
    /// multi-step operation never interleaves with another on this store.
    write_lock: Mutex<()>,
}

impl TreeRepository {
    /// Create a repository over the given store handle.
    pub fn new(context: Arc<TreeContext>) -> Self {
        Self {
            context,
            write_lock: Mutex::new(()),
        }
    }

    /// Access to the underlying store.
    ///
    /// Useful for composing layers that need direct store access.
    pub fn context(&self) -> &Arc<TreeContext> {
        &self.context
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Soft-delete `root` and every node reachable from it via `parent_id`
    /// edges. Iterative work-list, parent before child; the seen-set guards
    /// against parent cycles the permissive cache tier can admit.
    fn soft_delete_subtree(&self, root: NodeId) {
        let mut queue = VecDeque::from([root]);
        let mut seen = HashSet::new();

        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(mut node) = self.context.get(&id) {
                node.is_deleted = true;
                node.state = match node.state {
                    NodeState::Added => NodeState::Added,
                    _ => NodeState::Deleted,
                };
                self.context.put(id, node);
            }
            queue.extend(
                self.find_children(Some(id))
                    .into_iter()
                    .filter_map(|child| child.id),
            );
        }

        tracing::debug!("soft-deleted {} node(s) under {}", seen.len(), root);
    }
}

impl Repository for TreeRepository {
    fn get_by_id(&self, id: NodeId) -> Result<Node, TreeError> {
        self.context.get(&id).ok_or(TreeError::NotFound { id })
    }

    fn get_all(&self) -> Vec<Node> {
        self.context.get_all()
    }

    fn find(&self, filter: &dyn Fn(&Node) -> bool) -> Vec<Node> {
        self.context
            .get_all()
            .into_iter()
            .filter(|node| filter(node))
            .collect()
    }

    fn find_children(&self, parent_id: Option<NodeId>) -> Vec<Node> {
        self.find(&|node| node.parent_id == parent_id)
    }

    fn add(&self, mut node: Node) -> Result<Node, TreeError> {
        let _guard = self.write_guard();

        if node.parent_id.is_none() && !self.find_children(None).is_empty() {
            return Err(TreeError::RootAlreadyExists);
        }

        if let Some(parent_id) = node.parent_id {
            let parent = self
                .context
                .get(&parent_id)
                .ok_or_else(|| TreeError::parent_not_found(parent_id))?;
            if parent.is_deleted {
                if parent.state == NodeState::Unchanged {
                    return Err(TreeError::node_deleted(parent_id));
                }
                // parent deletion is still pending; the child inherits it
                node.is_deleted = true;
            }
        }

        if let Some(id) = node.id {
            if self.context.contains(&id) {
                return Err(TreeError::already_exists(id));
            }
        }

        let id = node.id.unwrap_or_else(NodeId::new_v4);
        node.id = Some(id);
        node.state = NodeState::Added;
        self.context.put(id, node.clone());

        Ok(node)
    }

    fn update(&self, node: &Node) -> Result<(), TreeError> {
        let _guard = self.write_guard();

        let id = node.id.ok_or(TreeError::MissingId)?;
        let mut stored = self
            .context
            .get(&id)
            .ok_or_else(|| TreeError::not_found(id))?;

        if stored.is_deleted && stored.state == NodeState::Unchanged {
            return Err(TreeError::node_deleted(id));
        }

        stored.value = node.value.clone();
        if stored.state == NodeState::Unchanged {
            stored.state = NodeState::Modified;
        }
        self.context.put(id, stored);

        Ok(())
    }

    fn delete(&self, node: &Node) -> Result<(), TreeError> {
        let _guard = self.write_guard();

        let id = node.id.ok_or(TreeError::MissingId)?;
        let mut stored = self
            .context
            .get(&id)
            .ok_or_else(|| TreeError::not_found(id))?;

        // a delete carries the latest value through, like a final save;
        // descendants keep their own values
        stored.value = node.value.clone();
        self.context.put(id, stored);
        self.soft_delete_subtree(id);

        Ok(())
    }

    fn apply(&self) -> Result<(), TreeError> {
        let _guard = self.write_guard();

        for mut node in self.context.get_all() {
            if node.state != NodeState::Unchanged {
                if let Some(id) = node.id {
                    node.state = NodeState::Unchanged;
                    self.context.put(id, node);
                }
            }
        }

        Ok(())
    }

    fn reset(&self) {
        let _guard = self.write_guard();

        self.context.clear();
        self.context.seed();
        tracing::debug!("store reset to seed state ({} node(s))", self.context.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::demo_tree;

    fn empty_repository() -> TreeRepository {
        TreeRepository::new(Arc::new(TreeContext::new()))
    }

    fn seeded_repository() -> TreeRepository {
        TreeRepository::new(Arc::new(TreeContext::with_seed(demo_tree)))
    }

    #[test]
    fn test_add_root_assigns_id_and_added_state() {
        let repository = empty_repository();

        let root = repository.add(Node::new("root", None)).unwrap();

        assert!(root.id.is_some());
        assert_eq!(root.state, NodeState::Added);
        assert_eq!(repository.get_all().len(), 1);
    }

    #[test]
    fn test_add_keeps_caller_supplied_id() {
        let repository = empty_repository();
        let id = NodeId::new_v4();

        let root = repository.add(Node::with_id(id, "root", None)).unwrap();

        assert_eq!(root.id, Some(id));
    }

    #[test]
    fn test_add_second_root_is_rejected() {
        let repository = empty_repository();
        repository.add(Node::new("root", None)).unwrap();

        let result = repository.add(Node::new("another root", None));

        assert_eq!(result.unwrap_err(), TreeError::RootAlreadyExists);
    }

    #[test]
    fn test_add_with_unknown_parent_is_rejected() {
        let repository = empty_repository();
        let parent_id = NodeId::new_v4();

        let result = repository.add(Node::new("child", Some(parent_id)));

        assert_eq!(result.unwrap_err(), TreeError::ParentNotFound { parent_id });
    }

    #[test]
    fn test_add_duplicate_id_is_rejected() {
        let repository = empty_repository();
        let root = repository.add(Node::new("root", None)).unwrap();
        let root_id = root.id.unwrap();

        let result = repository.add(Node::with_id(root_id, "child", root.id));

        assert_eq!(result.unwrap_err(), TreeError::AlreadyExists { id: root_id });
    }

    #[test]
    fn test_add_under_committed_deleted_parent_is_rejected() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);
        repository.delete(&root).unwrap();
        repository.apply().unwrap();

        let result = repository.add(Node::new("child", root.id));

        assert_eq!(
            result.unwrap_err(),
            TreeError::NodeDeleted {
                id: root.id.unwrap()
            }
        );
    }

    #[test]
    fn test_add_under_pending_deleted_parent_inherits_deletion() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);
        repository.delete(&root).unwrap();

        let child = repository.add(Node::new("child", root.id)).unwrap();

        assert!(child.is_deleted);
        assert_eq!(child.state, NodeState::Added);
    }

    #[test]
    fn test_update_missing_node_is_rejected() {
        let repository = empty_repository();
        let node = Node::with_id(NodeId::new_v4(), "ghost", None);

        let result = repository.update(&node);

        assert_eq!(
            result.unwrap_err(),
            TreeError::NotFound {
                id: node.id.unwrap()
            }
        );
    }

    #[test]
    fn test_update_advances_unchanged_to_modified() {
        let repository = seeded_repository();
        let mut root = repository.find_children(None).remove(0);
        root.value = "renamed".to_string();

        repository.update(&root).unwrap();

        let stored = repository.get_by_id(root.id.unwrap()).unwrap();
        assert_eq!(stored.value, "renamed");
        assert_eq!(stored.state, NodeState::Modified);
    }

    #[test]
    fn test_update_keeps_pending_state() {
        let repository = empty_repository();
        let mut root = repository.add(Node::new("root", None)).unwrap();
        root.value = "renamed".to_string();

        repository.update(&root).unwrap();

        let stored = repository.get_by_id(root.id.unwrap()).unwrap();
        assert_eq!(stored.value, "renamed");
        assert_eq!(stored.state, NodeState::Added);
    }

    #[test]
    fn test_update_committed_deleted_node_is_rejected() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);
        repository.delete(&root).unwrap();
        repository.apply().unwrap();

        let result = repository.update(&root);

        assert_eq!(
            result.unwrap_err(),
            TreeError::NodeDeleted {
                id: root.id.unwrap()
            }
        );
    }

    #[test]
    fn test_delete_cascades_to_descendants() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);

        repository.delete(&root).unwrap();

        for node in repository.get_all() {
            assert!(node.is_deleted, "{} survived the cascade", node.value);
            assert_eq!(node.state, NodeState::Deleted);
        }
    }

    #[test]
    fn test_delete_root_and_child_scenario() {
        let repository = empty_repository();
        let root = repository.add(Node::new("R", None)).unwrap();
        let child = repository.add(Node::new("C1", root.id)).unwrap();
        repository.apply().unwrap();

        repository.delete(&repository.get_by_id(root.id.unwrap()).unwrap()).unwrap();

        let root = repository.get_by_id(root.id.unwrap()).unwrap();
        let child = repository.get_by_id(child.id.unwrap()).unwrap();
        assert!(root.is_deleted);
        assert!(child.is_deleted);
        assert_eq!(child.state, NodeState::Deleted);
    }

    #[test]
    fn test_delete_carries_value_through() {
        let repository = seeded_repository();
        let mut root = repository.find_children(None).remove(0);
        root.value = "final words".to_string();

        repository.delete(&root).unwrap();

        let stored = repository.get_by_id(root.id.unwrap()).unwrap();
        assert_eq!(stored.value, "final words");
        // descendants keep their own values
        let child = repository.find(&|n| n.value == "Node 2");
        assert_eq!(child.len(), 1);
        assert!(child[0].is_deleted);
    }

    #[test]
    fn test_delete_added_node_stays_added() {
        let repository = empty_repository();
        let root = repository.add(Node::new("root", None)).unwrap();

        repository.delete(&root).unwrap();

        let stored = repository.get_by_id(root.id.unwrap()).unwrap();
        assert!(stored.is_deleted);
        assert_eq!(stored.state, NodeState::Added);
    }

    #[test]
    fn test_delete_missing_node_is_rejected() {
        let repository = empty_repository();
        let node = Node::with_id(NodeId::new_v4(), "ghost", None);

        assert!(matches!(
            repository.delete(&node),
            Err(TreeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_is_iterative_on_deep_chains() {
        let repository = empty_repository();
        let mut parent = repository.add(Node::new("depth 0", None)).unwrap();
        for depth in 1..=2_000 {
            parent = repository
                .add(Node::new(format!("depth {depth}"), parent.id))
                .unwrap();
        }
        let root = repository.find_children(None).remove(0);

        repository.delete(&root).unwrap();

        assert!(repository.get_all().iter().all(|n| n.is_deleted));
    }

    #[test]
    fn test_apply_collapses_pending_states() {
        let repository = seeded_repository();
        let mut root = repository.find_children(None).remove(0);
        root.value = "renamed".to_string();
        repository.update(&root).unwrap();
        repository.add(Node::new("child", root.id)).unwrap();

        repository.apply().unwrap();

        for node in repository.get_all() {
            assert_eq!(node.state, NodeState::Unchanged);
        }
    }

    #[test]
    fn test_is_deleted_survives_apply() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);
        repository.delete(&root).unwrap();

        repository.apply().unwrap();

        assert!(repository.get_all().iter().all(|n| n.is_deleted));
    }

    #[test]
    fn test_reset_restores_seed_tree() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);
        repository.delete(&root).unwrap();

        repository.reset();

        let nodes = repository.get_all();
        assert_eq!(nodes.len(), 10);
        assert!(nodes.iter().all(|n| !n.is_deleted));
        assert_eq!(repository.find_children(None).len(), 1);
    }

    #[test]
    fn test_find_children_of_root() {
        let repository = seeded_repository();
        let root = repository.find_children(None).remove(0);

        let children = repository.find_children(root.id);

        let mut values: Vec<_> = children.into_iter().map(|n| n.value).collect();
        values.sort();
        assert_eq!(values, ["Node 2", "Node 3", "Node 4"]);
    }
}
