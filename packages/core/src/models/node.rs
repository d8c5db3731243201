//! Node Data Structures
//!
//! This module defines the core `Node` struct and its change-tracking state
//! for TreeCache's two-tier tree repository.
//!
//! # Architecture
//!
//! - **Single Entity**: One struct represents every element of the tree
//! - **Soft Delete**: Deleted nodes stay in their store with `is_deleted` set
//! - **Change Tracking**: `state` records what happened to a node since the
//!   last commit against the store of record
//!
//! # Examples
//!
//! ```rust
//! use treecache_core::models::{Node, NodeState};
//!
//! // A root node; the store assigns an id on insert
//! let root = Node::new("Root", None);
//! assert!(root.id.is_none());
//! assert_eq!(root.state, NodeState::Unchanged);
//!
//! // A child carrying its own id
//! let id = uuid::Uuid::new_v4();
//! let child = Node::with_id(id, "Child", root.id);
//! assert_eq!(child.id, Some(id));
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to every stored node.
pub type NodeId = Uuid;

/// Change-tracking state of a node relative to the store of record.
///
/// Transitions are append-only between commits:
///
/// - `Unchanged → Modified` on update
/// - `Unchanged → Deleted` on delete
/// - `Added → Added` on delete (the store of record never saw the node)
/// - any pending state collapses to `Unchanged` when `apply` succeeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeState {
    /// In sync with the store of record
    #[default]
    Unchanged,
    /// Inserted since the last commit
    Added,
    /// Value changed since the last commit
    Modified,
    /// Soft-deleted since the last commit
    Deleted,
}

/// An identified element of the tree.
///
/// # Fields
///
/// - `id`: unique identifier; `None` until a store assigns one on insert
/// - `parent_id`: reference to the parent node; `None` means "root" or
///   "parent not yet resolved" (disambiguated by `original_parent_id`)
/// - `original_parent_id`: intended parent that is not present in the
///   current store yet; a pending-link marker, never the authoritative
///   relationship
/// - `value`: arbitrary payload
/// - `is_deleted`: soft-delete flag; monotonic within one store
/// - `state`: change-tracking state relative to the store of record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier, assigned by the store when absent on insert
    pub id: Option<NodeId>,

    /// Parent reference; `None` for the root or an unresolved link
    pub parent_id: Option<NodeId>,

    /// Intended parent recorded while that parent is absent from the store
    pub original_parent_id: Option<NodeId>,

    /// Payload
    pub value: String,

    /// Soft-delete flag
    pub is_deleted: bool,

    /// Change-tracking state
    pub state: NodeState,
}

impl Node {
    /// Create a node without an id; the store assigns one on insert.
    pub fn new(value: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id: None,
            parent_id,
            original_parent_id: None,
            value: value.into(),
            is_deleted: false,
            state: NodeState::Unchanged,
        }
    }

    /// Create a node with a caller-supplied id.
    pub fn with_id(id: NodeId, value: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(value, parent_id)
        }
    }

    /// Whether this node is waiting for its intended parent to arrive.
    ///
    /// True while `original_parent_id` is recorded and the link has not been
    /// resolved back into `parent_id`.
    pub fn has_pending_link(&self) -> bool {
        self.parent_id.is_none() && self.original_parent_id.is_some()
    }

    /// Whether this node has a pending (uncommitted) change.
    pub fn is_pending(&self) -> bool {
        self.state != NodeState::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_has_no_id_and_unchanged_state() {
        let node = Node::new("payload", None);

        assert!(node.id.is_none());
        assert!(node.parent_id.is_none());
        assert!(node.original_parent_id.is_none());
        assert_eq!(node.value, "payload");
        assert!(!node.is_deleted);
        assert_eq!(node.state, NodeState::Unchanged);
    }

    #[test]
    fn test_with_id_keeps_caller_id() {
        let id = NodeId::new_v4();
        let parent = NodeId::new_v4();
        let node = Node::with_id(id, "child", Some(parent));

        assert_eq!(node.id, Some(id));
        assert_eq!(node.parent_id, Some(parent));
    }

    #[test]
    fn test_has_pending_link() {
        let parent = NodeId::new_v4();
        let mut node = Node::new("orphan", Some(parent));
        assert!(!node.has_pending_link());

        node.original_parent_id = node.parent_id.take();
        assert!(node.has_pending_link());

        // resolved links are no longer pending even though the marker stays
        node.parent_id = Some(parent);
        assert!(!node.has_pending_link());
    }

    #[test]
    fn test_node_serialization_uses_camel_case() {
        let id = NodeId::new_v4();
        let parent = NodeId::new_v4();
        let mut node = Node::with_id(id, "payload", Some(parent));
        node.state = NodeState::Modified;

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["parentId"], parent.to_string());
        assert_eq!(json["originalParentId"], serde_json::Value::Null);
        assert_eq!(json["value"], "payload");
        assert_eq!(json["isDeleted"], false);
        assert_eq!(json["state"], "modified");
    }

    #[test]
    fn test_node_roundtrip() {
        let mut node = Node::with_id(NodeId::new_v4(), "payload", None);
        node.is_deleted = true;
        node.state = NodeState::Deleted;

        let json = serde_json::to_string(&node).unwrap();
        let decoded: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, decoded);
    }

    #[test]
    fn test_default_state_is_unchanged() {
        assert_eq!(NodeState::default(), NodeState::Unchanged);
        assert_eq!(Node::default().state, NodeState::Unchanged);
    }
}
